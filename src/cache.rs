use std::{future::Future, sync::Arc};

use tokio::sync::RwLock;

/// ListingCache
///
/// Holds the last loaded copy of a public listing. The first reader after an
/// invalidation reloads it from storage; every other reader is served the shared copy.
/// Load errors are returned to the caller and leave the cache empty.
pub struct ListingCache<T> {
    name: &'static str,
    slot: RwLock<Option<Arc<Vec<T>>>>,
}

impl<T> ListingCache<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: RwLock::new(None),
        }
    }

    pub async fn get_or_load<F, Fut, E>(&self, loader: F) -> Result<Arc<Vec<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(items) = self.slot.read().await.as_ref() {
            return Ok(Arc::clone(items));
        }

        let mut slot = self.slot.write().await;
        // Another request may have filled it while we waited for the write lock.
        if let Some(items) = slot.as_ref() {
            return Ok(Arc::clone(items));
        }
        let items = Arc::new(loader().await?);
        *slot = Some(Arc::clone(&items));
        tracing::debug!(cache = self.name, count = items.len(), "listing cache filled");
        Ok(items)
    }

    pub async fn invalidate(&self) {
        if self.slot.write().await.take().is_some() {
            tracing::debug!(cache = self.name, "listing cache invalidated");
        }
    }
}
