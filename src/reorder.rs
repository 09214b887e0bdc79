//! Drag-and-drop reordering shared by kanban columns, kanban cards and the timeline.
//!
//! A reorder request is a list of `{id, order}` pairs. The whole list is validated up
//! front and then written as a single batch statement by the repository, so a reader
//! never observes a half-applied drag for longer than that one statement. Orders are
//! stored exactly as sent: no compaction, duplicates and gaps are allowed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

/// One `{id, order}` pair. Timeline clients send `_id`, which is accepted as an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItem {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub order: i32,
    /// Cards only: moves the card into this column of the same board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<Uuid>,
}

impl ReorderItem {
    pub fn new(id: Uuid, order: i32) -> Self {
        Self {
            id,
            order,
            column_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReorderRequest {
    pub items: Vec<ReorderItem>,
}

/// The sibling set a reorder applies to. Ids outside the scope are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderScope {
    Columns { board_id: Uuid },
    Cards { board_id: Uuid },
    Timeline,
}

impl ReorderRequest {
    pub fn validate(&self, scope: ReorderScope) -> AppResult<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(AppError::validation(format!(
                    "item {} appears more than once",
                    item.id
                )));
            }
            if item.column_id.is_some() && !matches!(scope, ReorderScope::Cards { .. }) {
                return Err(AppError::validation(
                    "columnId is only accepted when reordering cards",
                ));
            }
        }
        Ok(())
    }
}

/// Validates and persists a reorder, returning the number of items actually moved.
///
/// An empty list succeeds without touching storage. A storage failure aborts the whole
/// request; nothing is retried.
pub async fn apply(
    repo: &dyn Repository,
    scope: ReorderScope,
    request: &ReorderRequest,
) -> AppResult<u64> {
    request.validate(scope)?;
    if request.items.is_empty() {
        return Ok(0);
    }

    let updated = repo.reorder(scope, &request.items).await?;
    if updated < request.items.len() as u64 {
        tracing::debug!(
            ?scope,
            requested = request.items.len(),
            updated,
            "reorder skipped ids outside the scope"
        );
    }
    tracing::info!(?scope, updated, "reorder applied");
    Ok(updated)
}
