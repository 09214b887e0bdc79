//! Health check sweep over the monitored resources.
//!
//! Each resource gets one `GET`, bounded by the configured timeout, and one new
//! `HealthCheckLog` row. Probes run one after another in creation order. A probe
//! failure is data, not an error: only failing to list the resources aborts a sweep.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{HealthCheckLog, Resource},
    repository::Repository,
};

/// HealthChecker
///
/// Shared HTTP client plus the per-probe deadline. Cloning is cheap (the client is
/// reference counted internally).
#[derive(Debug, Clone)]
pub struct HealthChecker {
    http_client: Client,
    check_timeout: Duration,
}

impl HealthChecker {
    pub fn new(check_timeout: Duration) -> Self {
        // The per-probe deadline is enforced by `tokio::time::timeout` in `probe`.
        let http_client = Client::builder()
            .user_agent(concat!("site-admin/", env!("CARGO_PKG_VERSION"), " (health check)"))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build health check client, using defaults");
                Client::new()
            });
        Self {
            http_client,
            check_timeout,
        }
    }

    pub fn check_timeout(&self) -> Duration {
        self.check_timeout
    }

    /// Probes one resource. Never fails: every outcome becomes a log entry.
    pub async fn probe(&self, resource: &Resource) -> HealthCheckLog {
        debug!(resource = %resource.name, url = %resource.url, "probing resource");

        let started = Instant::now();
        let result = timeout(
            self.check_timeout,
            self.http_client.get(&resource.url).send(),
        )
        .await;
        let elapsed = started.elapsed();

        let (status, is_healthy, error) = match result {
            Ok(Ok(response)) => {
                let code = response.status();
                if code.is_success() {
                    (Some(i32::from(code.as_u16())), true, None)
                } else {
                    warn!(resource = %resource.name, status = code.as_u16(), "resource unhealthy");
                    (
                        Some(i32::from(code.as_u16())),
                        false,
                        Some(format!("HTTP {}", code.as_u16())),
                    )
                }
            }
            Ok(Err(e)) => {
                warn!(resource = %resource.name, error = %e, "health check request failed");
                (None, false, Some(e.to_string()))
            }
            Err(_) => {
                warn!(resource = %resource.name, "health check timed out");
                (
                    None,
                    false,
                    Some(format!(
                        "Timed out after {} ms",
                        self.check_timeout.as_millis()
                    )),
                )
            }
        };

        HealthCheckLog {
            id: Uuid::new_v4(),
            resource_id: resource.id,
            status,
            response_time_ms: i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            is_healthy,
            error,
            checked_at: Utc::now(),
        }
    }

    /// sweep
    ///
    /// Probes every resource, stores each log, then prunes logs older than
    /// `retention_days`. Logs that fail to persist are left out of the result.
    pub async fn sweep(
        &self,
        repo: &dyn Repository,
        retention_days: i64,
    ) -> AppResult<Vec<HealthCheckLog>> {
        let resources = repo.list_resources().await?;
        let mut results = Vec::with_capacity(resources.len());

        for resource in &resources {
            let log = self.probe(resource).await;
            match repo.insert_health_log(&log).await {
                Ok(()) => results.push(log),
                Err(e) => {
                    tracing::error!(resource = %resource.id, error = %e, "failed to store health log");
                }
            }
        }

        let cutoff = Utc::now() - chrono::Duration::days(retention_days);
        match repo.prune_health_logs(cutoff).await {
            Ok(pruned) if pruned > 0 => debug!(pruned, "pruned expired health logs"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "failed to prune health logs"),
        }

        let healthy = results.iter().filter(|log| log.is_healthy).count();
        info!(
            checked = results.len(),
            healthy,
            "health check sweep finished"
        );
        Ok(results)
    }
}
