//! HTTP handlers, one module per dashboard feature.
//!
//! Handlers validate their payload at the boundary, call the repository and map
//! `Option`/`bool` results to 404s. Every mutating handler takes `AdminSession` (or a
//! `JobAuth`) so the guard shows up in its signature, not only in the router.

use axum::http::StatusCode;

use crate::error::{AppError, AppResult};

pub mod api_keys;
pub mod blog;
pub mod calendar;
pub mod contacts;
pub mod inbox;
pub mod jobs;
pub mod kanban;
pub mod notes;
pub mod resources;
pub mod timeline;
pub mod uploads;
pub mod whiteboards;

/// Maps a lookup result to 404 when absent.
fn found<T>(value: Option<T>, entity: &'static str) -> AppResult<T> {
    value.ok_or(AppError::NotFound(entity))
}

/// 204 when something was deleted, 404 otherwise.
fn deleted(removed: bool, entity: &'static str) -> AppResult<StatusCode> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(entity))
    }
}
