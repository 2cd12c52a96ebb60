//! REST endpoint handlers organized by resource.

pub mod bids;
pub mod donations;
pub mod events;
pub mod prizes;
pub mod runs;
pub mod schedules;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(runs::routes())
        .merge(schedules::routes())
        .merge(bids::routes())
        .merge(events::routes())
        .merge(prizes::routes())
        .merge(donations::routes())
}
