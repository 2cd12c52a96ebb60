//! # marathon-backend
//!
//! Backend for speedrun marathon events: schedules, runs, teams and
//! players, donations, and the incentive bids donations are earmarked to.
//!
//! Two pieces carry the logic:
//!
//! - the [`materialize`] module folds flat join rows into nested entities
//!   (a run with its teams, players, bids and bid options), keeping
//!   first-seen order and never duplicating a child;
//! - the [`ledger`] module keeps every bid and option total equal to the
//!   donations earmarked to it, applying each donation write and its
//!   total adjustments in a single transaction.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── CatalogService / DonationService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Materializer (materialize/)   Ledger (ledger/)
//!     │
//!     └── PostgreSQL / in-memory store (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod materialize;
pub mod persistence;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full application router: REST API, docs, `/health` and `/ws`.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
