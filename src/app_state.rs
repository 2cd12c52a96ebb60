//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::persistence::PostgresStore;
use crate::service::{CatalogService, DonationService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read side: runs, schedules, bids, event summaries.
    pub catalog: Arc<CatalogService<PostgresStore>>,
    /// Write side: donations through the ledger.
    pub donations: Arc<DonationService<PostgresStore>>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires both services over one store and one event bus.
    #[must_use]
    pub fn new(store: PostgresStore, event_bus: EventBus) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(store.clone())),
            donations: Arc::new(DonationService::new(store, event_bus.clone())),
            event_bus,
        }
    }
}
