//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::EntityId;
use crate::ledger::{AuditReport, Reconciliation};

use super::TotalChangeDto;

/// Optional event filter for list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EventFilter {
    /// Restrict results to one event.
    #[serde(default)]
    pub event_id: Option<EntityId>,
}

/// Sum of the donations of an event.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventTotalResponse {
    /// Event identifier.
    pub event_id: EntityId,
    /// Total donated.
    pub total: f64,
}

/// Response for `POST /bids/{id}/reconcile`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReconcileResponse {
    /// Audit taken before the rewrite.
    pub before: AuditReport,
    /// Totals that moved.
    pub changes: Vec<TotalChangeDto>,
}

impl From<Reconciliation> for ReconcileResponse {
    fn from(reconciliation: Reconciliation) -> Self {
        Self {
            before: reconciliation.before,
            changes: reconciliation
                .changes
                .into_iter()
                .map(TotalChangeDto::from)
                .collect(),
        }
    }
}
