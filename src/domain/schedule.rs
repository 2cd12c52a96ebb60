//! Events and their schedules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EntityId, Run};

/// An ordered list of runs inside an event.
///
/// Runs are referenced, not owned: deleting a schedule leaves its runs alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    /// Schedule identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Window start, epoch milliseconds.
    pub start_time_mili: i64,
    /// Window end, epoch milliseconds.
    pub end_time_mili: i64,
    /// Owning event.
    pub event_id: EntityId,
    /// Runs ordered by start time.
    pub runs: Vec<Run>,
}

/// A marathon event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Event identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Start, epoch milliseconds.
    pub start_time_mili: i64,
    /// End, epoch milliseconds.
    pub end_time_mili: i64,
}

/// Counts shown on the event dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    /// The event.
    pub event: Event,
    /// Number of schedules.
    pub schedules_count: i64,
    /// Number of runs across all schedules.
    pub runs_count: i64,
    /// Number of prizes.
    pub prizes_count: i64,
    /// Number of bids across all runs.
    pub bids_count: i64,
    /// Number of donations.
    pub donations_count: i64,
    /// Number of distinct users playing in the event.
    pub users_count: i64,
}
