//! Persistence layer: flattened read rows and the ledger's unit of work.
//!
//! [`RowSource`] serves the ordered join rows the materializer folds into
//! nested entities. [`postgres::PostgresStore`] implements it together with
//! [`crate::ledger::LedgerStore`] on top of `sqlx::PgPool`;
//! [`memory::MemoryStore`] is the in-process equivalent used by tests.

pub mod memory;
pub mod models;
pub mod postgres;

use std::future::Future;

use crate::domain::{EntityId, EventSummary, Prize};
use crate::error::MarathonError;
use crate::materialize::{BidRow, RunRow, ScheduleRow};

pub use memory::MemoryStore;
pub use models::DonationRow;
pub use postgres::PostgresStore;

/// Which rows a read query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowScope {
    /// Every row.
    All,
    /// Rows of the entity with this id.
    Id(EntityId),
    /// Rows belonging to this event.
    Event(EntityId),
}

/// Source of ordered, flattened join rows.
pub trait RowSource: Send + Sync {
    /// Rows of the run query, ordered by run start time.
    fn run_rows(
        &self,
        scope: RowScope,
    ) -> impl Future<Output = Result<Vec<RunRow>, MarathonError>> + Send;

    /// Rows of the schedule query, runs ordered by start time.
    fn schedule_rows(
        &self,
        scope: RowScope,
    ) -> impl Future<Output = Result<Vec<ScheduleRow>, MarathonError>> + Send;

    /// Rows of the bid query.
    fn bid_rows(
        &self,
        scope: RowScope,
    ) -> impl Future<Output = Result<Vec<BidRow>, MarathonError>> + Send;

    /// Donations joined with their earmarked bid and option.
    fn donation_rows(
        &self,
        scope: RowScope,
    ) -> impl Future<Output = Result<Vec<DonationRow>, MarathonError>> + Send;

    /// Prizes, ordered by minimum amount.
    fn prizes(
        &self,
        scope: RowScope,
    ) -> impl Future<Output = Result<Vec<Prize>, MarathonError>> + Send;

    /// Dashboard counts of an event.
    fn event_summary(
        &self,
        event_id: &EntityId,
    ) -> impl Future<Output = Result<EventSummary, MarathonError>> + Send;

    /// Sum of every donation of an event.
    fn total_donated(
        &self,
        event_id: &EntityId,
    ) -> impl Future<Output = Result<f64, MarathonError>> + Send;
}
