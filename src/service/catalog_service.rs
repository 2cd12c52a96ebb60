//! Catalog service: nested read models for runs, schedules, bids and events.

use crate::domain::{Bid, EntityId, EventSummary, Prize, Run, Schedule};
use crate::error::MarathonError;
use crate::materialize::{materialize, materialize_one};
use crate::persistence::{RowScope, RowSource};

/// Read side of the catalog.
///
/// Fetches flattened join rows from a [`RowSource`] and folds them into
/// nested entities with the materializer.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    source: S,
}

impl<S: RowSource> CatalogService<S> {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Lists every run with its teams, players, bids and options.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_runs(&self) -> Result<Vec<Run>, MarathonError> {
        let rows = self.source.run_rows(RowScope::All).await?;
        Ok(materialize(&rows))
    }

    /// Lists the runs of one event.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_runs_of_event(&self, event_id: &EntityId) -> Result<Vec<Run>, MarathonError> {
        let rows = self.source.run_rows(RowScope::Event(event_id.clone())).await?;
        Ok(materialize(&rows))
    }

    /// Returns one run with its teams, players, bids and options.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::NotFound`] when the run does not exist.
    pub async fn get_run(&self, run_id: &EntityId) -> Result<Run, MarathonError> {
        let rows = self.source.run_rows(RowScope::Id(run_id.clone())).await?;
        materialize_one(&rows, "run", run_id.as_str())
    }

    /// Lists every schedule with its runs in start order.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, MarathonError> {
        let rows = self.source.schedule_rows(RowScope::All).await?;
        Ok(materialize(&rows))
    }

    /// Returns one schedule with its runs, teams and players.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::NotFound`] when the schedule does not exist.
    pub async fn get_schedule(&self, schedule_id: &EntityId) -> Result<Schedule, MarathonError> {
        let rows = self
            .source
            .schedule_rows(RowScope::Id(schedule_id.clone()))
            .await?;
        materialize_one(&rows, "schedule", schedule_id.as_str())
    }

    /// Lists every bid with its options.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_bids(&self) -> Result<Vec<Bid>, MarathonError> {
        let rows = self.source.bid_rows(RowScope::All).await?;
        Ok(materialize(&rows))
    }

    /// Returns one bid with its options.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::NotFound`] when the bid does not exist.
    pub async fn get_bid(&self, bid_id: &EntityId) -> Result<Bid, MarathonError> {
        let rows = self.source.bid_rows(RowScope::Id(bid_id.clone())).await?;
        materialize_one(&rows, "bid", bid_id.as_str())
    }

    /// Lists prizes, optionally only those of one event, by minimum amount.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_prizes(&self, event_id: Option<&EntityId>) -> Result<Vec<Prize>, MarathonError> {
        let scope = event_id.map_or(RowScope::All, |id| RowScope::Event(id.clone()));
        self.source.prizes(scope).await
    }

    /// Returns one prize.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::NotFound`] when the prize does not exist.
    pub async fn get_prize(&self, prize_id: &EntityId) -> Result<Prize, MarathonError> {
        self.source
            .prizes(RowScope::Id(prize_id.clone()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MarathonError::not_found("prize", prize_id))
    }

    /// Returns the dashboard counts of an event.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::NotFound`] when the event does not exist.
    pub async fn event_summary(&self, event_id: &EntityId) -> Result<EventSummary, MarathonError> {
        self.source.event_summary(event_id).await
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::{BidType, Event, Prize};
    use crate::materialize::{RunRow, ScheduleRow};
    use crate::persistence::MemoryStore;

    fn run_row(run: &str, schedule: &str, user: Option<&str>) -> RunRow {
        RunRow {
            run_id: run.to_string(),
            run_name: run.to_string(),
            schedule_id: schedule.to_string(),
            team_id: user.map(|_| format!("{run}-team")),
            user_id: user.map(str::to_string),
            ..RunRow::default()
        }
    }

    fn schedule_row(schedule: &str, event: &str, run: &str, user: &str) -> ScheduleRow {
        ScheduleRow {
            schedule_id: schedule.to_string(),
            event_id: event.to_string(),
            run_id: Some(run.to_string()),
            team_id: Some(format!("{run}-team")),
            user_id: Some(user.to_string()),
            ..ScheduleRow::default()
        }
    }

    async fn catalog() -> CatalogService<MemoryStore> {
        let store = MemoryStore::new();
        store
            .seed_run_rows([
                run_row("R1", "S1", Some("U1")),
                run_row("R1", "S1", Some("U2")),
                run_row("R2", "S2", None),
            ])
            .await;
        store
            .seed_schedule_rows([
                schedule_row("S1", "E1", "R1", "U1"),
                schedule_row("S1", "E1", "R1", "U2"),
                schedule_row("S2", "E2", "R2", "U3"),
            ])
            .await;
        store.seed_bid("B1", BidType::Bidwar, true).await;
        store.seed_option("B1", "O1", "left").await;
        for (id, event, min_amount) in [("P2", "E1", 50.0), ("P1", "E1", 10.0), ("P3", "E2", 5.0)] {
            store
                .seed_prize(Prize {
                    id: id.into(),
                    name: format!("prize {id}"),
                    description: String::new(),
                    url: String::new(),
                    min_amount,
                    status: "available".to_string(),
                    international_delivery: false,
                    event_id: event.into(),
                })
                .await;
        }
        store
            .seed_event(Event {
                id: "E1".into(),
                name: "Summer".to_string(),
                start_time_mili: 0,
                end_time_mili: 1,
            })
            .await;
        CatalogService::new(store)
    }

    #[tokio::test]
    async fn runs_are_materialized() {
        let service = catalog().await;
        let Ok(runs) = service.list_runs().await else {
            panic!("list_runs failed");
        };
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].teams[0].players.len(), 2);
        assert!(runs[1].teams.is_empty());
    }

    #[tokio::test]
    async fn runs_of_event_are_filtered() {
        let service = catalog().await;
        let Ok(runs) = service.list_runs_of_event(&"E2".into()).await else {
            panic!("list_runs_of_event failed");
        };
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id.as_str(), "R2");
    }

    #[tokio::test]
    async fn missing_run_is_not_found() {
        let service = catalog().await;
        let result = service.get_run(&"R9".into()).await;
        assert!(matches!(result, Err(MarathonError::NotFound { entity: "run", .. })));
    }

    #[tokio::test]
    async fn schedule_nests_runs() {
        let service = catalog().await;
        let Ok(schedule) = service.get_schedule(&"S1".into()).await else {
            panic!("get_schedule failed");
        };
        assert_eq!(schedule.runs.len(), 1);
        assert_eq!(schedule.runs[0].teams[0].players.len(), 2);
    }

    #[tokio::test]
    async fn bid_has_options() {
        let service = catalog().await;
        let Ok(bid) = service.get_bid(&"B1".into()).await else {
            panic!("get_bid failed");
        };
        assert_eq!(bid.options.len(), 1);
    }

    #[tokio::test]
    async fn event_summary_counts() {
        let service = catalog().await;
        let Ok(summary) = service.event_summary(&"E1".into()).await else {
            panic!("event_summary failed");
        };
        assert_eq!(summary.schedules_count, 1);
        assert_eq!(summary.runs_count, 1);
        assert_eq!(summary.users_count, 2);
        assert_eq!(summary.bids_count, 1);
        assert_eq!(summary.prizes_count, 2);
    }

    #[tokio::test]
    async fn prizes_are_listed_by_minimum_amount() {
        let service = catalog().await;
        let Ok(all) = service.list_prizes(None).await else {
            panic!("list_prizes failed");
        };
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["P3", "P1", "P2"]);
        let Ok(of_event) = service.list_prizes(Some(&"E1".into())).await else {
            panic!("list_prizes failed");
        };
        assert_eq!(of_event.len(), 2);
    }

    #[tokio::test]
    async fn missing_prize_is_not_found() {
        let service = catalog().await;
        let Ok(prize) = service.get_prize(&"P1".into()).await else {
            panic!("get_prize failed");
        };
        assert!((prize.min_amount - 10.0).abs() < f64::EPSILON);
        let result = service.get_prize(&"P9".into()).await;
        assert!(matches!(result, Err(MarathonError::NotFound { entity: "prize", .. })));
    }
}
