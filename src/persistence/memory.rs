//! In-process store with transactional semantics.
//!
//! [`MemoryStore`] keeps the whole ledger state behind one
//! [`tokio::sync::Mutex`]. A unit of work holds the lock for its lifetime
//! and writes to a private copy of the state; commit swaps the copy in,
//! rollback (or drop) discards it. Unique constraints of the SQL schema are
//! emulated, and [`MemoryStore::fail_on_write`] injects a failure into the
//! n-th write so atomicity can be tested without a database.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::models::DonationRow;
use super::{RowScope, RowSource};
use crate::domain::{Bid, BidType, Donation, Earmark, EntityId, Event, EventSummary, Prize};
use crate::error::MarathonError;
use crate::ledger::{Adjusted, BidRecord, EarmarkedAmount, LedgerStore, LedgerTx, OptionRecord};
use crate::materialize::{BidRow, RunRow, ScheduleRow};

/// Everything a [`MemoryStore`] holds.
///
/// Bids, options and donations keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    /// Bids; their `options` lists are left empty, see `options`.
    pub bids: Vec<Bid>,
    /// Bid options of every bid.
    pub options: Vec<OptionRecord>,
    /// Donations.
    pub donations: Vec<Donation>,
    /// Earmarks keyed by donation id.
    pub earmarks: HashMap<EntityId, Earmark>,
    /// Events.
    pub events: Vec<Event>,
    /// Prizes.
    pub prizes: Vec<Prize>,
    /// Canned rows served by [`RowSource::run_rows`].
    pub run_rows: Vec<RunRow>,
    /// Canned rows served by [`RowSource::schedule_rows`].
    pub schedule_rows: Vec<ScheduleRow>,
}

impl LedgerState {
    /// Current total of a bid, zero when absent.
    #[must_use]
    pub fn bid_total(&self, bid_id: &str) -> f64 {
        self.bid(bid_id).map_or(0.0, |b| b.current_amount)
    }

    /// Current total of an option, zero when absent.
    #[must_use]
    pub fn option_total(&self, option_id: &str) -> f64 {
        self.option(option_id).map_or(0.0, |o| o.current_amount)
    }

    /// Sum of the option totals of a bid.
    #[must_use]
    pub fn options_sum(&self, bid_id: &str) -> f64 {
        self.options
            .iter()
            .filter(|o| o.bid_id.as_str() == bid_id)
            .map(|o| o.current_amount)
            .sum()
    }

    /// Sum of the donations earmarked to a bid.
    #[must_use]
    pub fn earmarked_sum(&self, bid_id: &str) -> f64 {
        self.donations
            .iter()
            .filter(|d| {
                self.earmarks
                    .get(&d.id)
                    .is_some_and(|e| e.bid_id.as_str() == bid_id)
            })
            .map(|d| d.amount)
            .sum()
    }

    fn bid(&self, bid_id: &str) -> Option<&Bid> {
        self.bids.iter().find(|b| b.id.as_str() == bid_id)
    }

    fn bid_mut(&mut self, bid_id: &str) -> Option<&mut Bid> {
        self.bids.iter_mut().find(|b| b.id.as_str() == bid_id)
    }

    fn option(&self, option_id: &str) -> Option<&OptionRecord> {
        self.options.iter().find(|o| o.id.as_str() == option_id)
    }

    fn option_mut(&mut self, option_id: &str) -> Option<&mut OptionRecord> {
        self.options.iter_mut().find(|o| o.id.as_str() == option_id)
    }

    fn donation_mut(&mut self, donation_id: &str) -> Option<&mut Donation> {
        self.donations.iter_mut().find(|d| d.id.as_str() == donation_id)
    }

    fn event_of_bid(&self, bid: &Bid) -> Option<&str> {
        let run = self.run_rows.iter().find(|r| r.run_id == bid.run_id.as_str())?;
        self.schedule_rows
            .iter()
            .find(|s| s.schedule_id == run.schedule_id)
            .map(|s| s.event_id.as_str())
    }
}

/// In-memory [`LedgerStore`] and [`RowSource`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<LedgerState>>,
    fail_countdown: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`-th write from now fail with a database error.
    ///
    /// `0` disarms a pending failure. The failure fires once.
    pub fn fail_on_write(&self, n: usize) {
        self.fail_countdown.store(n, Ordering::SeqCst);
    }

    /// Returns a copy of the committed state.
    pub async fn snapshot(&self) -> LedgerState {
        self.state.lock().await.clone()
    }

    /// Inserts a bid with a zero total, named after its id, on run `R1`.
    pub async fn seed_bid(&self, bid_id: &str, bid_type: BidType, create_new_options: bool) {
        self.insert_bid(Bid {
            id: bid_id.into(),
            bidname: bid_id.to_string(),
            goal: 0.0,
            current_amount: 0.0,
            description: String::new(),
            bid_type,
            create_new_options,
            status: "open".to_string(),
            run_id: "R1".into(),
            options: Vec::new(),
        })
        .await;
    }

    /// Inserts a bid as given; options on it are stored separately.
    pub async fn insert_bid(&self, mut bid: Bid) {
        let mut state = self.state.lock().await;
        for option in bid.options.drain(..) {
            state.options.push(OptionRecord {
                id: option.id,
                bid_id: option.bid_id,
                name: option.name,
                current_amount: option.current_amount,
            });
        }
        state.bids.push(bid);
    }

    /// Inserts an option with a zero total.
    pub async fn seed_option(&self, bid_id: &str, option_id: &str, name: &str) {
        self.state.lock().await.options.push(OptionRecord {
            id: option_id.into(),
            bid_id: bid_id.into(),
            name: name.to_string(),
            current_amount: 0.0,
        });
    }

    /// Inserts an event.
    pub async fn seed_event(&self, event: Event) {
        self.state.lock().await.events.push(event);
    }

    /// Inserts a prize.
    pub async fn seed_prize(&self, prize: Prize) {
        self.state.lock().await.prizes.push(prize);
    }

    /// Appends canned run rows.
    pub async fn seed_run_rows(&self, rows: impl IntoIterator<Item = RunRow>) {
        self.state.lock().await.run_rows.extend(rows);
    }

    /// Appends canned schedule rows.
    pub async fn seed_schedule_rows(&self, rows: impl IntoIterator<Item = ScheduleRow>) {
        self.state.lock().await.schedule_rows.extend(rows);
    }

    /// Overwrites a bid total without touching anything else, to simulate
    /// drift.
    pub async fn force_bid_total(&self, bid_id: &str, total: f64) {
        if let Some(bid) = self.state.lock().await.bid_mut(bid_id) {
            bid.current_amount = total;
        }
    }
}

impl LedgerStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, MarathonError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = LedgerState::clone(&guard);
        Ok(MemoryTx {
            guard,
            work,
            fail_countdown: Arc::clone(&self.fail_countdown),
        })
    }
}

/// A unit of work over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<LedgerState>,
    work: LedgerState,
    fail_countdown: Arc<AtomicUsize>,
}

impl MemoryTx {
    fn write(&self) -> Result<(), MarathonError> {
        let fired = self
            .fail_countdown
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok_and(|previous| previous == 1);
        if fired {
            Err(MarathonError::Database("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn bid_total_mut(&mut self, bid_id: &EntityId) -> Result<&mut f64, MarathonError> {
        self.work
            .bid_mut(bid_id.as_str())
            .map(|b| &mut b.current_amount)
            .ok_or_else(|| MarathonError::not_found("bid", bid_id))
    }

    fn option_total_mut(&mut self, option_id: &EntityId) -> Result<&mut f64, MarathonError> {
        self.work
            .option_mut(option_id.as_str())
            .map(|o| &mut o.current_amount)
            .ok_or_else(|| MarathonError::not_found("bid_option", option_id))
    }
}

fn replace(total: &mut f64, adjusted: Adjusted) -> Adjusted {
    *total = adjusted.current;
    adjusted
}

impl LedgerTx for MemoryTx {
    async fn find_bid(&mut self, bid_id: &EntityId) -> Result<BidRecord, MarathonError> {
        self.work
            .bid(bid_id.as_str())
            .map(|b| BidRecord {
                id: b.id.clone(),
                bid_type: b.bid_type,
                create_new_options: b.create_new_options,
                current_amount: b.current_amount,
            })
            .ok_or_else(|| MarathonError::not_found("bid", bid_id))
    }

    async fn find_option(&mut self, option_id: &EntityId) -> Result<OptionRecord, MarathonError> {
        self.work
            .option(option_id.as_str())
            .cloned()
            .ok_or_else(|| MarathonError::not_found("bid_option", option_id))
    }

    async fn find_option_by_name(
        &mut self,
        bid_id: &EntityId,
        name: &str,
    ) -> Result<Option<OptionRecord>, MarathonError> {
        Ok(self
            .work
            .options
            .iter()
            .find(|o| &o.bid_id == bid_id && o.name == name)
            .cloned())
    }

    async fn options_of_bid(&mut self, bid_id: &EntityId) -> Result<Vec<OptionRecord>, MarathonError> {
        Ok(self
            .work
            .options
            .iter()
            .filter(|o| &o.bid_id == bid_id)
            .cloned()
            .collect())
    }

    async fn upsert_option(&mut self, option: &OptionRecord) -> Result<Adjusted, MarathonError> {
        self.write()?;
        if let Some(existing) = self.work.option_mut(option.id.as_str()) {
            let adjusted = Adjusted::apply(existing.current_amount, option.current_amount);
            return Ok(replace(&mut existing.current_amount, adjusted));
        }
        if self
            .work
            .options
            .iter()
            .any(|o| o.bid_id == option.bid_id && o.name == option.name)
        {
            return Err(MarathonError::Duplicated(format!(
                "bid_option: {} already exists on bid {}",
                option.name, option.bid_id
            )));
        }
        if self.work.bid(option.bid_id.as_str()).is_none() {
            return Err(MarathonError::not_found("bid", &option.bid_id));
        }
        self.work.options.push(option.clone());
        Ok(Adjusted {
            previous: 0.0,
            current: option.current_amount,
        })
    }

    async fn find_donation(&mut self, donation_id: &EntityId) -> Result<Donation, MarathonError> {
        self.work
            .donations
            .iter()
            .find(|d| &d.id == donation_id)
            .cloned()
            .ok_or_else(|| MarathonError::not_found("donation", donation_id))
    }

    async fn insert_donation(&mut self, donation: &Donation) -> Result<(), MarathonError> {
        self.write()?;
        if self.work.donations.iter().any(|d| d.id == donation.id) {
            return Err(MarathonError::Duplicated(format!("donation: {}", donation.id)));
        }
        self.work.donations.push(donation.clone());
        Ok(())
    }

    async fn update_donation(&mut self, donation: &Donation) -> Result<(), MarathonError> {
        self.write()?;
        let stored = self
            .work
            .donation_mut(donation.id.as_str())
            .ok_or_else(|| MarathonError::not_found("donation", &donation.id))?;
        *stored = donation.clone();
        Ok(())
    }

    async fn delete_donation(&mut self, donation_id: &EntityId) -> Result<(), MarathonError> {
        self.write()?;
        let before = self.work.donations.len();
        self.work.donations.retain(|d| &d.id != donation_id);
        if self.work.donations.len() == before {
            return Err(MarathonError::not_found("donation", donation_id));
        }
        self.work.earmarks.remove(donation_id);
        Ok(())
    }

    async fn find_earmark(&mut self, donation_id: &EntityId) -> Result<Option<Earmark>, MarathonError> {
        Ok(self.work.earmarks.get(donation_id).cloned())
    }

    async fn set_earmark(&mut self, donation_id: &EntityId, earmark: &Earmark) -> Result<(), MarathonError> {
        self.write()?;
        self.work.earmarks.insert(donation_id.clone(), earmark.clone());
        Ok(())
    }

    async fn clear_earmark(&mut self, donation_id: &EntityId) -> Result<(), MarathonError> {
        self.write()?;
        self.work.earmarks.remove(donation_id);
        Ok(())
    }

    async fn adjust_bid_total(&mut self, bid_id: &EntityId, delta: f64) -> Result<Adjusted, MarathonError> {
        self.write()?;
        let total = self.bid_total_mut(bid_id)?;
        let adjusted = Adjusted::apply(*total, delta);
        Ok(replace(total, adjusted))
    }

    async fn adjust_option_total(
        &mut self,
        option_id: &EntityId,
        delta: f64,
    ) -> Result<Adjusted, MarathonError> {
        self.write()?;
        let total = self.option_total_mut(option_id)?;
        let adjusted = Adjusted::apply(*total, delta);
        Ok(replace(total, adjusted))
    }

    async fn set_bid_total(&mut self, bid_id: &EntityId, total: f64) -> Result<Adjusted, MarathonError> {
        self.write()?;
        let stored = self.bid_total_mut(bid_id)?;
        let previous = *stored;
        *stored = total.max(0.0);
        Ok(Adjusted {
            previous,
            current: *stored,
        })
    }

    async fn set_option_total(
        &mut self,
        option_id: &EntityId,
        total: f64,
    ) -> Result<Adjusted, MarathonError> {
        self.write()?;
        let stored = self.option_total_mut(option_id)?;
        let previous = *stored;
        *stored = total.max(0.0);
        Ok(Adjusted {
            previous,
            current: *stored,
        })
    }

    async fn earmarked_amounts(&mut self, bid_id: &EntityId) -> Result<Vec<EarmarkedAmount>, MarathonError> {
        Ok(self
            .work
            .donations
            .iter()
            .filter_map(|d| {
                let earmark = self.work.earmarks.get(&d.id)?;
                (&earmark.bid_id == bid_id).then(|| EarmarkedAmount {
                    donation_id: d.id.clone(),
                    option_id: earmark.option_id.clone(),
                    amount: d.amount,
                })
            })
            .collect())
    }

    async fn commit(mut self) -> Result<(), MarathonError> {
        *self.guard = self.work;
        Ok(())
    }

    async fn rollback(self) -> Result<(), MarathonError> {
        Ok(())
    }
}

fn scope_matches(scope: &RowScope, id: &str, event_id: Option<&str>) -> bool {
    match scope {
        RowScope::All => true,
        RowScope::Id(wanted) => wanted.as_str() == id,
        RowScope::Event(wanted) => event_id == Some(wanted.as_str()),
    }
}

impl RowSource for MemoryStore {
    async fn run_rows(&self, scope: RowScope) -> Result<Vec<RunRow>, MarathonError> {
        let state = self.state.lock().await;
        Ok(state
            .run_rows
            .iter()
            .filter(|row| {
                let event = state
                    .schedule_rows
                    .iter()
                    .find(|s| s.schedule_id == row.schedule_id)
                    .map(|s| s.event_id.as_str());
                scope_matches(&scope, &row.run_id, event)
            })
            .cloned()
            .collect())
    }

    async fn schedule_rows(&self, scope: RowScope) -> Result<Vec<ScheduleRow>, MarathonError> {
        let state = self.state.lock().await;
        Ok(state
            .schedule_rows
            .iter()
            .filter(|row| scope_matches(&scope, &row.schedule_id, Some(row.event_id.as_str())))
            .cloned()
            .collect())
    }

    async fn bid_rows(&self, scope: RowScope) -> Result<Vec<BidRow>, MarathonError> {
        let state = self.state.lock().await;
        let mut rows = Vec::new();
        for bid in &state.bids {
            if !scope_matches(&scope, bid.id.as_str(), state.event_of_bid(bid)) {
                continue;
            }
            let base = BidRow {
                bid_id: bid.id.to_string(),
                bidname: bid.bidname.clone(),
                goal: bid.goal,
                current_amount: bid.current_amount,
                description: bid.description.clone(),
                bid_type: bid.bid_type,
                create_new_options: bid.create_new_options,
                status: bid.status.clone(),
                run_id: bid.run_id.to_string(),
                option_id: None,
                option_name: None,
                option_current_amount: None,
            };
            let options: Vec<&OptionRecord> =
                state.options.iter().filter(|o| o.bid_id == bid.id).collect();
            if options.is_empty() {
                rows.push(base);
                continue;
            }
            for option in options {
                rows.push(BidRow {
                    option_id: Some(option.id.to_string()),
                    option_name: Some(option.name.clone()),
                    option_current_amount: Some(option.current_amount),
                    ..base.clone()
                });
            }
        }
        Ok(rows)
    }

    async fn donation_rows(&self, scope: RowScope) -> Result<Vec<DonationRow>, MarathonError> {
        let state = self.state.lock().await;
        Ok(state
            .donations
            .iter()
            .filter(|d| scope_matches(&scope, d.id.as_str(), Some(d.event_id.as_str())))
            .map(|d| {
                let earmark = state.earmarks.get(&d.id);
                let bid = earmark.and_then(|e| state.bid(e.bid_id.as_str()));
                let option = earmark
                    .and_then(|e| e.option_id.as_ref())
                    .and_then(|id| state.option(id.as_str()));
                DonationRow {
                    donation_id: d.id.to_string(),
                    donor_name: d.name.clone(),
                    email: d.email.clone(),
                    time_mili: d.time_mili,
                    amount: d.amount,
                    description: d.description.clone(),
                    to_bid: d.to_bid,
                    event_id: d.event_id.to_string(),
                    bid_id: bid.map(|b| b.id.to_string()),
                    bidname: bid.map(|b| b.bidname.clone()),
                    bid_type: bid.map(|b| b.bid_type),
                    bid_current_amount: bid.map(|b| b.current_amount),
                    run_id: bid.map(|b| b.run_id.to_string()),
                    option_id: option.map(|o| o.id.to_string()),
                    option_name: option.map(|o| o.name.clone()),
                    option_current_amount: option.map(|o| o.current_amount),
                }
            })
            .collect())
    }

    async fn prizes(&self, scope: RowScope) -> Result<Vec<Prize>, MarathonError> {
        let state = self.state.lock().await;
        let mut prizes: Vec<Prize> = state
            .prizes
            .iter()
            .filter(|p| scope_matches(&scope, p.id.as_str(), Some(p.event_id.as_str())))
            .cloned()
            .collect();
        prizes.sort_by(|a, b| a.min_amount.total_cmp(&b.min_amount).then_with(|| a.id.cmp(&b.id)));
        Ok(prizes)
    }

    async fn event_summary(&self, event_id: &EntityId) -> Result<EventSummary, MarathonError> {
        let state = self.state.lock().await;
        let event = state
            .events
            .iter()
            .find(|e| &e.id == event_id)
            .cloned()
            .ok_or_else(|| MarathonError::not_found("event", event_id))?;
        let schedules: Vec<&str> = state
            .schedule_rows
            .iter()
            .filter(|s| s.event_id == event_id.as_str())
            .map(|s| s.schedule_id.as_str())
            .collect();
        let runs: Vec<&RunRow> = state
            .run_rows
            .iter()
            .filter(|r| schedules.contains(&r.schedule_id.as_str()))
            .collect();
        let run_ids = distinct(runs.iter().map(|r| r.run_id.as_str()));
        let users = distinct(runs.iter().filter_map(|r| r.user_id.as_deref()));
        let schedules = distinct(schedules.into_iter());
        Ok(EventSummary {
            event,
            schedules_count: count(schedules.len()),
            runs_count: count(run_ids.len()),
            prizes_count: count(
                state
                    .prizes
                    .iter()
                    .filter(|p| &p.event_id == event_id)
                    .count(),
            ),
            bids_count: count(
                state
                    .bids
                    .iter()
                    .filter(|b| run_ids.contains(&b.run_id.as_str()))
                    .count(),
            ),
            donations_count: count(
                state
                    .donations
                    .iter()
                    .filter(|d| &d.event_id == event_id)
                    .count(),
            ),
            users_count: count(users.len()),
        })
    }

    async fn total_donated(&self, event_id: &EntityId) -> Result<f64, MarathonError> {
        let state = self.state.lock().await;
        Ok(state
            .donations
            .iter()
            .filter(|d| &d.event_id == event_id)
            .map(|d| d.amount)
            .sum())
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut ids: Vec<&str> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn donation(id: &str) -> Donation {
        Donation {
            id: id.into(),
            name: "donor".to_string(),
            email: String::new(),
            time_mili: 0,
            amount: 5.0,
            description: String::new(),
            to_bid: false,
            event_id: "E1".into(),
        }
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(()) = tx.insert_donation(&donation("D1")).await else {
            panic!("insert failed");
        };
        let Ok(()) = tx.rollback().await else {
            panic!("rollback failed");
        };
        assert!(store.snapshot().await.donations.is_empty());
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = MemoryStore::new();
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(()) = tx.insert_donation(&donation("D1")).await else {
            panic!("insert failed");
        };
        let Ok(()) = tx.commit().await else {
            panic!("commit failed");
        };
        assert_eq!(store.snapshot().await.donations.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_donation_is_rejected() {
        let store = MemoryStore::new();
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(()) = tx.insert_donation(&donation("D1")).await else {
            panic!("insert failed");
        };
        let result = tx.insert_donation(&donation("D1")).await;
        assert!(matches!(result, Err(MarathonError::Duplicated(_))));
    }

    #[tokio::test]
    async fn duplicate_option_name_is_rejected() {
        let store = MemoryStore::new();
        store.seed_bid("B1", BidType::Bidwar, true).await;
        store.seed_option("B1", "O1", "left").await;
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let result = tx
            .upsert_option(&OptionRecord {
                id: "O9".into(),
                bid_id: "B1".into(),
                name: "left".to_string(),
                current_amount: 1.0,
            })
            .await;
        assert!(matches!(result, Err(MarathonError::Duplicated(_))));
    }

    #[tokio::test]
    async fn injected_failure_fires_once_on_nth_write() {
        let store = MemoryStore::new();
        store.fail_on_write(2);
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        assert!(tx.insert_donation(&donation("D1")).await.is_ok());
        assert!(tx.insert_donation(&donation("D2")).await.is_err());
        assert!(tx.insert_donation(&donation("D3")).await.is_ok());
    }

    #[tokio::test]
    async fn adjust_floors_at_zero() {
        let store = MemoryStore::new();
        store.seed_bid("B1", BidType::Total, false).await;
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        let Ok(adjusted) = tx.adjust_bid_total(&"B1".into(), -3.0).await else {
            panic!("adjust failed");
        };
        assert!(adjusted.current.abs() < f64::EPSILON);
        assert_eq!(adjusted.shortfall(-3.0), Some(3.0));
    }

    #[tokio::test]
    async fn bid_rows_expand_options() {
        let store = MemoryStore::new();
        store.seed_bid("B1", BidType::Bidwar, true).await;
        store.seed_option("B1", "O1", "left").await;
        store.seed_option("B1", "O2", "right").await;
        store.seed_bid("B2", BidType::Goal, false).await;
        let Ok(rows) = store.bid_rows(RowScope::All).await else {
            panic!("bid rows failed");
        };
        assert_eq!(rows.len(), 3);
        let Ok(rows) = store.bid_rows(RowScope::Id("B2".into())).await else {
            panic!("bid rows failed");
        };
        assert_eq!(rows.len(), 1);
    }
}
