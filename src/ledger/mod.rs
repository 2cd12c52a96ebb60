//! Donation ledger: keeps bid and option totals consistent with donations.
//!
//! Every donation write runs through [`Ledger`] in a single unit of work:
//!
//! - [`Ledger::allocate`] records a donation and credits its earmark;
//! - [`Ledger::reallocate`] edits a donation, moving or resizing the credit;
//! - [`Ledger::deallocate`] deletes a donation and debits its earmark.
//!
//! Totals are moved by deltas. Subtractions are floored at zero and the
//! shortfall is logged; [`Ledger::audit`] and [`Ledger::reconcile`] recompute
//! totals from the earmarked donations when drift has to be found or fixed.
//!
//! A failing step rolls back the whole unit of work, including the donation
//! row itself.

pub mod audit;
pub mod store;

use chrono::Utc;

pub use audit::{AuditReport, OptionAudit, Reconciliation};
pub use store::{Adjusted, BidRecord, EarmarkedAmount, LedgerStore, LedgerTx, OptionRecord};

use crate::domain::{Donation, Earmark, EarmarkRequest, EntityId, LedgerEvent};
use crate::error::MarathonError;

/// Kind of ledger operation a receipt describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    /// Donation created.
    Allocate,
    /// Donation edited.
    Reallocate,
    /// Donation deleted.
    Deallocate,
}

/// A running total moved by a ledger operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TotalChange {
    /// A bid total.
    Bid {
        /// Bid identifier.
        bid_id: EntityId,
        /// Total before and after.
        adjusted: Adjusted,
    },
    /// A bidwar option total.
    Option {
        /// Owning bid.
        bid_id: EntityId,
        /// Option identifier.
        option_id: EntityId,
        /// Total before and after.
        adjusted: Adjusted,
    },
}

impl TotalChange {
    /// Converts the change into a total-changed event.
    #[must_use]
    pub fn into_event(self, timestamp: chrono::DateTime<Utc>) -> LedgerEvent {
        match self {
            Self::Bid { bid_id, adjusted } => LedgerEvent::BidTotalChanged {
                bid_id,
                previous: adjusted.previous,
                current: adjusted.current,
                timestamp,
            },
            Self::Option {
                bid_id,
                option_id,
                adjusted,
            } => LedgerEvent::OptionTotalChanged {
                bid_id,
                option_id,
                previous: adjusted.previous,
                current: adjusted.current,
                timestamp,
            },
        }
    }
}

/// Outcome of a committed ledger operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReceipt {
    /// What was done.
    pub op: LedgerOp,
    /// The donation as written (or as it was before deletion).
    pub donation: Donation,
    /// The resolved earmark after the operation (before it, for deletions).
    pub earmark: Option<Earmark>,
    /// Totals moved, in the order they were applied.
    pub changes: Vec<TotalChange>,
}

impl LedgerReceipt {
    /// Converts the receipt into the events to broadcast.
    #[must_use]
    pub fn into_events(self) -> Vec<LedgerEvent> {
        let timestamp = Utc::now();
        let bid_id = self.earmark.as_ref().map(|e| e.bid_id.clone());
        let head = match self.op {
            LedgerOp::Allocate | LedgerOp::Reallocate => LedgerEvent::DonationRecorded {
                donation_id: self.donation.id,
                event_id: self.donation.event_id,
                amount: self.donation.amount,
                bid_id,
                option_id: self.earmark.and_then(|e| e.option_id),
                timestamp,
            },
            LedgerOp::Deallocate => LedgerEvent::DonationRemoved {
                donation_id: self.donation.id,
                event_id: self.donation.event_id,
                amount: self.donation.amount,
                bid_id,
                timestamp,
            },
        };
        std::iter::once(head)
            .chain(self.changes.into_iter().map(|c| c.into_event(timestamp)))
            .collect()
    }
}

/// Where a credit lands once an [`EarmarkRequest`] is resolved.
#[derive(Debug)]
enum OptionTarget {
    /// Total/goal bid: options are not tracked.
    None,
    /// An option that already exists.
    Existing(OptionRecord),
    /// An option created by this operation.
    New { id: EntityId, name: String },
}

#[derive(Debug)]
struct Target {
    bid: BidRecord,
    option: OptionTarget,
}

impl Target {
    fn earmark(&self) -> Earmark {
        let option_id = match &self.option {
            OptionTarget::None => None,
            OptionTarget::Existing(option) => Some(option.id.clone()),
            OptionTarget::New { id, .. } => Some(id.clone()),
        };
        Earmark {
            bid_id: self.bid.id.clone(),
            option_id,
        }
    }
}

/// Transactional donation ledger over a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct Ledger<S> {
    store: S,
}

impl<S> Ledger<S> {
    /// Creates a ledger over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LedgerStore> Ledger<S> {

    /// Records a new donation and credits its earmark.
    ///
    /// For bidwars a missing option id is synthesized when an option name is
    /// given and the bid accepts new options; the option is created with the
    /// donated amount. Options are ignored on total and goal bids.
    ///
    /// # Errors
    ///
    /// - [`MarathonError::InvalidRequest`] when `to_bid` is set without a
    ///   target, or a bidwar target does not resolve to an option.
    /// - [`MarathonError::NotFound`] when the bid or option is absent.
    /// - [`MarathonError::Duplicated`] when the donation id already exists.
    /// - [`MarathonError::Database`] on any other store failure.
    #[tracing::instrument(skip_all, fields(donation_id = %donation.id, amount = donation.amount))]
    pub async fn allocate(
        &self,
        donation: Donation,
        earmark: Option<EarmarkRequest>,
    ) -> Result<LedgerReceipt, MarathonError> {
        let request = earmark_for(&donation, earmark)?;
        let mut tx = self.store.begin().await?;
        let result = allocate_in(&mut tx, donation, request).await;
        finish(tx, result).await
    }

    /// Replaces a donation's fields and moves its credit accordingly.
    ///
    /// Keeping the same bid and option applies the amount difference once.
    /// Changing target debits the old amount from the old target and credits
    /// the new amount to the new one. Clearing `to_bid` is a pure debit.
    ///
    /// # Errors
    ///
    /// Same as [`Ledger::allocate`]; additionally
    /// [`MarathonError::NotFound`] when the donation is absent.
    #[tracing::instrument(skip_all, fields(donation_id = %donation.id, amount = donation.amount))]
    pub async fn reallocate(
        &self,
        donation: Donation,
        earmark: Option<EarmarkRequest>,
    ) -> Result<LedgerReceipt, MarathonError> {
        let request = earmark_for(&donation, earmark)?;
        let mut tx = self.store.begin().await?;
        let result = reallocate_in(&mut tx, donation, request).await;
        finish(tx, result).await
    }

    /// Deletes a donation and debits its earmark.
    ///
    /// # Errors
    ///
    /// - [`MarathonError::NotFound`] when the donation is absent.
    /// - [`MarathonError::Database`] on any store failure.
    #[tracing::instrument(skip_all, fields(donation_id = %donation_id))]
    pub async fn deallocate(&self, donation_id: &EntityId) -> Result<LedgerReceipt, MarathonError> {
        let mut tx = self.store.begin().await?;
        let result = deallocate_in(&mut tx, donation_id).await;
        finish(tx, result).await
    }
}

/// Commits on success, rolls back on failure.
async fn finish<T, X: LedgerTx>(tx: X, result: Result<T, MarathonError>) -> Result<T, MarathonError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            tracing::warn!(error = %err, "ledger operation rolled back");
            Err(err)
        }
    }
}

/// Validates the `to_bid` flag against the requested earmark.
fn earmark_for(
    donation: &Donation,
    earmark: Option<EarmarkRequest>,
) -> Result<Option<EarmarkRequest>, MarathonError> {
    match (donation.to_bid, earmark) {
        (true, Some(request)) => Ok(Some(request)),
        (true, None) => Err(MarathonError::InvalidRequest(
            "donation marked to_bid without a bid".to_string(),
        )),
        (false, Some(request)) => {
            tracing::debug!(bid_id = %request.bid_id, "earmark ignored, donation not marked to_bid");
            Ok(None)
        }
        (false, None) => Ok(None),
    }
}

async fn allocate_in<X: LedgerTx>(
    tx: &mut X,
    donation: Donation,
    request: Option<EarmarkRequest>,
) -> Result<LedgerReceipt, MarathonError> {
    tx.insert_donation(&donation).await?;
    let mut changes = Vec::new();
    let earmark = match request {
        Some(request) => {
            let target = resolve(tx, &request).await?;
            let earmark = credit(tx, target, donation.amount, &mut changes).await?;
            tx.set_earmark(&donation.id, &earmark).await?;
            Some(earmark)
        }
        None => None,
    };
    tracing::info!(
        donation_id = %donation.id,
        bid_id = ?earmark.as_ref().map(|e| &e.bid_id),
        "donation allocated"
    );
    Ok(LedgerReceipt {
        op: LedgerOp::Allocate,
        donation,
        earmark,
        changes,
    })
}

async fn reallocate_in<X: LedgerTx>(
    tx: &mut X,
    donation: Donation,
    request: Option<EarmarkRequest>,
) -> Result<LedgerReceipt, MarathonError> {
    let old = tx.find_donation(&donation.id).await?;
    let old_earmark = tx.find_earmark(&donation.id).await?;
    tx.update_donation(&donation).await?;

    let mut changes = Vec::new();
    let earmark = match (old_earmark, request) {
        (Some(old_earmark), Some(request)) => {
            lock_in_order(tx, &old_earmark.bid_id, &request.bid_id).await?;
            let target = resolve(tx, &request).await?;
            if target.earmark() == old_earmark {
                let delta = donation.amount - old.amount;
                shift(tx, &old_earmark, delta, &mut changes).await?;
                Some(old_earmark)
            } else {
                shift(tx, &old_earmark, -old.amount, &mut changes).await?;
                let earmark = credit(tx, target, donation.amount, &mut changes).await?;
                tx.set_earmark(&donation.id, &earmark).await?;
                Some(earmark)
            }
        }
        (Some(old_earmark), None) => {
            shift(tx, &old_earmark, -old.amount, &mut changes).await?;
            tx.clear_earmark(&donation.id).await?;
            None
        }
        (None, Some(request)) => {
            let target = resolve(tx, &request).await?;
            let earmark = credit(tx, target, donation.amount, &mut changes).await?;
            tx.set_earmark(&donation.id, &earmark).await?;
            Some(earmark)
        }
        (None, None) => None,
    };
    tracing::info!(donation_id = %donation.id, old_amount = old.amount, "donation reallocated");
    Ok(LedgerReceipt {
        op: LedgerOp::Reallocate,
        donation,
        earmark,
        changes,
    })
}

async fn deallocate_in<X: LedgerTx>(
    tx: &mut X,
    donation_id: &EntityId,
) -> Result<LedgerReceipt, MarathonError> {
    let donation = tx.find_donation(donation_id).await?;
    let earmark = tx.find_earmark(donation_id).await?;
    let mut changes = Vec::new();
    if let Some(earmark) = &earmark {
        tx.find_bid(&earmark.bid_id).await?;
        shift(tx, earmark, -donation.amount, &mut changes).await?;
        tx.clear_earmark(donation_id).await?;
    }
    tx.delete_donation(donation_id).await?;
    tracing::info!(donation_id = %donation_id, "donation deallocated");
    Ok(LedgerReceipt {
        op: LedgerOp::Deallocate,
        donation,
        earmark,
        changes,
    })
}

/// Locks two bids in id order so concurrent moves between them cannot
/// deadlock.
async fn lock_in_order<X: LedgerTx>(
    tx: &mut X,
    a: &EntityId,
    b: &EntityId,
) -> Result<(), MarathonError> {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    tx.find_bid(first).await?;
    if first != second {
        tx.find_bid(second).await?;
    }
    Ok(())
}

/// Resolves a requested earmark into a concrete bid and option.
async fn resolve<X: LedgerTx>(tx: &mut X, request: &EarmarkRequest) -> Result<Target, MarathonError> {
    let bid = tx.find_bid(&request.bid_id).await?;
    if !bid.bid_type.tracks_options() {
        if request.option_id.is_some() || request.option_name.is_some() {
            tracing::debug!(bid_id = %bid.id, bid_type = %bid.bid_type, "option ignored on non-bidwar bid");
        }
        return Ok(Target {
            bid,
            option: OptionTarget::None,
        });
    }

    // Blank ids and names count as absent.
    let option_id = request
        .option_id
        .as_ref()
        .filter(|id| !id.as_str().trim().is_empty());
    let option_name = request
        .option_name
        .as_ref()
        .filter(|name| !name.trim().is_empty());
    let option = match (option_id, option_name) {
        (Some(option_id), name) => match tx.find_option(option_id).await {
            Ok(option) if option.bid_id == bid.id => OptionTarget::Existing(option),
            Ok(_) => return Err(MarathonError::not_found("bid_option", option_id)),
            Err(MarathonError::NotFound { .. }) => match name {
                Some(name) if bid.create_new_options => OptionTarget::New {
                    id: option_id.clone(),
                    name: name.clone(),
                },
                _ => return Err(MarathonError::not_found("bid_option", option_id)),
            },
            Err(err) => return Err(err),
        },
        (None, Some(name)) => match tx.find_option_by_name(&bid.id, name).await? {
            Some(option) => OptionTarget::Existing(option),
            None if bid.create_new_options => OptionTarget::New {
                id: EntityId::new(),
                name: name.clone(),
            },
            None => {
                return Err(MarathonError::InvalidRequest(format!(
                    "bid {} does not accept new options",
                    bid.id
                )));
            }
        },
        (None, None) => {
            return Err(MarathonError::InvalidRequest(format!(
                "bidwar {} requires an option",
                bid.id
            )));
        }
    };
    Ok(Target { bid, option })
}

/// Credits `amount` to a resolved target, creating the option if needed.
async fn credit<X: LedgerTx>(
    tx: &mut X,
    target: Target,
    amount: f64,
    changes: &mut Vec<TotalChange>,
) -> Result<Earmark, MarathonError> {
    let earmark = target.earmark();
    let bid_id = target.bid.id;
    match target.option {
        OptionTarget::None => {}
        OptionTarget::Existing(option) => {
            let adjusted = tx.adjust_option_total(&option.id, amount).await?;
            record_option(changes, &bid_id, option.id, adjusted, amount);
        }
        OptionTarget::New { id, name } => {
            let record = OptionRecord {
                id,
                bid_id: bid_id.clone(),
                name,
                current_amount: amount,
            };
            let adjusted = tx.upsert_option(&record).await?;
            tracing::info!(bid_id = %bid_id, option_id = %record.id, name = %record.name, "bid option created");
            record_option(changes, &bid_id, record.id, adjusted, amount);
        }
    }
    let adjusted = tx.adjust_bid_total(&bid_id, amount).await?;
    record_bid(changes, bid_id, adjusted, amount);
    Ok(earmark)
}

/// Applies `delta` to an already-resolved earmark (option first, then bid).
async fn shift<X: LedgerTx>(
    tx: &mut X,
    earmark: &Earmark,
    delta: f64,
    changes: &mut Vec<TotalChange>,
) -> Result<(), MarathonError> {
    if delta == 0.0 {
        return Ok(());
    }
    if let Some(option_id) = &earmark.option_id {
        let adjusted = tx.adjust_option_total(option_id, delta).await?;
        record_option(changes, &earmark.bid_id, option_id.clone(), adjusted, delta);
    }
    let adjusted = tx.adjust_bid_total(&earmark.bid_id, delta).await?;
    record_bid(changes, earmark.bid_id.clone(), adjusted, delta);
    Ok(())
}

fn record_bid(changes: &mut Vec<TotalChange>, bid_id: EntityId, adjusted: Adjusted, delta: f64) {
    if let Some(shortfall) = adjusted.shortfall(delta) {
        tracing::warn!(bid_id = %bid_id, shortfall, "bid total floored at zero");
    }
    changes.push(TotalChange::Bid { bid_id, adjusted });
}

fn record_option(
    changes: &mut Vec<TotalChange>,
    bid_id: &EntityId,
    option_id: EntityId,
    adjusted: Adjusted,
    delta: f64,
) {
    if let Some(shortfall) = adjusted.shortfall(delta) {
        tracing::warn!(bid_id = %bid_id, option_id = %option_id, shortfall, "option total floored at zero");
    }
    changes.push(TotalChange::Option {
        bid_id: bid_id.clone(),
        option_id,
        adjusted,
    });
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::BidType;
    use crate::persistence::memory::MemoryStore;

    fn donation(id: &str, amount: f64, to_bid: bool) -> Donation {
        Donation {
            id: EntityId::from(id),
            name: "donor".to_string(),
            email: "donor@example.com".to_string(),
            time_mili: 0,
            amount,
            description: String::new(),
            to_bid,
            event_id: EntityId::from("E1"),
        }
    }

    async fn seeded() -> Ledger<MemoryStore> {
        let store = MemoryStore::new();
        store.seed_bid("B1", BidType::Bidwar, true).await;
        store.seed_option("B1", "O1", "left").await;
        store.seed_option("B1", "O2", "right").await;
        store.seed_bid("G1", BidType::Goal, false).await;
        Ledger::new(store)
    }

    #[tokio::test]
    async fn allocate_credits_option_and_bid() {
        let ledger = seeded().await;
        let request = EarmarkRequest::option("B1".into(), "O1".into());
        let Ok(receipt) = ledger.allocate(donation("D1", 10.0, true), Some(request)).await else {
            panic!("allocate failed");
        };
        assert_eq!(receipt.changes.len(), 2);
        let snapshot = ledger.store().snapshot().await;
        assert!((snapshot.bid_total("B1") - 10.0).abs() < f64::EPSILON);
        assert!((snapshot.option_total("O1") - 10.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn to_bid_without_target_is_rejected() {
        let ledger = seeded().await;
        let result = ledger.allocate(donation("D1", 10.0, true), None).await;
        assert!(matches!(result, Err(MarathonError::InvalidRequest(_))));
        assert!(ledger.store().snapshot().await.donations.is_empty());
    }

    #[tokio::test]
    async fn bidwar_without_option_is_rejected() {
        let ledger = seeded().await;
        let request = EarmarkRequest::bid("B1".into());
        let result = ledger.allocate(donation("D1", 10.0, true), Some(request)).await;
        assert!(matches!(result, Err(MarathonError::InvalidRequest(_))));
        assert!(ledger.store().snapshot().await.donations.is_empty());
    }

    #[tokio::test]
    async fn goal_bid_ignores_option() {
        let ledger = seeded().await;
        let request = EarmarkRequest::option("G1".into(), "O1".into());
        let Ok(receipt) = ledger.allocate(donation("D1", 4.0, true), Some(request)).await else {
            panic!("allocate failed");
        };
        assert_eq!(receipt.earmark, Some(Earmark::bid("G1".into())));
        let snapshot = ledger.store().snapshot().await;
        assert!((snapshot.bid_total("G1") - 4.0).abs() < f64::EPSILON);
        assert!(snapshot.option_total("O1").abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn option_of_another_bid_is_not_found() {
        let ledger = seeded().await;
        ledger.store().seed_bid("B2", BidType::Bidwar, false).await;
        let request = EarmarkRequest::option("B2".into(), "O1".into());
        let result = ledger.allocate(donation("D1", 1.0, true), Some(request)).await;
        assert!(matches!(result, Err(MarathonError::NotFound { entity: "bid_option", .. })));
    }

    #[tokio::test]
    async fn new_option_by_name_is_created_with_amount() {
        let ledger = seeded().await;
        let request = EarmarkRequest::new_option("B1".into(), "middle");
        let Ok(receipt) = ledger.allocate(donation("D1", 7.0, true), Some(request)).await else {
            panic!("allocate failed");
        };
        let Some(Some(option_id)) = receipt.earmark.map(|e| e.option_id) else {
            panic!("expected a synthesized option");
        };
        let snapshot = ledger.store().snapshot().await;
        assert!((snapshot.option_total(option_id.as_str()) - 7.0).abs() < f64::EPSILON);
        assert!((snapshot.bid_total("B1") - 7.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn blank_option_id_with_name_creates_a_fresh_option() {
        let ledger = seeded().await;
        let blank = |name: &str| EarmarkRequest {
            bid_id: "B1".into(),
            option_id: Some(EntityId::from("")),
            option_name: Some(name.to_string()),
        };
        let Ok(first) = ledger.allocate(donation("D1", 10.0, true), Some(blank("alpha"))).await else {
            panic!("allocate failed");
        };
        let Ok(second) = ledger.allocate(donation("D2", 5.0, true), Some(blank("beta"))).await else {
            panic!("allocate failed");
        };
        let Some(Some(alpha)) = first.earmark.map(|e| e.option_id) else {
            panic!("expected alpha option");
        };
        let Some(Some(beta)) = second.earmark.map(|e| e.option_id) else {
            panic!("expected beta option");
        };
        assert_ne!(alpha, beta);
        assert!(!alpha.as_str().is_empty());
        let snapshot = ledger.store().snapshot().await;
        assert!((snapshot.option_total(alpha.as_str()) - 10.0).abs() < f64::EPSILON);
        assert!((snapshot.option_total(beta.as_str()) - 5.0).abs() < f64::EPSILON);
        assert!((snapshot.bid_total("B1") - 15.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn blank_option_id_without_name_is_rejected() {
        let ledger = seeded().await;
        let request = EarmarkRequest::option("B1".into(), " ".into());
        let result = ledger.allocate(donation("D1", 1.0, true), Some(request)).await;
        assert!(matches!(result, Err(MarathonError::InvalidRequest(_))));
    }

    #[test]
    fn ledger_wraps_any_store_type() {
        let ledger = Ledger::new("not a store");
        assert_eq!(*ledger.store(), "not a store");
    }

    #[tokio::test]
    async fn new_option_rejected_when_bid_is_closed_to_suggestions() {
        let ledger = seeded().await;
        ledger.store().seed_bid("B3", BidType::Bidwar, false).await;
        let request = EarmarkRequest::new_option("B3".into(), "anything");
        let result = ledger.allocate(donation("D1", 1.0, true), Some(request)).await;
        assert!(matches!(result, Err(MarathonError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn same_target_reallocation_applies_single_delta() {
        let ledger = seeded().await;
        let request = EarmarkRequest::option("B1".into(), "O1".into());
        let Ok(_) = ledger.allocate(donation("D1", 10.0, true), Some(request.clone())).await else {
            panic!("allocate failed");
        };
        let Ok(receipt) = ledger.reallocate(donation("D1", 15.0, true), Some(request)).await else {
            panic!("reallocate failed");
        };
        assert_eq!(receipt.changes.len(), 2);
        let snapshot = ledger.store().snapshot().await;
        assert!((snapshot.option_total("O1") - 15.0).abs() < f64::EPSILON);
        assert!((snapshot.bid_total("B1") - 15.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn clearing_to_bid_is_pure_deallocation() {
        let ledger = seeded().await;
        let request = EarmarkRequest::option("B1".into(), "O2".into());
        let Ok(_) = ledger.allocate(donation("D1", 10.0, true), Some(request)).await else {
            panic!("allocate failed");
        };
        let Ok(receipt) = ledger.reallocate(donation("D1", 10.0, false), None).await else {
            panic!("reallocate failed");
        };
        assert!(receipt.earmark.is_none());
        let snapshot = ledger.store().snapshot().await;
        assert!(snapshot.bid_total("B1").abs() < f64::EPSILON);
        assert!(snapshot.earmarks.is_empty());
    }

    #[tokio::test]
    async fn deallocate_missing_donation_is_not_found() {
        let ledger = seeded().await;
        let result = ledger.deallocate(&EntityId::from("nope")).await;
        assert!(matches!(result, Err(MarathonError::NotFound { entity: "donation", .. })));
    }

    #[tokio::test]
    async fn receipt_events_start_with_donation_event() {
        let ledger = seeded().await;
        let request = EarmarkRequest::bid("G1".into());
        let Ok(receipt) = ledger.allocate(donation("D1", 3.0, true), Some(request)).await else {
            panic!("allocate failed");
        };
        let events = receipt.into_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events.first(), Some(LedgerEvent::DonationRecorded { .. })));
        assert!(matches!(events.get(1), Some(LedgerEvent::BidTotalChanged { current, .. }) if (*current - 3.0).abs() < f64::EPSILON));
    }
}
