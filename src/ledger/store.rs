//! Unit-of-work seam between the ledger and its storage.
//!
//! [`LedgerStore::begin`] opens a [`LedgerTx`]; every read and write the
//! ledger performs for one donation operation goes through that transaction,
//! which is then committed or rolled back as a whole. Bid rows are locked on
//! first access so concurrent operations on the same bid serialize in the
//! store rather than in the process.

use std::future::Future;

use crate::domain::{BidType, Donation, Earmark, EntityId};
use crate::error::MarathonError;

/// The fields of a bid the ledger needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BidRecord {
    /// Bid identifier.
    pub id: EntityId,
    /// Variant.
    pub bid_type: BidType,
    /// Whether donors may add options.
    pub create_new_options: bool,
    /// Running total.
    pub current_amount: f64,
}

/// A bidwar option as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRecord {
    /// Option identifier.
    pub id: EntityId,
    /// Owning bid.
    pub bid_id: EntityId,
    /// Option name, unique within the bid.
    pub name: String,
    /// Running total.
    pub current_amount: f64,
}

/// One donation earmarked to a bid, as seen by audits.
#[derive(Debug, Clone, PartialEq)]
pub struct EarmarkedAmount {
    /// Donation identifier.
    pub donation_id: EntityId,
    /// Option the donation is earmarked to, if any.
    pub option_id: Option<EntityId>,
    /// Donated amount.
    pub amount: f64,
}

/// Result of applying a change to a running total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjusted {
    /// Total before the change.
    pub previous: f64,
    /// Total after the change, never negative.
    pub current: f64,
}

impl Adjusted {
    /// Applies `delta` to `previous`, flooring the result at zero.
    #[must_use]
    pub fn apply(previous: f64, delta: f64) -> Self {
        Self {
            previous,
            current: (previous + delta).max(0.0),
        }
    }

    /// Amount that could not be subtracted because the total hit zero.
    #[must_use]
    pub fn shortfall(&self, delta: f64) -> Option<f64> {
        let raw = self.previous + delta;
        (raw < 0.0).then_some(-raw)
    }

    /// Returns `true` when the total actually moved.
    #[must_use]
    pub fn changed(&self) -> bool {
        (self.current - self.previous).abs() > f64::EPSILON
    }
}

/// Opens units of work.
pub trait LedgerStore: Send + Sync {
    /// Transaction type handed to the ledger.
    type Tx: LedgerTx;

    /// Begins a unit of work.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, MarathonError>> + Send;
}

/// One atomic unit of work over donations, earmarks, bids and options.
///
/// Nothing written through a transaction is visible to others until
/// [`LedgerTx::commit`]; dropping or rolling back discards every write.
pub trait LedgerTx: Send {
    /// Loads a bid and locks it for the rest of the unit of work.
    fn find_bid(
        &mut self,
        bid_id: &EntityId,
    ) -> impl Future<Output = Result<BidRecord, MarathonError>> + Send;

    /// Loads an option by id.
    fn find_option(
        &mut self,
        option_id: &EntityId,
    ) -> impl Future<Output = Result<OptionRecord, MarathonError>> + Send;

    /// Looks an option up by its name within a bid.
    fn find_option_by_name(
        &mut self,
        bid_id: &EntityId,
        name: &str,
    ) -> impl Future<Output = Result<Option<OptionRecord>, MarathonError>> + Send;

    /// Lists the options of a bid in insertion order.
    fn options_of_bid(
        &mut self,
        bid_id: &EntityId,
    ) -> impl Future<Output = Result<Vec<OptionRecord>, MarathonError>> + Send;

    /// Inserts `option` with its amount, or adds the amount to the existing
    /// option with the same id.
    fn upsert_option(
        &mut self,
        option: &OptionRecord,
    ) -> impl Future<Output = Result<Adjusted, MarathonError>> + Send;

    /// Loads a donation.
    fn find_donation(
        &mut self,
        donation_id: &EntityId,
    ) -> impl Future<Output = Result<Donation, MarathonError>> + Send;

    /// Inserts a new donation.
    fn insert_donation(
        &mut self,
        donation: &Donation,
    ) -> impl Future<Output = Result<(), MarathonError>> + Send;

    /// Overwrites an existing donation.
    fn update_donation(
        &mut self,
        donation: &Donation,
    ) -> impl Future<Output = Result<(), MarathonError>> + Send;

    /// Deletes a donation.
    fn delete_donation(
        &mut self,
        donation_id: &EntityId,
    ) -> impl Future<Output = Result<(), MarathonError>> + Send;

    /// Loads the earmark of a donation, if it has one.
    fn find_earmark(
        &mut self,
        donation_id: &EntityId,
    ) -> impl Future<Output = Result<Option<Earmark>, MarathonError>> + Send;

    /// Records or replaces the earmark of a donation.
    fn set_earmark(
        &mut self,
        donation_id: &EntityId,
        earmark: &Earmark,
    ) -> impl Future<Output = Result<(), MarathonError>> + Send;

    /// Removes the earmark of a donation; a no-op when there is none.
    fn clear_earmark(
        &mut self,
        donation_id: &EntityId,
    ) -> impl Future<Output = Result<(), MarathonError>> + Send;

    /// Adds `delta` to a bid total, flooring at zero.
    fn adjust_bid_total(
        &mut self,
        bid_id: &EntityId,
        delta: f64,
    ) -> impl Future<Output = Result<Adjusted, MarathonError>> + Send;

    /// Adds `delta` to an option total, flooring at zero.
    fn adjust_option_total(
        &mut self,
        option_id: &EntityId,
        delta: f64,
    ) -> impl Future<Output = Result<Adjusted, MarathonError>> + Send;

    /// Overwrites a bid total.
    fn set_bid_total(
        &mut self,
        bid_id: &EntityId,
        total: f64,
    ) -> impl Future<Output = Result<Adjusted, MarathonError>> + Send;

    /// Overwrites an option total.
    fn set_option_total(
        &mut self,
        option_id: &EntityId,
        total: f64,
    ) -> impl Future<Output = Result<Adjusted, MarathonError>> + Send;

    /// Lists every donation earmarked to a bid.
    fn earmarked_amounts(
        &mut self,
        bid_id: &EntityId,
    ) -> impl Future<Output = Result<Vec<EarmarkedAmount>, MarathonError>> + Send;

    /// Makes every write of this unit of work visible.
    fn commit(self) -> impl Future<Output = Result<(), MarathonError>> + Send;

    /// Discards every write of this unit of work.
    fn rollback(self) -> impl Future<Output = Result<(), MarathonError>> + Send;
}
