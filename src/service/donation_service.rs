//! Donation service: ledger writes, donation reads and event emission.

use crate::domain::{DonationWithEarmark, Donation, EarmarkRequest, EntityId, EventBus, LedgerEvent};
use crate::error::MarathonError;
use crate::ledger::{AuditReport, Ledger, LedgerReceipt, LedgerStore, Reconciliation};
use crate::persistence::{RowScope, RowSource};

/// Coordinates donation writes through the [`Ledger`] and broadcasts the
/// committed changes on the [`EventBus`].
///
/// Events are published only after the unit of work commits, so
/// subscribers never see totals that were rolled back.
#[derive(Debug, Clone)]
pub struct DonationService<S> {
    ledger: Ledger<S>,
    source: S,
    event_bus: EventBus,
}

impl<S: Clone> DonationService<S> {
    /// Creates a new `DonationService` over `store`.
    #[must_use]
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self {
            ledger: Ledger::new(store.clone()),
            source: store,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

impl<S: LedgerStore> DonationService<S> {
    /// Records a donation and credits its earmark.
    ///
    /// # Errors
    ///
    /// See [`Ledger::allocate`].
    pub async fn create(
        &self,
        donation: Donation,
        earmark: Option<EarmarkRequest>,
    ) -> Result<LedgerReceipt, MarathonError> {
        let receipt = self.ledger.allocate(donation, earmark).await?;
        self.publish(&receipt);
        Ok(receipt)
    }

    /// Replaces a donation and moves its credit.
    ///
    /// # Errors
    ///
    /// See [`Ledger::reallocate`].
    pub async fn update(
        &self,
        donation: Donation,
        earmark: Option<EarmarkRequest>,
    ) -> Result<LedgerReceipt, MarathonError> {
        let receipt = self.ledger.reallocate(donation, earmark).await?;
        self.publish(&receipt);
        Ok(receipt)
    }

    /// Deletes a donation and debits its earmark.
    ///
    /// # Errors
    ///
    /// See [`Ledger::deallocate`].
    pub async fn delete(&self, donation_id: &EntityId) -> Result<LedgerReceipt, MarathonError> {
        let receipt = self.ledger.deallocate(donation_id).await?;
        self.publish(&receipt);
        Ok(receipt)
    }

    /// Checks a bid's totals against its earmarked donations.
    ///
    /// # Errors
    ///
    /// See [`Ledger::audit`].
    pub async fn audit_bid(&self, bid_id: &EntityId) -> Result<AuditReport, MarathonError> {
        self.ledger.audit(bid_id).await
    }

    /// Rewrites a bid's totals from its earmarked donations.
    ///
    /// # Errors
    ///
    /// See [`Ledger::reconcile`].
    pub async fn reconcile_bid(&self, bid_id: &EntityId) -> Result<Reconciliation, MarathonError> {
        let reconciliation = self.ledger.reconcile(bid_id).await?;
        let timestamp = chrono::Utc::now();
        self.event_bus.publish_all(
            reconciliation
                .changes
                .iter()
                .cloned()
                .map(|change| change.into_event(timestamp)),
        );
        Ok(reconciliation)
    }

    fn publish(&self, receipt: &LedgerReceipt) {
        let events: Vec<LedgerEvent> = receipt.clone().into_events();
        tracing::debug!(count = events.len(), "publishing ledger events");
        self.event_bus.publish_all(events);
    }
}

impl<S: RowSource> DonationService<S> {
    /// Returns a donation with its earmark details.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::NotFound`] when the donation does not exist.
    pub async fn get(&self, donation_id: &EntityId) -> Result<DonationWithEarmark, MarathonError> {
        self.source
            .donation_rows(RowScope::Id(donation_id.clone()))
            .await?
            .into_iter()
            .next()
            .map(DonationWithEarmark::from)
            .ok_or_else(|| MarathonError::not_found("donation", donation_id))
    }

    /// Lists every donation in time order, with earmark details.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_all(&self) -> Result<Vec<DonationWithEarmark>, MarathonError> {
        let rows = self.source.donation_rows(RowScope::All).await?;
        Ok(rows.into_iter().map(DonationWithEarmark::from).collect())
    }

    /// Lists the donations of an event in time order.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn list_by_event(
        &self,
        event_id: &EntityId,
    ) -> Result<Vec<DonationWithEarmark>, MarathonError> {
        let rows = self
            .source
            .donation_rows(RowScope::Event(event_id.clone()))
            .await?;
        Ok(rows.into_iter().map(DonationWithEarmark::from).collect())
    }

    /// Sum of every donation of an event.
    ///
    /// # Errors
    ///
    /// Returns a [`MarathonError::Database`] on store failure.
    pub async fn total_by_event(&self, event_id: &EntityId) -> Result<f64, MarathonError> {
        self.source.total_donated(event_id).await
    }
}
