//! Recompute-from-donations checks over the running totals.

use serde::Serialize;
use utoipa::ToSchema;

use super::store::{EarmarkedAmount, LedgerStore, LedgerTx, OptionRecord};
use super::{Ledger, TotalChange, finish};
use crate::domain::{BidType, EntityId};
use crate::error::MarathonError;

/// Totals closer than this are considered equal.
const TOLERANCE: f64 = 1e-6;

/// Recorded versus recomputed total of one bidwar option.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OptionAudit {
    /// Option identifier.
    pub option_id: EntityId,
    /// Option name.
    pub name: String,
    /// Stored running total.
    pub recorded: f64,
    /// Sum of donations earmarked to the option.
    pub expected: f64,
}

/// Recorded versus recomputed totals of one bid.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuditReport {
    /// Bid identifier.
    pub bid_id: EntityId,
    /// Bid variant.
    pub bid_type: BidType,
    /// Stored bid total.
    pub recorded_total: f64,
    /// Sum of donations earmarked to the bid.
    pub expected_total: f64,
    /// Sum of stored option totals (bidwar only).
    pub options_total: f64,
    /// Number of earmarked donations.
    pub donations: usize,
    /// Per-option comparison (bidwar only).
    pub options: Vec<OptionAudit>,
}

impl AuditReport {
    fn build(
        bid_id: EntityId,
        bid_type: BidType,
        recorded_total: f64,
        options: &[OptionRecord],
        amounts: &[EarmarkedAmount],
    ) -> Self {
        let options = options
            .iter()
            .map(|option| OptionAudit {
                option_id: option.id.clone(),
                name: option.name.clone(),
                recorded: option.current_amount,
                expected: amounts
                    .iter()
                    .filter(|a| a.option_id.as_ref() == Some(&option.id))
                    .map(|a| a.amount)
                    .sum(),
            })
            .collect::<Vec<_>>();
        Self {
            bid_id,
            bid_type,
            recorded_total,
            expected_total: amounts.iter().map(|a| a.amount).sum(),
            options_total: options.iter().map(|o| o.recorded).sum(),
            donations: amounts.len(),
            options,
        }
    }

    /// Describes every disagreement, empty when the bid is consistent.
    #[must_use]
    pub fn discrepancies(&self) -> Vec<String> {
        let mut found = Vec::new();
        if !close(self.recorded_total, self.expected_total) {
            found.push(format!(
                "bid total {} differs from earmarked donations {}",
                self.recorded_total, self.expected_total
            ));
        }
        if self.bid_type.tracks_options() {
            if !close(self.recorded_total, self.options_total) {
                found.push(format!(
                    "bid total {} differs from option totals {}",
                    self.recorded_total, self.options_total
                ));
            }
            for option in &self.options {
                if !close(option.recorded, option.expected) {
                    found.push(format!(
                        "option {} total {} differs from earmarked donations {}",
                        option.option_id, option.recorded, option.expected
                    ));
                }
            }
        }
        found
    }

    /// Returns `true` when every total matches its donations.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.discrepancies().is_empty()
    }
}

/// Totals rewritten by [`Ledger::reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The bid as audited before the rewrite.
    pub before: AuditReport,
    /// Totals that actually moved.
    pub changes: Vec<TotalChange>,
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}

impl<S: LedgerStore> Ledger<S> {
    /// Recomputes a bid's totals from its earmarked donations.
    ///
    /// # Errors
    ///
    /// - [`MarathonError::NotFound`] when the bid is absent.
    /// - [`MarathonError::Inconsistent`] listing every drifted total.
    /// - [`MarathonError::Database`] on store failure.
    #[tracing::instrument(skip_all, fields(bid_id = %bid_id))]
    pub async fn audit(&self, bid_id: &EntityId) -> Result<AuditReport, MarathonError> {
        let mut tx = self.store.begin().await?;
        let result = read_report(&mut tx, bid_id).await;
        if let Err(err) = tx.rollback().await {
            tracing::warn!(error = %err, "read-only audit rollback failed");
        }
        let report = result?;
        let discrepancies = report.discrepancies();
        if discrepancies.is_empty() {
            Ok(report)
        } else {
            tracing::warn!(bid_id = %bid_id, count = discrepancies.len(), "ledger drift detected");
            Err(MarathonError::Inconsistent(discrepancies.join("; ")))
        }
    }

    /// Overwrites a bid's option and bid totals with the sums of their
    /// earmarked donations, in one unit of work.
    ///
    /// # Errors
    ///
    /// - [`MarathonError::NotFound`] when the bid is absent.
    /// - [`MarathonError::Database`] on store failure.
    #[tracing::instrument(skip_all, fields(bid_id = %bid_id))]
    pub async fn reconcile(&self, bid_id: &EntityId) -> Result<Reconciliation, MarathonError> {
        let mut tx = self.store.begin().await?;
        let result = reconcile_in(&mut tx, bid_id).await;
        finish(tx, result).await
    }
}

async fn read_report<X: LedgerTx>(tx: &mut X, bid_id: &EntityId) -> Result<AuditReport, MarathonError> {
    let bid = tx.find_bid(bid_id).await?;
    let options = if bid.bid_type.tracks_options() {
        tx.options_of_bid(bid_id).await?
    } else {
        Vec::new()
    };
    let amounts = tx.earmarked_amounts(bid_id).await?;
    Ok(AuditReport::build(
        bid.id,
        bid.bid_type,
        bid.current_amount,
        &options,
        &amounts,
    ))
}

async fn reconcile_in<X: LedgerTx>(
    tx: &mut X,
    bid_id: &EntityId,
) -> Result<Reconciliation, MarathonError> {
    let before = read_report(tx, bid_id).await?;
    let mut changes = Vec::new();
    for option in &before.options {
        if close(option.recorded, option.expected) {
            continue;
        }
        let adjusted = tx.set_option_total(&option.option_id, option.expected).await?;
        if adjusted.changed() {
            changes.push(TotalChange::Option {
                bid_id: bid_id.clone(),
                option_id: option.option_id.clone(),
                adjusted,
            });
        }
    }
    if !close(before.recorded_total, before.expected_total) {
        let adjusted = tx.set_bid_total(bid_id, before.expected_total).await?;
        if adjusted.changed() {
            changes.push(TotalChange::Bid {
                bid_id: bid_id.clone(),
                adjusted,
            });
        }
    }
    tracing::info!(bid_id = %bid_id, changed = changes.len(), "bid reconciled");
    Ok(Reconciliation { before, changes })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn option(id: &str, recorded: f64) -> OptionRecord {
        OptionRecord {
            id: EntityId::from(id),
            bid_id: EntityId::from("B1"),
            name: id.to_lowercase(),
            current_amount: recorded,
        }
    }

    fn amount(donation: &str, option: Option<&str>, amount: f64) -> EarmarkedAmount {
        EarmarkedAmount {
            donation_id: EntityId::from(donation),
            option_id: option.map(EntityId::from),
            amount,
        }
    }

    #[test]
    fn matching_bidwar_is_consistent() {
        let report = AuditReport::build(
            EntityId::from("B1"),
            BidType::Bidwar,
            30.0,
            &[option("O1", 10.0), option("O2", 20.0)],
            &[amount("D1", Some("O1"), 10.0), amount("D2", Some("O2"), 20.0)],
        );
        assert!(report.is_consistent());
        assert_eq!(report.donations, 2);
    }

    #[test]
    fn option_drift_is_reported() {
        let report = AuditReport::build(
            EntityId::from("B1"),
            BidType::Bidwar,
            30.0,
            &[option("O1", 12.0), option("O2", 18.0)],
            &[amount("D1", Some("O1"), 10.0), amount("D2", Some("O2"), 20.0)],
        );
        assert_eq!(report.discrepancies().len(), 2);
    }

    #[tokio::test]
    async fn reconcile_of_consistent_bid_changes_nothing() {
        let store = MemoryStore::new();
        store.seed_bid("B1", BidType::Bidwar, false).await;
        store.seed_option("B1", "O1", "left").await;
        let ledger = Ledger::new(store);
        let Ok(reconciliation) = ledger.reconcile(&EntityId::from("B1")).await else {
            panic!("reconcile failed");
        };
        assert!(reconciliation.before.is_consistent());
        assert!(reconciliation.changes.is_empty());
    }

    #[test]
    fn goal_bid_ignores_option_sum() {
        let report = AuditReport::build(
            EntityId::from("G1"),
            BidType::Goal,
            5.0,
            &[],
            &[amount("D1", None, 5.0)],
        );
        assert!(report.is_consistent());
    }
}
