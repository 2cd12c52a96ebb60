//! Per-connection subscription manager.
//!
//! Tracks which bid IDs a WebSocket client follows and filters ledger
//! events server-side.

use std::collections::HashSet;

use crate::domain::{EntityId, LedgerEvent};

/// Wildcard bid id.
pub const WILDCARD: &str = "*";

/// Manages the set of bid subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed bid IDs. Ignored while `subscribe_all` is set.
    bid_ids: HashSet<EntityId>,
    /// Whether the client follows every bid (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bid IDs to the subscription set; `"*"` enables the wildcard.
    ///
    /// Returns the explicit ids that were added.
    pub fn subscribe(&mut self, ids: &[String]) -> Vec<EntityId> {
        let mut added = Vec::new();
        for id in ids {
            if id == WILDCARD {
                self.subscribe_all = true;
            } else {
                let id = EntityId::from(id.as_str());
                if self.bid_ids.insert(id.clone()) {
                    added.push(id);
                }
            }
        }
        added
    }

    /// Removes bid IDs from the subscription set; `"*"` clears the wildcard.
    pub fn unsubscribe(&mut self, ids: &[String]) {
        for id in ids {
            if id == WILDCARD {
                self.subscribe_all = false;
            } else {
                self.bid_ids.remove(&EntityId::from(id.as_str()));
            }
        }
    }

    /// Returns `true` if the event should be forwarded to this client.
    ///
    /// Events without a bid only reach wildcard subscribers.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.subscribe_all || event.bid_id().is_some_and(|id| self.bid_ids.contains(id))
    }

    /// Returns the number of explicitly subscribed bid IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bid_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn total_changed(bid: &str) -> LedgerEvent {
        LedgerEvent::BidTotalChanged {
            bid_id: bid.into(),
            previous: 0.0,
            current: 5.0,
            timestamp: Utc::now(),
        }
    }

    fn plain_donation() -> LedgerEvent {
        LedgerEvent::DonationRecorded {
            donation_id: "D1".into(),
            event_id: "E1".into(),
            amount: 5.0,
            bid_id: None,
            option_id: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(&total_changed("B1")));
    }

    #[test]
    fn subscribe_specific_bid() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&["B1".to_string()]);
        assert!(mgr.matches(&total_changed("B1")));
        assert!(!mgr.matches(&total_changed("B2")));
        assert!(!mgr.matches(&plain_donation()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[WILDCARD.to_string()]);
        assert!(mgr.matches(&total_changed("B7")));
        assert!(mgr.matches(&plain_donation()));
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn unsubscribe_removes_bid_and_wildcard() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&["B1".to_string(), WILDCARD.to_string()]);
        mgr.unsubscribe(&["B1".to_string(), WILDCARD.to_string()]);
        assert!(!mgr.matches(&total_changed("B1")));
        assert!(!mgr.is_subscribed_all());
    }

    #[test]
    fn duplicate_subscribe_is_counted_once() {
        let mut mgr = SubscriptionManager::new();
        let added = mgr.subscribe(&["B1".to_string(), "B1".to_string()]);
        assert_eq!(added.len(), 1);
        assert_eq!(mgr.count(), 1);
    }
}
