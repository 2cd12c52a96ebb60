//! Domain events reflecting ledger mutations.
//!
//! Every committed donation write emits one or more [`LedgerEvent`]s through
//! the [`super::EventBus`]. Events are broadcast to WebSocket subscribers so
//! on-stream overlays can refresh bid totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Domain event emitted after a committed ledger unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A donation was created or updated.
    DonationRecorded {
        /// Donation identifier.
        donation_id: EntityId,
        /// Event the donation belongs to.
        event_id: EntityId,
        /// Donated amount after the write.
        amount: f64,
        /// Bid the donation is earmarked to, if any.
        bid_id: Option<EntityId>,
        /// Option the donation is earmarked to, if any.
        option_id: Option<EntityId>,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A donation was deleted.
    DonationRemoved {
        /// Donation identifier.
        donation_id: EntityId,
        /// Event the donation belonged to.
        event_id: EntityId,
        /// Amount that was removed.
        amount: f64,
        /// Bid the donation was earmarked to, if any.
        bid_id: Option<EntityId>,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A bid's running total moved.
    BidTotalChanged {
        /// Bid identifier.
        bid_id: EntityId,
        /// Total before the change.
        previous: f64,
        /// Total after the change.
        current: f64,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A bidwar option's running total moved.
    OptionTotalChanged {
        /// Owning bid.
        bid_id: EntityId,
        /// Option identifier.
        option_id: EntityId,
        /// Total before the change.
        previous: f64,
        /// Total after the change.
        current: f64,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Returns the bid this event concerns, if any.
    ///
    /// Donations without an earmark have no bid.
    #[must_use]
    pub fn bid_id(&self) -> Option<&EntityId> {
        match self {
            Self::DonationRecorded { bid_id, .. } | Self::DonationRemoved { bid_id, .. } => {
                bid_id.as_ref()
            }
            Self::BidTotalChanged { bid_id, .. } | Self::OptionTotalChanged { bid_id, .. } => {
                Some(bid_id)
            }
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::DonationRecorded { .. } => "donation_recorded",
            Self::DonationRemoved { .. } => "donation_removed",
            Self::BidTotalChanged { .. } => "bid_total_changed",
            Self::OptionTotalChanged { .. } => "option_total_changed",
        }
    }
}
