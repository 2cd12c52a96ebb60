//! Donations and the earmarks that tie them to bids.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BidType, EntityId};

/// A single donation to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Donation {
    /// Donation identifier.
    pub id: EntityId,
    /// Donor display name.
    pub name: String,
    /// Donor email.
    pub email: String,
    /// Time of donation, epoch milliseconds.
    pub time_mili: i64,
    /// Donated amount.
    pub amount: f64,
    /// Donor message.
    pub description: String,
    /// Whether the donation is earmarked to a bid.
    pub to_bid: bool,
    /// Owning event.
    pub event_id: EntityId,
}

/// The resolved `(bid, option)` pair a donation is allocated to.
///
/// `option_id` is set only for bidwar bids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Earmark {
    /// Target bid.
    pub bid_id: EntityId,
    /// Target option (bidwar only).
    pub option_id: Option<EntityId>,
}

impl Earmark {
    /// Earmark to a bid without an option.
    #[must_use]
    pub const fn bid(bid_id: EntityId) -> Self {
        Self {
            bid_id,
            option_id: None,
        }
    }

    /// Earmark to a specific option of a bidwar.
    #[must_use]
    pub const fn option(bid_id: EntityId, option_id: EntityId) -> Self {
        Self {
            bid_id,
            option_id: Some(option_id),
        }
    }
}

/// An earmark as requested by a donor, before the ledger resolves it.
///
/// `option_name` lets a donor propose a new option on bidwars that allow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EarmarkRequest {
    /// Target bid.
    pub bid_id: EntityId,
    /// Existing option, or the id to give a newly created one.
    #[serde(default)]
    pub option_id: Option<EntityId>,
    /// Name of the option to create when it does not exist yet.
    #[serde(default)]
    pub option_name: Option<String>,
}

impl EarmarkRequest {
    /// Request targeting a bid directly.
    #[must_use]
    pub const fn bid(bid_id: EntityId) -> Self {
        Self {
            bid_id,
            option_id: None,
            option_name: None,
        }
    }

    /// Request targeting an existing option.
    #[must_use]
    pub const fn option(bid_id: EntityId, option_id: EntityId) -> Self {
        Self {
            bid_id,
            option_id: Some(option_id),
            option_name: None,
        }
    }

    /// Request proposing a new option by name.
    #[must_use]
    pub fn new_option(bid_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            bid_id,
            option_id: None,
            option_name: Some(name.into()),
        }
    }
}

/// Bid and option details joined onto a donation for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EarmarkDetails {
    /// Target bid.
    pub bid_id: EntityId,
    /// Bid display name.
    pub bidname: String,
    /// Bid variant.
    #[serde(rename = "type")]
    pub bid_type: BidType,
    /// Bid running total.
    pub bid_current_amount: f64,
    /// Run the bid belongs to.
    pub run_id: EntityId,
    /// Target option, if any.
    pub option_id: Option<EntityId>,
    /// Option name, if any.
    pub option_name: Option<String>,
    /// Option running total, if any.
    pub option_current_amount: Option<f64>,
}

/// A donation together with its earmark, if it has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DonationWithEarmark {
    /// The donation.
    #[serde(flatten)]
    pub donation: Donation,
    /// Earmark details; `None` when the donation is not earmarked.
    pub bid_details: Option<EarmarkDetails>,
}
