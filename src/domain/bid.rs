//! Incentive bids and their options.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntityId;

/// Bid variant.
///
/// Stored as the Postgres enum `bid_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "bid_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BidType {
    /// Donors allocate money to competing options.
    Bidwar,
    /// Plain cumulative total.
    Total,
    /// Threshold goal.
    Goal,
}

impl BidType {
    /// Returns `true` when the bid keeps per-option totals.
    #[must_use]
    pub const fn tracks_options(self) -> bool {
        matches!(self, Self::Bidwar)
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bidwar => "bidwar",
            Self::Total => "total",
            Self::Goal => "goal",
        }
    }
}

impl fmt::Display for BidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A donation-driven incentive attached to a run.
///
/// For [`BidType::Bidwar`] `current_amount` equals the sum of the options'
/// totals. For the other variants it is the direct sum of the earmarked
/// donations and `options` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bid {
    /// Bid identifier.
    pub id: EntityId,
    /// Display name.
    pub bidname: String,
    /// Target amount for goal/total bids.
    pub goal: f64,
    /// Running total.
    pub current_amount: f64,
    /// Description shown to donors.
    pub description: String,
    /// Variant.
    #[serde(rename = "type")]
    pub bid_type: BidType,
    /// Whether donors may add options of their own.
    pub create_new_options: bool,
    /// Bid status (e.g. `"open"`, `"closed"`).
    pub status: String,
    /// Owning run.
    pub run_id: EntityId,
    /// Options in first-seen order (bidwar only).
    pub options: Vec<BidOption>,
}

/// One competing option of a bidwar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BidOption {
    /// Option identifier.
    pub id: EntityId,
    /// Option name, unique within its bid.
    pub name: String,
    /// Sum of donations earmarked to this option.
    pub current_amount: f64,
    /// Owning bid.
    pub bid_id: EntityId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bidwars_track_options() {
        assert!(BidType::Bidwar.tracks_options());
        assert!(!BidType::Total.tracks_options());
        assert!(!BidType::Goal.tracks_options());
    }

    #[test]
    fn wire_names_match_serde() {
        for bid_type in [BidType::Bidwar, BidType::Total, BidType::Goal] {
            let json = serde_json::to_string(&bid_type).unwrap_or_default();
            assert_eq!(json, format!("\"{bid_type}\""));
        }
    }
}
