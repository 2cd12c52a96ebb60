//! Row shape of the bid query: bid ⟶ option.

use crate::domain::{Bid, BidOption, BidType};

use super::{FlatRow, attach};

/// One row of `bids LEFT JOIN bid_options`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BidRow {
    /// Bid id.
    pub bid_id: String,
    /// Bid name.
    pub bidname: String,
    /// Goal.
    pub goal: f64,
    /// Running total.
    pub current_amount: f64,
    /// Description.
    pub description: String,
    /// Variant.
    pub bid_type: BidType,
    /// Whether donors may add options.
    pub create_new_options: bool,
    /// Status.
    pub status: String,
    /// Owning run.
    pub run_id: String,
    /// Option id; `None` when the bid has no options.
    pub option_id: Option<String>,
    /// Option name.
    pub option_name: Option<String>,
    /// Option running total.
    pub option_current_amount: Option<f64>,
}

impl FlatRow for BidRow {
    type Parent = Bid;

    fn parent_key(&self) -> &str {
        &self.bid_id
    }

    fn build_parent(&self) -> Bid {
        Bid {
            id: self.bid_id.as_str().into(),
            bidname: self.bidname.clone(),
            goal: self.goal,
            current_amount: self.current_amount,
            description: self.description.clone(),
            bid_type: self.bid_type,
            create_new_options: self.create_new_options,
            status: self.status.clone(),
            run_id: self.run_id.as_str().into(),
            options: Vec::new(),
        }
    }

    fn attach_children(&self, bid: &mut Bid) {
        attach(&mut bid.options, self.option_id.as_deref(), || BidOption {
            id: self.option_id.clone().unwrap_or_default().into(),
            name: self.option_name.clone().unwrap_or_default(),
            current_amount: self.option_current_amount.unwrap_or_default(),
            bid_id: self.bid_id.as_str().into(),
        });
    }
}
