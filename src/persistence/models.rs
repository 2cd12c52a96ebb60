//! Database row models and their conversion into domain types.

use crate::domain::{
    BidType, Donation, DonationWithEarmark, Earmark, EarmarkDetails, Event, EventSummary, Prize,
};
use crate::ledger::{BidRecord, EarmarkedAmount, OptionRecord};

/// A donation joined with its earmarked bid and option.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct DonationRow {
    /// Donation id.
    pub donation_id: String,
    /// Donor display name.
    pub donor_name: String,
    /// Donor email.
    pub email: String,
    /// Time of donation, epoch milliseconds.
    pub time_mili: i64,
    /// Donated amount.
    pub amount: f64,
    /// Donor message.
    pub description: String,
    /// Whether the donation is earmarked.
    pub to_bid: bool,
    /// Owning event.
    pub event_id: String,
    /// Earmarked bid.
    pub bid_id: Option<String>,
    /// Bid name.
    pub bidname: Option<String>,
    /// Bid variant.
    pub bid_type: Option<BidType>,
    /// Bid running total.
    pub bid_current_amount: Option<f64>,
    /// Run of the bid.
    pub run_id: Option<String>,
    /// Earmarked option.
    pub option_id: Option<String>,
    /// Option name.
    pub option_name: Option<String>,
    /// Option running total.
    pub option_current_amount: Option<f64>,
}

impl From<DonationRow> for DonationWithEarmark {
    fn from(row: DonationRow) -> Self {
        let bid_details = match (row.bid_id, row.bid_type) {
            (Some(bid_id), Some(bid_type)) => Some(EarmarkDetails {
                bid_id: bid_id.into(),
                bidname: row.bidname.unwrap_or_default(),
                bid_type,
                bid_current_amount: row.bid_current_amount.unwrap_or_default(),
                run_id: row.run_id.unwrap_or_default().into(),
                option_id: row.option_id.map(Into::into),
                option_name: row.option_name,
                option_current_amount: row.option_current_amount,
            }),
            _ => None,
        };
        Self {
            donation: Donation {
                id: row.donation_id.into(),
                name: row.donor_name,
                email: row.email,
                time_mili: row.time_mili,
                amount: row.amount,
                description: row.description,
                to_bid: row.to_bid,
                event_id: row.event_id.into(),
            },
            bid_details,
        }
    }
}

/// A row of the `donations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonationRecordRow {
    /// Donation id.
    pub id: String,
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
    /// Whether the donation is earmarked.
    pub to_bid: bool,
    /// Owning event.
    pub event_id: String,
}

impl From<DonationRecordRow> for Donation {
    fn from(row: DonationRecordRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            email: row.email,
            time_mili: row.time_mili,
            amount: row.amount,
            description: row.description,
            to_bid: row.to_bid,
            event_id: row.event_id.into(),
        }
    }
}

/// The ledger-relevant columns of a `bids` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BidRecordRow {
    /// Bid id.
    pub id: String,
    /// Variant.
    pub bid_type: BidType,
    /// Whether donors may add options.
    pub create_new_options: bool,
    /// Running total.
    pub current_amount: f64,
}

impl From<BidRecordRow> for BidRecord {
    fn from(row: BidRecordRow) -> Self {
        Self {
            id: row.id.into(),
            bid_type: row.bid_type,
            create_new_options: row.create_new_options,
            current_amount: row.current_amount,
        }
    }
}

/// A row of the `bid_options` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OptionRecordRow {
    /// Option id.
    pub id: String,
    /// Owning bid.
    pub bid_id: String,
    /// Option name.
    pub name: String,
    /// Running total.
    pub current_amount: f64,
}

impl From<OptionRecordRow> for OptionRecord {
    fn from(row: OptionRecordRow) -> Self {
        Self {
            id: row.id.into(),
            bid_id: row.bid_id.into(),
            name: row.name,
            current_amount: row.current_amount,
        }
    }
}

/// A row of the `donation_bids` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EarmarkRow {
    /// Earmarked bid.
    pub bid_id: String,
    /// Earmarked option.
    pub bid_option_id: Option<String>,
}

impl From<EarmarkRow> for Earmark {
    fn from(row: EarmarkRow) -> Self {
        Self {
            bid_id: row.bid_id.into(),
            option_id: row.bid_option_id.map(Into::into),
        }
    }
}

/// An earmarked donation amount.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EarmarkedAmountRow {
    /// Donation id.
    pub donation_id: String,
    /// Earmarked option.
    pub option_id: Option<String>,
    /// Donated amount.
    pub amount: f64,
}

impl From<EarmarkedAmountRow> for EarmarkedAmount {
    fn from(row: EarmarkedAmountRow) -> Self {
        Self {
            donation_id: row.donation_id.into(),
            option_id: row.option_id.map(Into::into),
            amount: row.amount,
        }
    }
}

/// An event with its dashboard counts.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventSummaryRow {
    /// Event id.
    pub id: String,
    /// Event name.
    pub name: String,
    /// Start, epoch milliseconds.
    pub start_time_mili: i64,
    /// End, epoch milliseconds.
    pub end_time_mili: i64,
    /// Number of schedules.
    pub schedules_count: i64,
    /// Number of runs.
    pub runs_count: i64,
    /// Number of prizes.
    pub prizes_count: i64,
    /// Number of bids.
    pub bids_count: i64,
    /// Number of donations.
    pub donations_count: i64,
    /// Number of distinct players.
    pub users_count: i64,
}

impl From<EventSummaryRow> for EventSummary {
    fn from(row: EventSummaryRow) -> Self {
        Self {
            event: Event {
                id: row.id.into(),
                name: row.name,
                start_time_mili: row.start_time_mili,
                end_time_mili: row.end_time_mili,
            },
            schedules_count: row.schedules_count,
            runs_count: row.runs_count,
            prizes_count: row.prizes_count,
            bids_count: row.bids_count,
            donations_count: row.donations_count,
            users_count: row.users_count,
        }
    }
}

/// A prize row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrizeRow {
    /// Prize id.
    pub id: String,
    /// Prize name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Link.
    pub url: String,
    /// Minimum qualifying donation.
    pub min_amount: f64,
    /// Status.
    pub status: String,
    /// Ships internationally.
    pub international_delivery: bool,
    /// Owning event.
    pub event_id: String,
}

impl From<PrizeRow> for Prize {
    fn from(row: PrizeRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            url: row.url,
            min_amount: row.min_amount,
            status: row.status,
            international_delivery: row.international_delivery,
            event_id: row.event_id.into(),
        }
    }
}
