//! DTOs for donation endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Donation, Earmark, EarmarkRequest, EntityId};
use crate::error::MarathonError;
use crate::ledger::{LedgerReceipt, TotalChange};

/// Request body for `POST /donations` and `PUT /donations/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DonationRequest {
    /// Donation id; generated when omitted on create, ignored on update.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Donor display name.
    pub name: String,
    /// Donor email.
    #[serde(default)]
    pub email: String,
    /// Time of donation, epoch milliseconds; defaults to now.
    #[serde(default)]
    pub time_mili: Option<i64>,
    /// Donated amount, positive.
    pub amount: f64,
    /// Donor message.
    #[serde(default)]
    pub description: String,
    /// Whether the donation is earmarked to a bid.
    #[serde(default)]
    pub to_bid: bool,
    /// Owning event.
    pub event_id: EntityId,
    /// Requested earmark: bid, plus option id or new option name.
    #[serde(default)]
    pub bid_details: Option<EarmarkRequest>,
}

impl DonationRequest {
    /// Checks the shape of the request.
    ///
    /// # Errors
    ///
    /// Returns [`MarathonError::InvalidRequest`] when the amount is not a
    /// positive finite number, or the donor name or event id is blank.
    pub fn validate(&self) -> Result<(), MarathonError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(MarathonError::InvalidRequest(
                "amount must be a positive number".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(MarathonError::InvalidRequest("name must not be empty".to_string()));
        }
        if self.event_id.as_str().trim().is_empty() {
            return Err(MarathonError::InvalidRequest(
                "event_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Splits the request into the donation to write and its earmark.
    #[must_use]
    pub fn into_parts(self, id: EntityId) -> (Donation, Option<EarmarkRequest>) {
        let donation = Donation {
            id,
            name: self.name,
            email: self.email,
            time_mili: self
                .time_mili
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
            amount: self.amount,
            description: self.description,
            to_bid: self.to_bid,
            event_id: self.event_id,
        };
        (donation, self.bid_details)
    }
}

/// A running total moved by a donation write.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TotalChangeDto {
    /// Bid whose total (or option total) moved.
    pub bid_id: EntityId,
    /// Option, for option totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<EntityId>,
    /// Total before.
    pub previous: f64,
    /// Total after.
    pub current: f64,
}

impl From<TotalChange> for TotalChangeDto {
    fn from(change: TotalChange) -> Self {
        match change {
            TotalChange::Bid { bid_id, adjusted } => Self {
                bid_id,
                option_id: None,
                previous: adjusted.previous,
                current: adjusted.current,
            },
            TotalChange::Option {
                bid_id,
                option_id,
                adjusted,
            } => Self {
                bid_id,
                option_id: Some(option_id),
                previous: adjusted.previous,
                current: adjusted.current,
            },
        }
    }
}

/// Response for donation writes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonationWriteResponse {
    /// The donation as written, or as it was before deletion.
    pub donation: Donation,
    /// Resolved earmark, if any.
    pub earmark: Option<Earmark>,
    /// Totals moved by the write.
    pub changes: Vec<TotalChangeDto>,
}

impl From<LedgerReceipt> for DonationWriteResponse {
    fn from(receipt: LedgerReceipt) -> Self {
        Self {
            donation: receipt.donation,
            earmark: receipt.earmark,
            changes: receipt.changes.into_iter().map(TotalChangeDto::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request(json: &str) -> DonationRequest {
        let Ok(request) = serde_json::from_str(json) else {
            panic!("request did not parse");
        };
        request
    }

    #[test]
    fn minimal_request_parses_with_defaults() {
        let req = request(r#"{"name":"ann","amount":5,"event_id":"E1"}"#);
        assert!(req.validate().is_ok());
        assert!(!req.to_bid);
        assert!(req.bid_details.is_none());
        let (donation, earmark) = req.into_parts("D1".into());
        assert_eq!(donation.id.as_str(), "D1");
        assert!(donation.time_mili > 0);
        assert!(earmark.is_none());
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let req = request(r#"{"name":"ann","amount":0,"event_id":"E1"}"#);
        assert!(matches!(req.validate(), Err(MarathonError::InvalidRequest(_))));
        let req = request(r#"{"name":"ann","amount":-3.5,"event_id":"E1"}"#);
        assert!(matches!(req.validate(), Err(MarathonError::InvalidRequest(_))));
    }

    #[test]
    fn blank_name_is_rejected() {
        let req = request(r#"{"name":"  ","amount":1,"event_id":"E1"}"#);
        assert!(matches!(req.validate(), Err(MarathonError::InvalidRequest(_))));
    }

    #[test]
    fn earmark_with_new_option_parses() {
        let req = request(
            r#"{"name":"ann","amount":1,"event_id":"E1","to_bid":true,
                "bid_details":{"bid_id":"B1","option_name":"any%"}}"#,
        );
        let (_, earmark) = req.into_parts("D1".into());
        assert_eq!(earmark, Some(EarmarkRequest::new_option("B1".into(), "any%")));
    }

    #[test]
    fn option_change_keeps_option_id() {
        let dto = TotalChangeDto::from(TotalChange::Option {
            bid_id: "B1".into(),
            option_id: "O1".into(),
            adjusted: crate::ledger::Adjusted {
                previous: 1.0,
                current: 3.0,
            },
        });
        assert_eq!(dto.option_id.as_ref().map(EntityId::as_str), Some("O1"));
    }
}
