//! `OpenAPI` document for the REST API.

use utoipa::OpenApi;

/// `OpenAPI` documentation for `/health` and `/api/v1/*`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Marathon Backend API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Schedules, runs, donations and incentive bids for speedrun marathons"
    ),
    paths(
        crate::api::handlers::system::health_handler,
        crate::api::handlers::runs::list_runs,
        crate::api::handlers::runs::get_run,
        crate::api::handlers::schedules::list_schedules,
        crate::api::handlers::schedules::get_schedule,
        crate::api::handlers::bids::list_bids,
        crate::api::handlers::bids::get_bid,
        crate::api::handlers::bids::audit_bid,
        crate::api::handlers::bids::reconcile_bid,
        crate::api::handlers::events::event_summary,
        crate::api::handlers::events::list_event_donations,
        crate::api::handlers::events::event_total,
        crate::api::handlers::prizes::list_prizes,
        crate::api::handlers::prizes::get_prize,
        crate::api::handlers::donations::list_donations,
        crate::api::handlers::donations::create_donation,
        crate::api::handlers::donations::get_donation,
        crate::api::handlers::donations::update_donation,
        crate::api::handlers::donations::delete_donation,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::ErrorBody,
            crate::api::handlers::system::HealthResponse,
            crate::domain::Run,
            crate::domain::RunMetadata,
            crate::domain::Team,
            crate::domain::Player,
            crate::domain::User,
            crate::domain::UserSocials,
            crate::domain::Bid,
            crate::domain::BidOption,
            crate::domain::BidType,
            crate::domain::Schedule,
            crate::domain::Event,
            crate::domain::Prize,
            crate::domain::EventSummary,
            crate::domain::Donation,
            crate::domain::DonationWithEarmark,
            crate::domain::EarmarkDetails,
            crate::domain::Earmark,
            crate::domain::EarmarkRequest,
            crate::domain::EntityId,
            crate::ledger::AuditReport,
            crate::ledger::OptionAudit,
            crate::api::dto::DonationRequest,
            crate::api::dto::DonationWriteResponse,
            crate::api::dto::TotalChangeDto,
            crate::api::dto::EventTotalResponse,
            crate::api::dto::ReconcileResponse,
        )
    ),
    tags(
        (name = "System", description = "Service health"),
        (name = "Runs", description = "Runs with teams, players and bids"),
        (name = "Schedules", description = "Schedules with their runs"),
        (name = "Bids", description = "Incentive bids, audits and reconciliation"),
        (name = "Events", description = "Event summaries and donation listings"),
        (name = "Prizes", description = "Prizes raffled among donors"),
        (name = "Donations", description = "Donation listings and writes through the ledger"),
    )
)]
pub struct ApiDoc;

/// Returns the generated `OpenAPI` document.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_donation_paths() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/donations"));
        assert!(doc.paths.paths.contains_key("/api/v1/donations/{id}"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[test]
    fn document_lists_read_only_listings() {
        let doc = openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/prizes"));
        assert!(doc.paths.paths.contains_key("/api/v1/prizes/{id}"));
        let Some(donations) = doc.paths.paths.get("/api/v1/donations") else {
            panic!("donations path missing");
        };
        assert!(donations.get.is_some());
        assert!(donations.post.is_some());
    }

    #[test]
    fn api_doc_is_debug() {
        assert_eq!(format!("{ApiDoc:?}"), "ApiDoc");
    }
}
