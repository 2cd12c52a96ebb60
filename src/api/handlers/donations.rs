//! Donation handlers: every write goes through the ledger.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DonationRequest, DonationWriteResponse};
use crate::app_state::AppState;
use crate::domain::{DonationWithEarmark, EntityId};
use crate::error::{ErrorResponse, MarathonError};

/// `GET /donations`: List every donation with its earmark details.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/donations",
    tag = "Donations",
    summary = "List donations",
    description = "Returns every donation in time order, each with its bid and option details.",
    responses(
        (status = 200, description = "Donations with earmarks", body = Vec<DonationWithEarmark>),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_donations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.donations.list_all().await?))
}

/// `POST /donations`: Record a donation and credit its earmark.
///
/// # Errors
///
/// Returns [`MarathonError::InvalidRequest`] on a malformed body or
/// unresolvable earmark, [`MarathonError::NotFound`] for an unknown bid or
/// option.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    tag = "Donations",
    summary = "Create donation",
    description = "Records a donation. When `to_bid` is set, `bid_details` names the bid and, for bidwars, an existing option id or a new option name.",
    request_body = DonationRequest,
    responses(
        (status = 201, description = "Donation recorded", body = DonationWriteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Bid or option not found", body = ErrorResponse),
        (status = 409, description = "Donation id already exists", body = ErrorResponse),
    )
)]
pub async fn create_donation(
    State(state): State<AppState>,
    Json(req): Json<DonationRequest>,
) -> Result<impl IntoResponse, MarathonError> {
    req.validate()?;
    let id = req.id.clone().unwrap_or_default();
    let (donation, earmark) = req.into_parts(id);
    let receipt = state.donations.create(donation, earmark).await?;
    Ok((StatusCode::CREATED, Json(DonationWriteResponse::from(receipt))))
}

/// `GET /donations/{id}`: Get a donation with its earmark details.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the donation does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/donations/{id}",
    tag = "Donations",
    summary = "Get donation",
    params(
        ("id" = String, Path, description = "Donation id"),
    ),
    responses(
        (status = 200, description = "Donation with earmark", body = DonationWithEarmark),
        (status = 404, description = "Donation not found", body = ErrorResponse),
    )
)]
pub async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.donations.get(&EntityId::from(id)).await?))
}

/// `PUT /donations/{id}`: Edit a donation and move its credit.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the donation does not exist, and
/// the same errors as creation otherwise.
#[utoipa::path(
    put,
    path = "/api/v1/donations/{id}",
    tag = "Donations",
    summary = "Update donation",
    description = "Replaces the donation fields. Amount changes on the same earmark move the difference; a new earmark debits the old target and credits the new one.",
    params(
        ("id" = String, Path, description = "Donation id"),
    ),
    request_body = DonationRequest,
    responses(
        (status = 200, description = "Donation updated", body = DonationWriteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Donation, bid or option not found", body = ErrorResponse),
    )
)]
pub async fn update_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DonationRequest>,
) -> Result<impl IntoResponse, MarathonError> {
    req.validate()?;
    let (donation, earmark) = req.into_parts(EntityId::from(id));
    let receipt = state.donations.update(donation, earmark).await?;
    Ok(Json(DonationWriteResponse::from(receipt)))
}

/// `DELETE /donations/{id}`: Delete a donation and debit its earmark.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the donation does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/donations/{id}",
    tag = "Donations",
    summary = "Delete donation",
    params(
        ("id" = String, Path, description = "Donation id"),
    ),
    responses(
        (status = 200, description = "Donation deleted", body = DonationWriteResponse),
        (status = 404, description = "Donation not found", body = ErrorResponse),
    )
)]
pub async fn delete_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    let receipt = state.donations.delete(&EntityId::from(id)).await?;
    Ok(Json(DonationWriteResponse::from(receipt)))
}

/// Donation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/donations", get(list_donations).post(create_donation))
        .route(
            "/donations/{id}",
            get(get_donation).put(update_donation).delete(delete_donation),
        )
}
