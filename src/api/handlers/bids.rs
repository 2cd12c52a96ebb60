//! Bid handlers: reads, ledger audit and reconciliation.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::ReconcileResponse;
use crate::app_state::AppState;
use crate::domain::{Bid, EntityId};
use crate::error::{ErrorResponse, MarathonError};
use crate::ledger::AuditReport;

/// `GET /bids`: List bids with their options.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/bids",
    tag = "Bids",
    summary = "List bids",
    responses(
        (status = 200, description = "Bids with options", body = Vec<Bid>),
    )
)]
pub async fn list_bids(State(state): State<AppState>) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.catalog.list_bids().await?))
}

/// `GET /bids/{id}`: Get one bid.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the bid does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/bids/{id}",
    tag = "Bids",
    summary = "Get bid",
    params(
        ("id" = String, Path, description = "Bid id"),
    ),
    responses(
        (status = 200, description = "Bid with options", body = Bid),
        (status = 404, description = "Bid not found", body = ErrorResponse),
    )
)]
pub async fn get_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.catalog.get_bid(&EntityId::from(id)).await?))
}

/// `GET /bids/{id}/audit`: Check totals against earmarked donations.
///
/// # Errors
///
/// Returns [`MarathonError::Inconsistent`] when totals have drifted.
#[utoipa::path(
    get,
    path = "/api/v1/bids/{id}/audit",
    tag = "Bids",
    summary = "Audit bid totals",
    description = "Recomputes the bid and option totals from earmarked donations and compares them to the stored totals.",
    params(
        ("id" = String, Path, description = "Bid id"),
    ),
    responses(
        (status = 200, description = "Totals are consistent", body = AuditReport),
        (status = 404, description = "Bid not found", body = ErrorResponse),
        (status = 409, description = "Totals have drifted", body = ErrorResponse),
    )
)]
pub async fn audit_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.donations.audit_bid(&EntityId::from(id)).await?))
}

/// `POST /bids/{id}/reconcile`: Rewrite totals from earmarked donations.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the bid does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/bids/{id}/reconcile",
    tag = "Bids",
    summary = "Reconcile bid totals",
    description = "Sets every option total and the bid total to the sums of their earmarked donations in one transaction.",
    params(
        ("id" = String, Path, description = "Bid id"),
    ),
    responses(
        (status = 200, description = "Totals rewritten", body = ReconcileResponse),
        (status = 404, description = "Bid not found", body = ErrorResponse),
    )
)]
pub async fn reconcile_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    let reconciliation = state.donations.reconcile_bid(&EntityId::from(id)).await?;
    Ok(Json(ReconcileResponse::from(reconciliation)))
}

/// Bid routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bids", get(list_bids))
        .route("/bids/{id}", get(get_bid))
        .route("/bids/{id}/audit", get(audit_bid))
        .route("/bids/{id}/reconcile", post(reconcile_bid))
}
