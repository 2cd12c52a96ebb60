//! Event handlers: dashboard summary and donation listings.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::EventTotalResponse;
use crate::app_state::AppState;
use crate::domain::{DonationWithEarmark, EntityId, EventSummary};
use crate::error::{ErrorResponse, MarathonError};

/// `GET /events/{id}/summary`: Dashboard counts for an event.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/summary",
    tag = "Events",
    summary = "Event summary",
    params(
        ("id" = String, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Event with entity counts", body = EventSummary),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn event_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.catalog.event_summary(&EntityId::from(id)).await?))
}

/// `GET /events/{id}/donations`: Donations of an event.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/donations",
    tag = "Events",
    summary = "List event donations",
    description = "Returns the donations of an event in time order, each with its bid and option details.",
    params(
        ("id" = String, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Donations with earmarks", body = Vec<DonationWithEarmark>),
    )
)]
pub async fn list_event_donations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.donations.list_by_event(&EntityId::from(id)).await?))
}

/// `GET /events/{id}/donations/total`: Total donated to an event.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/donations/total",
    tag = "Events",
    summary = "Event donation total",
    params(
        ("id" = String, Path, description = "Event id"),
    ),
    responses(
        (status = 200, description = "Total donated", body = EventTotalResponse),
    )
)]
pub async fn event_total(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    let event_id = EntityId::from(id);
    let total = state.donations.total_by_event(&event_id).await?;
    Ok(Json(EventTotalResponse { event_id, total }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/summary", get(event_summary))
        .route("/events/{id}/donations", get(list_event_donations))
        .route("/events/{id}/donations/total", get(event_total))
}
