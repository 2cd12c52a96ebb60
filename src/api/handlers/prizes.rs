//! Prize handlers: read-only listing for donors.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::EventFilter;
use crate::app_state::AppState;
use crate::domain::{EntityId, Prize};
use crate::error::{ErrorResponse, MarathonError};

/// `GET /prizes`: List prizes, optionally for one event.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/prizes",
    tag = "Prizes",
    summary = "List prizes",
    description = "Returns prizes ordered by the minimum donation that enters their draw.",
    params(EventFilter),
    responses(
        (status = 200, description = "Prizes", body = Vec<Prize>),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_prizes(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<impl IntoResponse, MarathonError> {
    let prizes = state.catalog.list_prizes(filter.event_id.as_ref()).await?;
    Ok(Json(prizes))
}

/// `GET /prizes/{id}`: Get one prize.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the prize does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/prizes/{id}",
    tag = "Prizes",
    summary = "Get prize",
    params(
        ("id" = String, Path, description = "Prize id"),
    ),
    responses(
        (status = 200, description = "Prize", body = Prize),
        (status = 404, description = "Prize not found", body = ErrorResponse),
    )
)]
pub async fn get_prize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.catalog.get_prize(&EntityId::from(id)).await?))
}

/// Prize routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/prizes", get(list_prizes))
        .route("/prizes/{id}", get(get_prize))
}
