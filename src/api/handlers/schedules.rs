//! Schedule handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{EntityId, Schedule};
use crate::error::{ErrorResponse, MarathonError};

/// `GET /schedules`: List schedules with their runs.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    tag = "Schedules",
    summary = "List schedules",
    responses(
        (status = 200, description = "Schedules with runs, teams and players", body = Vec<Schedule>),
    )
)]
pub async fn list_schedules(State(state): State<AppState>) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.catalog.list_schedules().await?))
}

/// `GET /schedules/{id}`: Get one schedule.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the schedule does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{id}",
    tag = "Schedules",
    summary = "Get schedule",
    params(
        ("id" = String, Path, description = "Schedule id"),
    ),
    responses(
        (status = 200, description = "Schedule with runs", body = Schedule),
        (status = 404, description = "Schedule not found", body = ErrorResponse),
    )
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    Ok(Json(state.catalog.get_schedule(&EntityId::from(id)).await?))
}

/// Schedule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list_schedules))
        .route("/schedules/{id}", get(get_schedule))
}
