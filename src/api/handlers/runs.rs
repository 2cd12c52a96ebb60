//! Run handlers: nested runs with teams, players, bids and options.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::EventFilter;
use crate::app_state::AppState;
use crate::domain::{EntityId, Run};
use crate::error::{ErrorResponse, MarathonError};

/// `GET /runs`: List runs, optionally for one event.
///
/// # Errors
///
/// Returns [`MarathonError::Database`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/runs",
    tag = "Runs",
    summary = "List runs",
    description = "Returns every run with its teams, players, bids and bid options, ordered by start time.",
    params(EventFilter),
    responses(
        (status = 200, description = "Nested runs", body = Vec<Run>),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_runs(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<impl IntoResponse, MarathonError> {
    let runs = match filter.event_id {
        Some(event_id) => state.catalog.list_runs_of_event(&event_id).await?,
        None => state.catalog.list_runs().await?,
    };
    Ok(Json(runs))
}

/// `GET /runs/{id}`: Get one run.
///
/// # Errors
///
/// Returns [`MarathonError::NotFound`] if the run does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    summary = "Get run",
    params(
        ("id" = String, Path, description = "Run id"),
    ),
    responses(
        (status = 200, description = "Run with teams and bids", body = Run),
        (status = 404, description = "Run not found", body = ErrorResponse),
    )
)]
pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarathonError> {
    let run = state.catalog.get_run(&EntityId::from(id)).await?;
    Ok(Json(run))
}

/// Run routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/runs", get(list_runs))
        .route("/runs/{id}", get(get_run))
}
