//! REST API layer: route handlers, DTOs, `OpenAPI` document and router
//! composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` and the API
//! docs live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_routes())
}

/// Swagger UI at `/swagger-ui`, backed by `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", openapi::openapi()),
    )
}

/// Raw `OpenAPI` JSON at `/api-docs/openapi.json`.
#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(openapi::openapi()) }),
    )
}
