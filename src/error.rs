//! Service error types with HTTP status code mapping.
//!
//! [`MarathonError`] is the central error type shared by the materializer,
//! the ledger, the persistence layer and the REST handlers. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "bid not found: 6f1c...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the table on [`MarathonError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error enum shared by every layer, with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                  |
/// |-----------|-----------------------|------------------------------|
/// | 1000–1999 | Validation            | 400 Bad Request              |
/// | 2000–2999 | State / Not Found     | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server / Database     | 500 Internal Server Error    |
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarathonError {
    /// A referenced entity (run, schedule, bid, option, donation, event) is absent.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"bid"`.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A unique constraint was violated on insert.
    #[error("already exists: {0}")]
    Duplicated(String),

    /// Running totals disagree with the donations earmarked to them.
    #[error("ledger inconsistent: {0}")]
    Inconsistent(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other persistence failure. The unit of work has been rolled back.
    #[error("database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarathonError {
    /// Shorthand for a [`MarathonError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Translates a `sqlx` failure, reporting `entity` on missing rows and
    /// unique violations.
    #[must_use]
    pub fn from_sqlx(entity: &'static str, err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound {
                entity,
                id: String::new(),
            },
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Duplicated(format!("{entity}: {}", db.message()))
            }
            other => Self::Database(other.to_string()),
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound { .. } => 2001,
            Self::Duplicated(_) => 2002,
            Self::Inconsistent(_) => 2003,
            Self::Database(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicated(_) | Self::Inconsistent(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MarathonError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = MarathonError::not_found("bid", "b-1");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.to_string(), "bid not found: b-1");
    }

    #[test]
    fn duplicated_and_inconsistent_are_conflicts() {
        assert_eq!(
            MarathonError::Duplicated("option".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            MarathonError::Inconsistent("drift".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_is_server_error() {
        let err = MarathonError::Database("connection reset".to_string());
        assert!(err.status_code().is_server_error());
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn row_not_found_translates_to_not_found() {
        let err = MarathonError::from_sqlx("donation", &sqlx::Error::RowNotFound);
        let MarathonError::NotFound { entity, .. } = err else {
            panic!("expected NotFound, got {err:?}");
        };
        assert_eq!(entity, "donation");
    }

    #[test]
    fn other_sqlx_errors_are_database_errors() {
        let err = MarathonError::from_sqlx("bid", &sqlx::Error::PoolTimedOut);
        assert!(matches!(err, MarathonError::Database(_)));
    }

    #[test]
    fn response_carries_status() {
        let response = MarathonError::InvalidRequest("amount".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
