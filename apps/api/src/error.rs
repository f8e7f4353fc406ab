//! # API Error Type
//!
//! Caller-visible outcomes for every handler.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Pokédex API                        │
//! │                                                                         │
//! │  ValidationError ──────────────────────────► Validation   400          │
//! │  Option::None ─────────────────────────────► NotFound     404          │
//! │  DbError::WriteRejected / create == false ─► Conflict     409  warn    │
//! │  DbError::Unreachable ─────────────────────► Unavailable  503  error   │
//! │  DbError::Unauthorized / Store / Decode ───► Internal     500  error   │
//! │  spawned store task panicked ──────────────► Internal     500  error   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! { "error": "not_found", "detail": "Pokémon '99' not found" }
//! ```
//! Server faults carry a generic detail; the cause is only logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pokedex_core::ValidationError;
use pokedex_db::DbError;
use serde_json::json;

/// Detail returned for every server fault.
const INTERNAL_DETAIL: &str = "an internal error occurred";

/// Detail returned when the store cannot be reached.
const UNAVAILABLE_DETAIL: &str = "the catalog store is temporarily unavailable";

/// API error type with automatic HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    /// Input failed validation (400)
    Validation(ValidationError),

    /// No record matched (404)
    NotFound { resource: &'static str, key: String },

    /// The write was not applied (409)
    Conflict { message: String },

    /// Store unreachable (503, logged)
    Unavailable(DbError),

    /// Any other server fault (500, logged)
    Internal { cause: String },
}

impl ApiError {
    /// Stable machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Unavailable(_) => "service_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// HTTP status for this outcome.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable detail. Never contains store internals.
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound { resource, key } => format!("{} '{}' not found", resource, key),
            Self::Conflict { message } => message.clone(),
            Self::Unavailable(_) => UNAVAILABLE_DETAIL.to_string(),
            Self::Internal { .. } => INTERNAL_DETAIL.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Conflict { message } => tracing::warn!("Write conflict: {}", message),
            Self::Unavailable(e) => tracing::error!("Store unreachable: {}", e),
            Self::Internal { cause } => tracing::error!("Internal error: {}", cause),
            Self::Validation(_) | Self::NotFound { .. } => {}
        }

        let body = json!({
            "error": self.code(),
            "detail": self.detail(),
        });

        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::WriteRejected { message, .. } => Self::Conflict {
                message: format!("write rejected: {}", message),
            },
            DbError::Unreachable { .. } => Self::Unavailable(e),
            DbError::Unauthorized { .. } | DbError::Store { .. } | DbError::Decode { .. } => {
                Self::Internal {
                    cause: e.to_string(),
                }
            }
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
