//! Request-boundary error type.
//!
//! Errors are classified by origin:
//! - Validation: a missing or malformed field in the request (400)
//! - Conflict: the request collides with existing data (409)
//! - Upstream: a Confluence/AI integration failure, passed through (500)
//! - Store: a database failure, raw message (500)
//!
//! Every handler catches here and responds with a JSON `{ "error": ... }`
//! body; conflict responses additionally carry the offending ids. No retry
//! logic anywhere; failures surface to the client once.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::ai::AiError;
use crate::board_import::ImportError;
use crate::config::ConfigError;
use crate::confluence::ConfluenceError;
use crate::db::DbError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Conflict {
        message: String,
        duplicates: Vec<String>,
    },

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Store(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Upstream(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    duplicates: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        } else {
            log::warn!("Request rejected: {self}");
        }
        let duplicates = match &self {
            ApiError::Conflict { duplicates, .. } => duplicates.clone(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            error: self.to_string(),
            duplicates,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Store(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<ConfluenceError> for ApiError {
    fn from(err: ConfluenceError) -> Self {
        match err {
            ConfluenceError::Duplicate => ApiError::Conflict {
                message: "Duplicate entry for this week and project".to_string(),
                duplicates: Vec::new(),
            },
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingProjectName(_) | ImportError::EmptySheet => {
                ApiError::Validation(err.to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
