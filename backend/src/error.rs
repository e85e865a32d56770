//! Error types for the users service and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use users_common::{PatchError, ValidationError};

use crate::repository::RepositoryError;

/// Failures surfaced by the service and the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more validation rules failed.
    #[error("Validation failed: {}", .0.messages().join(", "))]
    Validation(#[from] ValidationError),

    /// Malformed or inconsistent request parameters.
    #[error("{0}")]
    InvalidParameter(String),

    #[error("Could not find user with id {0}")]
    UserNotFound(i64),

    #[error("No resource found at {0}")]
    RouteNotFound(String),

    #[error("Request method '{0}' is not supported")]
    MethodNotSupported(String),

    #[error("{0}")]
    Internal(String),
}

impl From<PatchError> for Error {
    fn from(e: PatchError) -> Self {
        Error::InvalidParameter(e.to_string())
    }
}

impl From<RepositoryError> for Error {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => Error::UserNotFound(id),
            other => Error::Internal(other.to_string()),
        }
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Error::UserNotFound(_) | Error::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, fixed summary shown as `message`.
    fn summary(&self) -> &'static str {
        match self {
            Error::Validation(_) => "Arguments are not valid",
            Error::InvalidParameter(_) => "Bad user request",
            Error::UserNotFound(_) | Error::RouteNotFound(_) => "Resource not found",
            Error::MethodNotSupported(_) => "Method not allowed",
            Error::Internal(_) => "Internal server error",
        }
    }

    /// Attach the request path the error is reported for.
    pub fn at(self, instance: impl Into<String>) -> ApiError {
        ApiError {
            error: self,
            instance: instance.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub title: String,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_params: Option<Vec<String>>,
    pub instance: String,
}

/// An [`Error`] bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    pub error: Error,
    pub instance: String,
}

impl ApiError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let status = self.error.status();
        let (detail, invalid_params) = match &self.error {
            Error::Validation(e) => ("Invalid request content.".to_string(), Some(e.messages())),
            other => (other.to_string(), None),
        };

        ErrorResponse {
            title: status.canonical_reason().unwrap_or("Unknown").to_string(),
            status: status.as_u16(),
            timestamp: Utc::now(),
            message: self.error.summary().to_string(),
            detail,
            invalid_params,
            instance: self.instance.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Error::Internal(detail) = &self.error {
            tracing::error!(instance = %self.instance, "Internal error: {}", detail);
        } else {
            tracing::debug!(instance = %self.instance, "Request failed: {}", self.error);
        }

        (self.error.status(), Json(self.to_error_response())).into_response()
    }
}
