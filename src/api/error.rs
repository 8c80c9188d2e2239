use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use crate::narrative::NarrativeError;

use super::response::ErrorResponse;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("upstream model error: {0}")]
    Upstream(#[source] NarrativeError),

    #[error("AI narrative generation is not configured")]
    NotConfigured,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Store(_) => "STORE_ERROR",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::NotConfigured => "NOT_CONFIGURED",
        }
    }

    /// Message shown to clients; store internals stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => "Failed to access compliance data".to_string(),
            ApiError::Upstream(_) => "Failed to generate a response from the language model".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<NarrativeError> for ApiError {
    fn from(e: NarrativeError) -> Self {
        match e {
            NarrativeError::NotConfigured(_) => ApiError::NotConfigured,
            NarrativeError::Store(source) => ApiError::Store(source),
            other => ApiError::Upstream(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        } else {
            warn!(code = self.code(), error = %self, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse::new(self.public_message(), self.code())),
        )
            .into_response()
    }
}
