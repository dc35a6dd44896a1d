//! Error responses: every failure is a JSON body with `error` and `success: false`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use balance::ServiceError;
use serde::Serialize;
use std::any::Any;
use tracing::{error, warn};

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub success: bool,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request is malformed; the message goes back to the caller
    #[error("{0}")]
    Validation(String),

    /// The chain could not answer
    #[error("{0}")]
    Upstream(String),

    /// Anything unanticipated. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => Self::Validation(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(message) => {
                warn!(%message, "Rejected request");
                ErrorBody::new(message)
            }
            Self::Upstream(message) => {
                warn!(%message, "Upstream failure");
                ErrorBody::new(message)
            }
            Self::Internal(detail) => {
                error!(%detail, "Internal server error");
                ErrorBody::new("Internal server error")
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Turn a handler panic into an opaque 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}
