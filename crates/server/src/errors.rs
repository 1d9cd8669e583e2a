use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

pub const CUSTOMER_NOT_FOUND: &str = "Customer not found";

/// Failures a customer handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Customer not found")]
    NotFound,
    #[error("customer creation rejected")]
    CreationRejected,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Label used for the `outcome` metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::NotFound => "not_found",
            ApiError::CreationRejected => "rejected",
            ApiError::Internal(_) => "error",
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, CUSTOMER_NOT_FOUND).into_response(),
            ApiError::CreationRejected => StatusCode::BAD_REQUEST.into_response(),
            ApiError::Internal(msg) => {
                error!(error = %msg, "customer request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"error": msg})))
                    .into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage initialization failed: {0}")]
    Storage(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
