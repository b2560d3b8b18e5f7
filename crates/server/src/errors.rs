use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some("unexpected error".into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.error, "message": self.message}))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidEndpoint(msg) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid Endpoint", Some(msg)),
            ServiceError::DuplicateId(_) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Endpoint Exists", Some(e.to_string())),
            ServiceError::InvalidId(msg) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid Id", Some(msg)),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            // storage details stay in the log
            ServiceError::Storage(msg) => {
                error!(error = %msg, "storage failure");
                Self::internal()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("check store unavailable: {0}")]
    Store(#[from] service::errors::StoreError),
    #[error("cannot load TLS certificate/key: {0}")]
    Tls(String),
}
