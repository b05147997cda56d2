use axum::http::{header::WWW_AUTHENTICATE, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use prospector_agent::{ClassifyError, DispatchError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Client-facing failure classes. Every variant renders as a JSON body;
/// nothing here ever surfaces a stack trace to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Unauthorized => json!({"detail": "Invalid credentials"}),
            Self::RateLimited => json!({"detail": "rate limit exceeded"}),
            Self::BadRequest(message) => json!({"error": message}),
            Self::Internal(_) => json!({"error": "An unexpected error occurred"}),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref detail) = self {
            error!(event_name = "api.error.internal", detail = %detail, "request failed");
        }

        let mut response = (self.status(), Json(self.body())).into_response();
        if matches!(self, Self::Unauthorized) {
            response.headers_mut().insert(WWW_AUTHENTICATE, "Basic".parse().expect("static value"));
        }
        response
    }
}

/// Malformed model output during classification is a 400-class failure (the
/// request produced no usable intent); backend trouble is a 500.
impl From<ClassifyError> for ApiError {
    fn from(value: ClassifyError) -> Self {
        match value {
            ClassifyError::Extract(error) => Self::BadRequest(error.to_string()),
            ClassifyError::Gateway(error) => Self::Internal(error.to_string()),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::MissingField(_) | DispatchError::UnknownIntent(_) => {
                Self::BadRequest(value.to_string())
            }
            DispatchError::Gateway(error) => Self::Internal(error.to_string()),
        }
    }
}
