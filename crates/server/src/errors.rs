use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { status, error: error.to_string(), message }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, title) = match &e {
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            ServiceError::LimitExceeded(_) => (StatusCode::PAYMENT_REQUIRED, "Plan Limit Exceeded"),
            ServiceError::Payment(_) => (StatusCode::PAYMENT_REQUIRED, "Payment Failed"),
            ServiceError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        if status.is_server_error() {
            error!(err = %e, "request failed");
            // Database details stay in the log.
            return JsonApiError::new(status, title, None);
        }
        JsonApiError::new(status, title, Some(e.to_string()))
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let (status, title) = match &e {
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            AuthError::Conflict => (StatusCode::CONFLICT, "Conflict"),
            AuthError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::Suspended => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        if status.is_server_error() {
            error!(err = %e, code = e.code(), "auth request failed");
            return JsonApiError::new(status, title, None);
        }
        warn!(code = e.code(), "auth rejected: {e}");
        JsonApiError::new(status, title, Some(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::LimitExceeded("x".into()), StatusCode::PAYMENT_REQUIRED),
            (ServiceError::Payment("x".into()), StatusCode::PAYMENT_REQUIRED),
            (ServiceError::Db("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn db_detail_is_hidden() {
        let e = JsonApiError::from(ServiceError::Db("relation \"vendor\" does not exist".into()));
        assert!(e.message.is_none());
    }

    #[test]
    fn suspended_login_is_forbidden() {
        assert_eq!(JsonApiError::from(AuthError::Suspended).status, StatusCode::FORBIDDEN);
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
    }
}
