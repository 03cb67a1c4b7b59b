// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::database::StoreError;
use crate::services::ldu_service::ServiceError;

/// Error body returned to clients. `developerMessage` is omitted entirely
/// when there is nothing useful to say (403s carry the status alone).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_message: Option<String>,
}

/// HTTP API error with appropriate status codes and client-facing messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 403 Forbidden
    Forbidden,

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn developer_message(&self) -> Option<String> {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => Some(msg.clone()),
            ApiError::Forbidden => None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(v) => {
                tracing::debug!("Bad Request (400) returned: {}", v);
                ApiError::BadRequest(v.to_string())
            }
            ServiceError::AccessDenied => {
                tracing::debug!("Forbidden (403) returned");
                ApiError::Forbidden
            }
            ServiceError::Store(StoreError::Duplicate(msg)) => {
                tracing::warn!("Duplicate key: {}", msg);
                ApiError::Conflict("Local Delivery Unit already exists".to_string())
            }
            ServiceError::Store(store_err) => {
                // Log the real error but return a generic message
                tracing::error!("Store error: {}", store_err);
                ApiError::InternalServerError(
                    "An error occurred while processing your request".to_string(),
                )
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.developer_message() {
            Some(msg) => write!(f, "{}", msg),
            None => write!(f, "{}", self.status_code()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            status: status.as_u16(),
            developer_message: self.developer_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_body_has_status_only() {
        let body = ErrorResponse {
            status: 403,
            developer_message: None,
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"status":403}"#);
    }

    #[test]
    fn bad_request_body_names_the_field() {
        let body = ErrorResponse {
            status: 400,
            developer_message: Some("probationAreaCode: Invalid Probation Area code".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":400,"developerMessage":"probationAreaCode: Invalid Probation Area code"}"#
        );
    }

    // The upsert-based store resolves most write races itself, so this path
    // only fires when a save surfaces a unique violation directly.
    #[test]
    fn duplicate_store_error_maps_to_conflict() {
        let err = ApiError::from(ServiceError::Store(StoreError::Duplicate(
            "local_delivery_unit_business_key".to_string(),
        )));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.developer_message().as_deref(),
            Some("Local Delivery Unit already exists")
        );
    }
}
