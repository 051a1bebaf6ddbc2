//! Error types for the gateway's HTTP surface.
//!
//! Every variant renders as a JSON object with an `error` key. Session
//! failures all land on 401; Data API failures on record operations are
//! a separate class and use 502.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::gate::GateError;
use crate::fm_client::FmError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authorization header is missing")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    MalformedAuthHeader,

    #[error("Invalid JSON")]
    InvalidJson,

    /// Sorted names of required fields absent from the request.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid method")]
    InvalidMethod(String),

    /// Session could not be confirmed.
    #[error("{0}")]
    Rejected(String),

    /// Sign-in login refused; carries the Data API's answer.
    #[error("Signin failed")]
    SigninFailed(Value),

    #[error("Signout failed")]
    SignoutFailed,

    /// Record operation failed at the Data API.
    #[error("Data API error")]
    Backend { status: Option<u16>, body: Value },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MissingAuthHeader => (StatusCode::UNAUTHORIZED, json!({"error": self.to_string()})),
            AppError::MalformedAuthHeader | AppError::InvalidJson | AppError::MissingFields(_) => {
                (StatusCode::BAD_REQUEST, json!({"error": self.to_string()}))
            }
            AppError::InvalidMethod(method) => {
                tracing::debug!(method = %method, "Unknown dataApi method");
                (StatusCode::BAD_REQUEST, json!({"error": self.to_string()}))
            }
            AppError::Rejected(reason) => (StatusCode::UNAUTHORIZED, json!({"error": reason})),
            AppError::SigninFailed(details) => (
                StatusCode::UNAUTHORIZED,
                json!({"error": self.to_string(), "details": details}),
            ),
            AppError::SignoutFailed => (StatusCode::UNAUTHORIZED, json!({"error": self.to_string()})),
            AppError::Backend { status, body } => {
                tracing::warn!(backend_status = ?status, "Data API error");
                (StatusCode::BAD_GATEWAY, json!({"error": body, "status": status}))
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": msg}))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::MissingAuthHeader => AppError::MissingAuthHeader,
            GateError::MalformedAuthHeader => AppError::MalformedAuthHeader,
        }
    }
}

impl From<FmError> for AppError {
    fn from(err: FmError) -> Self {
        match err {
            FmError::Status { status, body } => AppError::Backend {
                status: Some(status),
                body,
            },
            other => AppError::Backend {
                status: None,
                body: Value::String(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = AppError::MissingFields(vec!["database".to_string(), "layout".to_string()]);
        assert_eq!(err.to_string(), "Missing required fields: database, layout");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::MissingAuthHeader, StatusCode::UNAUTHORIZED),
            (AppError::MalformedAuthHeader, StatusCode::BAD_REQUEST),
            (AppError::InvalidJson, StatusCode::BAD_REQUEST),
            (AppError::InvalidMethod("x".to_string()), StatusCode::BAD_REQUEST),
            (AppError::Rejected("invalid session token".to_string()), StatusCode::UNAUTHORIZED),
            (AppError::SigninFailed(Value::Null), StatusCode::UNAUTHORIZED),
            (AppError::SignoutFailed, StatusCode::UNAUTHORIZED),
            (
                AppError::Backend { status: Some(500), body: Value::Null },
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_status_error_passes_backend_body_through() {
        let body = json!({"messages": [{"code": "105", "message": "Layout is missing"}]});
        let err: AppError = FmError::Status { status: 500, body: body.clone() }.into();
        match err {
            AppError::Backend { status, body: passed } => {
                assert_eq!(status, Some(500));
                assert_eq!(passed, body);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_gate_errors_convert() {
        assert!(matches!(AppError::from(GateError::MissingAuthHeader), AppError::MissingAuthHeader));
        assert!(matches!(AppError::from(GateError::MalformedAuthHeader), AppError::MalformedAuthHeader));
    }
}
