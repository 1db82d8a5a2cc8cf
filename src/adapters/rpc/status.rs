//! RPC Status - Client-facing Error Codes
//!
//! gRPC-style status codes carried over HTTP/JSON. Messages are
//! deliberately generic for `INTERNAL`: upstream and store details
//! stay in the logs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code of a failed RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    /// The request was malformed (e.g. empty market).
    InvalidArgument,
    /// Anything that went wrong behind the facade.
    Internal,
    /// The per-request deadline expired.
    DeadlineExceeded,
}

impl Code {
    /// HTTP status the code is served with.
    pub const fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Lower-case label used in metrics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Internal => "internal",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// A failed RPC: code plus client-safe message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct RpcStatus {
    /// Status code.
    pub code: Code,
    /// Human-readable, client-safe message.
    pub message: String,
}

impl RpcStatus {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: Code::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: Code::Internal,
            message: message.into(),
        }
    }

    pub fn deadline_exceeded() -> Self {
        Self {
            code: Code::DeadlineExceeded,
            message: "deadline exceeded".to_string(),
        }
    }
}

impl IntoResponse for RpcStatus {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_http_mapping() {
        assert_eq!(Code::InvalidArgument.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Code::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Code::DeadlineExceeded.http_status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_status_serializes_screaming_code() {
        let json = serde_json::to_string(&RpcStatus::invalid_argument("market is required")).unwrap();
        assert_eq!(json, r#"{"code":"INVALID_ARGUMENT","message":"market is required"}"#);
    }

    #[test]
    fn test_into_response_uses_code_status() {
        let response = RpcStatus::internal("failed to get rates").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
