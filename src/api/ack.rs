use crate::core::errors::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application level result codes carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckCode {
    Success = 0,
    Unauthorized = 1,
    BadArgs = 2,
    Backend = 3,
    NotFound = 4,
    SignUrl = 5,
}

/// JSON envelope returned by every `/api` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub code: i32,
    pub message: String,
    pub data: Value,
    pub req: Value,
}

impl Ack {
    pub fn success(data: impl Serialize, req: impl Serialize) -> Json<Ack> {
        Json(Ack {
            code: AckCode::Success as i32,
            message: "success".to_string(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
            req: serde_json::to_value(req).unwrap_or(Value::Null),
        })
    }
}

/// A failed request rendered as an [`Ack`] with a matching HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: AckCode,
    pub message: String,
    pub req: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, code: AckCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            req: Value::Null,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, AckCode::Unauthorized, message)
    }

    pub fn bad_args(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, AckCode::BadArgs, message)
    }

    pub fn with_req(mut self, req: impl Serialize) -> Self {
        self.req = serde_json::to_value(req).unwrap_or(Value::Null);
        self
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, AckCode::NotFound),
            Error::InvalidPath(_) => (StatusCode::BAD_REQUEST, AckCode::BadArgs),
            Error::Unsupported(_) => (StatusCode::NOT_IMPLEMENTED, AckCode::SignUrl),
            Error::BackendUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, AckCode::Backend),
            Error::Backend(_) => (StatusCode::BAD_GATEWAY, AckCode::Backend),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, AckCode::Backend),
        };
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, "{}", self.message);
        }
        let ack = Ack {
            code: self.code as i32,
            message: self.message,
            data: Value::Null,
            req: self.req,
        };
        (self.status, Json(ack)).into_response()
    }
}
