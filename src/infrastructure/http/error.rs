//! HTTP Error Handling
//!
//! 业务错误统一以 HTTP 200 + `{errno, error, data}` 返回，`errno` 与状态码同义

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const PAYLOAD_TOO_LARGE: i32 = 413;
    pub const UNPROCESSABLE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    /// 快照引用无法解析，恢复已回滚
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => errno::PAYLOAD_TOO_LARGE,
            ApiError::Unprocessable(_) => errno::UNPROCESSABLE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.errno();
        let msg = self.message();

        if code >= errno::INTERNAL_ERROR {
            tracing::error!(errno = code, error = %msg, "Internal server error");
        } else {
            tracing::warn!(errno = code, error = %msg, "Request rejected");
        }

        (StatusCode::OK, Json(ErrorResponse::new(code, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::MalformedSnapshot(msg) => {
                ApiError::BadRequest(format!("Malformed snapshot: {}", msg))
            }
            ApplicationError::IntegrityViolation(msg) => ApiError::Unprocessable(msg),
            ApplicationError::StorageFailure(msg) => ApiError::Internal(msg),
        }
    }
}
