use application::{ApplicationError, ErrorKind};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// 所有失败响应共用的错误体
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "INVALID_ARGUMENT")]
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        match error.kind() {
            ErrorKind::Validation => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", error.to_string())
            }
            ErrorKind::NotFound => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "subscription not found",
            ),
            // 不把驱动层的原始错误暴露给客户端
            ErrorKind::Storage => ApiError::internal_server_error("internal error"),
            ErrorKind::Timeout => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "TIMEOUT",
                "storage operation timed out",
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("invalid json: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
