//! API 层错误类型
//!
//! 引擎错误原样透传其错误码，HTTP 状态码在这一层统一映射。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use booking_engine::BookingError;
use serde_json::json;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("账号已被停用")]
    UserDisabled,
    #[error("该邮箱已注册")]
    EmailAlreadyExists,
    #[error("用户不存在: {0}")]
    UserNotFound(i64),

    // 参数校验
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 引擎业务错误
    #[error(transparent)]
    Engine(#[from] BookingError),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::UserDisabled => StatusCode::FORBIDDEN,
            Self::EmailAlreadyExists => StatusCode::CONFLICT,
            Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Engine(err) => engine_status_code(err),
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（对外 API 契约，snake_case）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserDisabled => "user_disabled",
            Self::EmailAlreadyExists => "email_already_exists",
            Self::UserNotFound(_) => "user_not_found",
            Self::Validation(_) => "validation_error",
            Self::Engine(err) => err.error_code(),
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// 引擎错误到 HTTP 状态码的映射
///
/// 资源不存在 404，与当前状态冲突 409，请求数据不合法 400
fn engine_status_code(err: &BookingError) -> StatusCode {
    match err {
        BookingError::ClassNotFound(_)
        | BookingError::PassNotFound(_)
        | BookingError::PassTypeNotFound(_)
        | BookingError::BookingNotFound(_) => StatusCode::NOT_FOUND,

        BookingError::ClassFull(_)
        | BookingError::NoActivePass
        | BookingError::NoCredits(_)
        | BookingError::PassTypeInactive(_)
        | BookingError::AlreadyActiveSubscription(_)
        | BookingError::AlreadyBooked { .. }
        | BookingError::AlreadyCancelled(_) => StatusCode::CONFLICT,

        BookingError::InvalidUserPassId
        | BookingError::InvalidDurationDays(_)
        | BookingError::InvalidPackCredits(_)
        | BookingError::InvalidPassKind(_) => StatusCode::BAD_REQUEST,

        BookingError::Database(_) | BookingError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Engine(engine_err) if !engine_err.is_business_error() => {
                tracing::error!(error = %engine_err, "引擎系统错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// API 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
