//! 预约引擎错误类型
//!
//! 定义引擎层的业务错误和系统错误。`error_code` 返回的符号码
//! 是对外 API 契约的一部分，上层按码映射 HTTP 状态。

use thiserror::Error;

/// 预约引擎错误类型
#[derive(Debug, Error)]
pub enum BookingError {
    // === 课程场次相关错误 ===
    #[error("课程场次不存在或已下线: {0}")]
    ClassNotFound(i64),

    #[error("课程场次已满员: class_session_id={0}")]
    ClassFull(i64),

    // === 通卡相关错误 ===
    #[error("没有可用的通卡")]
    NoActivePass,

    #[error("次卡余额不足: user_pass_id={0}")]
    NoCredits(i64),

    #[error("通卡不存在: {0}")]
    PassNotFound(i64),

    #[error("通卡类型不存在: {0}")]
    PassTypeNotFound(i64),

    #[error("通卡类型已下架: {0}")]
    PassTypeInactive(i64),

    #[error("已持有同类型的有效订阅: pass_type_id={0}")]
    AlreadyActiveSubscription(i64),

    // === 预约相关错误 ===
    #[error("该场次已有有效预约: user_id={user_id}, class_session_id={class_session_id}")]
    AlreadyBooked {
        user_id: i64,
        class_session_id: i64,
    },

    #[error("预约不存在: {0}")]
    BookingNotFound(i64),

    #[error("预约已取消: booking_id={0}")]
    AlreadyCancelled(i64),

    // === 参数校验错误 ===
    #[error("无效的通卡 ID")]
    InvalidUserPassId,

    #[error("无效的有效期天数: {0}")]
    InvalidDurationDays(i32),

    #[error("无效的次卡点数: {0}")]
    InvalidPackCredits(i32),

    #[error("无效的通卡种类: {0}")]
    InvalidPassKind(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, BookingError>;

impl BookingError {
    /// 获取错误码（对外 API 契约，snake_case）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ClassNotFound(_) => "class_not_found",
            Self::ClassFull(_) => "class_full",
            Self::NoActivePass => "no_active_pass",
            Self::NoCredits(_) => "no_credits",
            Self::PassNotFound(_) => "pass_not_found",
            Self::PassTypeNotFound(_) => "pass_type_not_found",
            Self::PassTypeInactive(_) => "pass_type_inactive",
            Self::AlreadyActiveSubscription(_) => "already_active_subscription",
            Self::AlreadyBooked { .. } => "already_booked",
            Self::BookingNotFound(_) => "booking_not_found",
            Self::AlreadyCancelled(_) => "already_cancelled",
            Self::InvalidUserPassId => "invalid_user_pass_id",
            Self::InvalidDurationDays(_) => "invalid_duration_days",
            Self::InvalidPackCredits(_) => "invalid_pack_credits",
            Self::InvalidPassKind(_) => "invalid_pass_kind",
            Self::Database(_) => "database_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// 检查是否为业务错误（非系统错误）
    ///
    /// 业务错误直接透传给调用方，系统错误只暴露通用提示
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// 检查是否为序列化冲突（SQLSTATE 40001）
    ///
    /// SERIALIZABLE 隔离级别下并发事务相互冲突时由 PostgreSQL 主动中止，
    /// 整个事务从头重试一次即可解决绝大多数场景
    pub fn is_serialization_conflict(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("40001")
            }
            _ => false,
        }
    }
}
