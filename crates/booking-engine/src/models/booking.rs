//! 预约实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::BookingStatus;

/// 预约记录
///
/// 生命周期：预约事务创建（booked），取消事务单向迁移到 cancelled
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub class_session_id: i64,
    /// 消耗的通卡（创建时必填）
    #[sqlx(default)]
    pub user_pass_id: Option<i64>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// 预约及其场次信息（我的预约列表用，非数据库实体）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookingWithSession {
    pub id: i64,
    pub user_id: i64,
    pub class_session_id: i64,
    pub user_pass_id: Option<i64>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: Option<String>,
    pub instructor: Option<String>,
}
