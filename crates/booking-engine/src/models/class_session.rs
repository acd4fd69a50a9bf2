//! 课程场次实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 课程场次
///
/// 容量固定，引擎从不修改 capacity，只有针对该场次的
/// booked 预约数量在变化
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClassSession {
    pub id: i64,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// 座位上限，必须为正
    pub capacity: i32,
    #[sqlx(default)]
    pub location: Option<String>,
    #[sqlx(default)]
    pub instructor: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// 带当前预约数的课程场次（列表展示用，非数据库实体）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClassSessionWithCount {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub active: bool,
    /// 当前 booked 状态的预约数
    pub booked_count: i64,
}
