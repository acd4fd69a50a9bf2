//! 用户通卡实体
//!
//! 通卡是已签发的预约权利：订阅在有效期内不限次数，次卡按剩余点数扣减。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{PassKind, UserPassStatus};

/// 用户通卡
///
/// 不变式：次卡的 remaining_credits 永不为负；订阅的 remaining_credits 恒为 NULL。
/// remaining_credits 只被预约事务（扣减）和取消事务（退回，仅次卡）修改。
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPass {
    pub id: i64,
    pub user_id: i64,
    pub pass_type_id: i64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// 剩余点数（订阅为 NULL，次卡为非负整数）
    #[sqlx(default)]
    pub remaining_credits: Option<i32>,
    pub status: UserPassStatus,
    pub created_at: DateTime<Utc>,
}

/// 选卡候选行（事务内 FOR UPDATE 查询结果）
///
/// 通卡与其目录种类的联结视图，选卡决策需要 kind 但引擎从不回写 pass_types
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PassCandidate {
    pub id: i64,
    pub user_id: i64,
    pub pass_type_id: i64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[sqlx(default)]
    pub remaining_credits: Option<i32>,
    pub status: UserPassStatus,
    pub kind: PassKind,
}

impl PassCandidate {
    /// 检查通卡此刻是否可用
    ///
    /// 可用 = active 且未过期，且（订阅 或 次卡有剩余点数）
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == UserPassStatus::Active
            && self.expires_at > now
            && (self.kind == PassKind::Subscription || self.remaining_credits.unwrap_or(0) > 0)
    }

    /// 检查是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// 通卡及其目录信息（查询展示用，非数据库实体）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPassWithType {
    pub id: i64,
    pub user_id: i64,
    pub pass_type_id: i64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_credits: Option<i32>,
    pub status: UserPassStatus,
    pub created_at: DateTime<Utc>,
    /// 目录字段（pt_ 前缀列）
    pub name: String,
    pub kind: PassKind,
    pub credits: Option<i32>,
    pub duration_days: i32,
    pub type_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn candidate(kind: PassKind, credits: Option<i32>) -> PassCandidate {
        let now = Utc::now();
        PassCandidate {
            id: 1,
            user_id: 10,
            pass_type_id: 2,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(30),
            remaining_credits: credits,
            status: UserPassStatus::Active,
            kind,
        }
    }

    #[test]
    fn test_subscription_usable_without_credits() {
        let now = Utc::now();
        let pass = candidate(PassKind::Subscription, None);
        assert!(pass.is_usable(now));
    }

    #[test]
    fn test_pack_requires_positive_credits() {
        let now = Utc::now();
        let mut pass = candidate(PassKind::Pack, Some(3));
        assert!(pass.is_usable(now));

        pass.remaining_credits = Some(0);
        assert!(!pass.is_usable(now));

        pass.remaining_credits = None;
        assert!(!pass.is_usable(now));
    }

    #[test]
    fn test_expired_pass_not_usable() {
        let now = Utc::now();
        let mut pass = candidate(PassKind::Subscription, None);
        pass.expires_at = now - Duration::hours(1);
        assert!(pass.is_expired(now));
        assert!(!pass.is_usable(now));
    }

    #[test]
    fn test_non_active_status_not_usable() {
        let now = Utc::now();
        let mut pass = candidate(PassKind::Pack, Some(5));
        pass.status = UserPassStatus::Cancelled;
        assert!(!pass.is_usable(now));

        pass.status = UserPassStatus::Expired;
        assert!(!pass.is_usable(now));
    }
}
