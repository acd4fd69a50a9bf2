//! 预约引擎枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化，
//! 数据库中以小写文本存储。

use serde::{Deserialize, Serialize};

/// 通卡种类
///
/// 决定消耗方式：订阅在有效期内不限次数，次卡按点数扣减
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum PassKind {
    /// 订阅 - 有效期内不限次数，预约不扣点
    Subscription,
    /// 次卡 - 有限点数，每次预约扣 1 点
    Pack,
}

impl PassKind {
    /// 自动选卡时的优先级，数字小者优先
    ///
    /// 订阅不随消耗递减，优先使用；次卡留到没有订阅可用时再扣
    pub fn priority(&self) -> u8 {
        match self {
            Self::Subscription => 0,
            Self::Pack => 1,
        }
    }
}

/// 用户通卡状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum UserPassStatus {
    /// 有效 - 正常持有中
    #[default]
    Active,
    /// 已过期 - 超过有效期（读取时惰性标记）
    Expired,
    /// 已取消 - 运营撤回，终态不可逆
    Cancelled,
}

/// 预约状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum BookingStatus {
    /// 已预约 - 占用场次座位
    #[default]
    Booked,
    /// 已取消 - 座位释放，次卡点数已退回
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&PassKind::Subscription).unwrap(),
            "\"subscription\""
        );
        assert_eq!(
            serde_json::from_str::<PassKind>("\"pack\"").unwrap(),
            PassKind::Pack
        );
    }

    #[test]
    fn test_pass_kind_priority() {
        assert!(PassKind::Subscription.priority() < PassKind::Pack.priority());
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(UserPassStatus::default(), UserPassStatus::Active);
        assert_eq!(BookingStatus::default(), BookingStatus::Booked);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&UserPassStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(
            serde_json::from_str::<BookingStatus>("\"booked\"").unwrap(),
            BookingStatus::Booked
        );
    }
}
