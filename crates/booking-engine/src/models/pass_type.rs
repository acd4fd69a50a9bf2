//! 通卡目录实体
//!
//! 运营侧维护的售卖目录，引擎只读不写；一旦被签发过通卡即视为不可变。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::PassKind;

/// 通卡类型（目录项）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PassType {
    pub id: i64,
    pub name: String,
    /// 种类：订阅或次卡
    pub kind: PassKind,
    /// 初始点数（仅次卡有值）
    #[sqlx(default)]
    pub credits: Option<i32>,
    /// 签发后的有效期天数
    pub duration_days: i32,
    /// 是否在售
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_type_json_shape() {
        let pt = PassType {
            id: 1,
            name: "10 次卡".to_string(),
            kind: PassKind::Pack,
            credits: Some(10),
            duration_days: 90,
            active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&pt).unwrap();
        assert_eq!(json["kind"], "pack");
        assert_eq!(json["credits"], 10);
    }
}
