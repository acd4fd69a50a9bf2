//! 请求 DTO 定义
//!
//! 字段级校验用 validator，跨字段与业务规则在 handler 里判

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// 注册请求
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "密码长度必须在 8-100 之间"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "名称长度必须在 1-100 之间"))]
    pub name: String,
}

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "密码不能为空"))]
    pub password: String,
}

/// 预约请求
#[derive(Debug, Deserialize, Validate)]
pub struct BookClassRequest {
    #[validate(range(min = 1, message = "无效的场次 ID"))]
    pub class_session_id: i64,
    /// 显式指定要消耗的通卡，缺省时自动选卡
    pub user_pass_id: Option<i64>,
}

/// 购买通卡请求
#[derive(Debug, Deserialize, Validate)]
pub struct PurchasePassRequest {
    #[validate(range(min = 1, message = "无效的通卡类型 ID"))]
    pub pass_type_id: i64,
}

/// 创建课程场次请求（管理侧）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassSessionRequest {
    #[validate(length(min = 1, max = 200, message = "标题长度必须在 1-200 之间"))]
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 1000, message = "容量必须在 1-1000 之间"))]
    pub capacity: i32,
    pub location: Option<String>,
    pub instructor: Option<String>,
}

/// 创建通卡类型请求（管理侧）
///
/// kind 以字符串收，非法值映射到 invalid_pass_kind 而不是 422
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePassTypeRequest {
    #[validate(length(min = 1, max = 100, message = "名称长度必须在 1-100 之间"))]
    pub name: String,
    pub kind: String,
    pub credits: Option<i32>,
    pub duration_days: i32,
}

/// 调整用户状态请求（管理侧）
#[derive(Debug, Deserialize)]
pub struct SetUserDisabledRequest {
    pub disabled: bool,
}

/// 调整用户角色请求（管理侧）
///
/// role 取值限定 member / admin，由 handler 校验
#[derive(Debug, Deserialize)]
pub struct SetUserRoleRequest {
    pub role: String,
}

/// 调整通卡点数请求（管理侧）
///
/// delta 与 set_to 二选一，都给或都不给由 handler 拒绝
#[derive(Debug, Deserialize)]
pub struct AdjustCreditsRequest {
    pub delta: Option<i32>,
    pub set_to: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "alice@example.com".into(),
            password: "long-enough-password".into(),
            name: "Alice".into(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..valid_clone(&valid)
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".into(),
            ..valid_clone(&valid)
        };
        assert!(short_password.validate().is_err());
    }

    fn valid_clone(req: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            email: req.email.clone(),
            password: req.password.clone(),
            name: req.name.clone(),
        }
    }

    #[test]
    fn test_book_request_rejects_non_positive_session() {
        let req = BookClassRequest {
            class_session_id: 0,
            user_pass_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_purchase_request_rejects_non_positive_type() {
        let req = PurchasePassRequest { pass_type_id: -1 };
        assert!(req.validate().is_err());
    }
}
