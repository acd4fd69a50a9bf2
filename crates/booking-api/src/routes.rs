//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{handlers, state::AppState};

/// 会员侧路由（/api 前缀下挂载）
pub fn member_routes() -> Router<AppState> {
    Router::new()
        // 认证
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::get_current_user))
        // 课表与售卖目录
        .route("/classes", get(handlers::classes::list_classes))
        .route("/pass-types", get(handlers::passes::list_pass_types))
        // 通卡购买与查询
        .route("/passes", post(handlers::passes::purchase_pass))
        .route("/me/passes", get(handlers::passes::my_passes))
        .route("/me/current-pass", get(handlers::passes::current_pass))
        // 预约
        .route("/bookings", post(handlers::bookings::book_class))
        .route(
            "/bookings/{id}/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route("/me/bookings", get(handlers::bookings::my_bookings))
}

/// 管理侧路由（/api/admin 前缀下挂载，中间件保证 admin 角色）
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // 用户管理
        .route("/users", get(handlers::admin::list_users))
        .route(
            "/users/{id}/disabled",
            patch(handlers::admin::set_user_disabled),
        )
        .route("/users/{id}/role", patch(handlers::admin::set_user_role))
        .route("/users/{id}/passes", get(handlers::admin::list_user_passes))
        // 课程场次管理
        .route(
            "/classes",
            get(handlers::admin::list_class_sessions).post(handlers::admin::create_class_session),
        )
        // 通卡目录管理
        .route(
            "/pass-types",
            get(handlers::admin::list_pass_types).post(handlers::admin::create_pass_type),
        )
        // 已签发通卡管理
        .route(
            "/passes/{id}/credits",
            patch(handlers::admin::adjust_pass_credits),
        )
        .route("/passes/{id}/cancel", post(handlers::admin::cancel_pass))
}
