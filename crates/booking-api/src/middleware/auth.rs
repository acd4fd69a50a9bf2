//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token 并将用户信息注入请求扩展

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::state::AppState;

/// 认证中间件
///
/// 从 Authorization header 中提取 Bearer Token，验证后将 Claims
/// 注入请求扩展。公开路由跳过验证；/api/admin 下的路由额外要求
/// admin 角色。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    if is_public(&method, &path) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return unauthorized_response("缺少认证 Token"),
    };

    match state.jwt_manager.verify_token(token) {
        Ok(claims) => {
            if path.starts_with("/api/admin") && !claims.is_admin() {
                return forbidden_response("需要管理员权限");
            }
            // 将 Claims 注入请求扩展，供后续处理器使用
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => unauthorized_response(&e.to_string()),
    }
}

/// 公开路由判定
///
/// 课表和售卖目录对未登录用户只读开放
fn is_public(method: &Method, path: &str) -> bool {
    if path == "/health" || path == "/ready" || path.starts_with("/api/auth/") {
        return true;
    }
    *method == Method::GET && (path == "/api/classes" || path == "/api/pass-types")
}

/// 生成 401 未授权响应
fn unauthorized_response(message: &str) -> Response {
    error_response(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// 生成 403 禁止访问响应
fn forbidden_response(message: &str) -> Response {
    error_response(StatusCode::FORBIDDEN, "forbidden", message)
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": code,
        "message": message,
        "data": null
    });
    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::GET, "/ready"));
        assert!(is_public(&Method::POST, "/api/auth/login"));
        assert!(is_public(&Method::POST, "/api/auth/register"));
        assert!(is_public(&Method::GET, "/api/classes"));
        assert!(is_public(&Method::GET, "/api/pass-types"));
    }

    #[test]
    fn test_protected_paths() {
        // 同路径的写操作需要认证
        assert!(!is_public(&Method::POST, "/api/classes"));
        assert!(!is_public(&Method::POST, "/api/bookings"));
        assert!(!is_public(&Method::GET, "/api/me/passes"));
        assert!(!is_public(&Method::GET, "/api/admin/users"));
    }
}
