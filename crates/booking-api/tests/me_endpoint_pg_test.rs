//! 当前用户端点数据库集成测试
//!
//! 需要真实 PostgreSQL，通过 TEST_DATABASE_URL 指定连接串后
//! `cargo test -- --ignored` 运行。走完整路由栈（中间件 + 处理器）。

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
};
use booking_api::{auth::JwtConfig, middleware::auth_middleware, routes, state::AppState};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

async fn test_app() -> (Router, PgPool) {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests");
    let pool = PgPool::connect(&url).await.expect("connect test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let state = AppState::new(pool.clone(), JwtConfig::default());
    let app = Router::new()
        .nest("/api", routes::member_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    (app, pool)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 注册新账号，返回 (email, token)
async fn register(app: &Router, tag: &str) -> (String, String) {
    let email = format!(
        "{}-{}@test.local",
        tag,
        chrono::Utc::now().timestamp_nanos_opt().unwrap()
    );
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"email":"{email}","password":"secret-pass-1","name":"Test Member"}}"#
                )))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (email, token)
}

async fn disable_user(pool: &PgPool, email: &str) {
    sqlx::query("UPDATE users SET disabled = TRUE WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore]
async fn test_me_returns_current_user() {
    let (app, _pool) = test_app().await;
    let (email, token) = register(&app, "me-ok").await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], email);
}

#[tokio::test]
#[ignore]
async fn test_disabled_user_rejected_on_me() {
    let (app, pool) = test_app().await;
    let (email, token) = register(&app, "me-disabled").await;

    // Token 还在有效期内，但账号已被停用
    disable_user(&pool, &email).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "user_disabled");
}

#[tokio::test]
#[ignore]
async fn test_disabled_user_cannot_login() {
    let (app, pool) = test_app().await;
    let (email, _token) = register(&app, "login-disabled").await;
    disable_user(&pool, &email).await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(
                    r#"{{"email":"{email}","password":"secret-pass-1"}}"#
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], "user_disabled");
}
