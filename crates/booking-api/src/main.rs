//! 预约平台 API 服务
//!
//! 提供会员预约、通卡购买和运营管理的 REST API。

use std::time::Duration;

use axum::{Json, Router, http::HeaderValue, middleware, routing::get};
use booking_api::{auth::JwtConfig, middleware::auth_middleware, routes, state::AppState};
use studio_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("booking-api").unwrap_or_default();
    observability::init(&config.observability)?;

    info!("Starting booking-api on {}", config.server_addr());

    let db = Database::connect(&config.database).await?;

    // 启动时执行数据库迁移，保证 schema 与代码一致
    sqlx::migrate!("../../migrations").run(db.pool()).await?;
    info!("Database migrations applied");

    // JWT 密钥：生产环境必须通过环境变量注入，开发环境使用默认值
    let jwt_secret = std::env::var("STUDIO_JWT_SECRET").unwrap_or_else(|_| {
        if config.is_production() {
            panic!("STUDIO_JWT_SECRET must be set in production environment");
        }
        warn!("Using default JWT secret - set STUDIO_JWT_SECRET for production");
        JwtConfig::default().secret
    });

    let jwt_expires = std::env::var("STUDIO_JWT_EXPIRES_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or_else(|| JwtConfig::default().expires_in_secs);

    let jwt_config = JwtConfig {
        secret: jwt_secret,
        expires_in_secs: jwt_expires,
        ..JwtConfig::default()
    };

    let state = AppState::new(db.pool().clone(), jwt_config);

    // CORS 配置：通过 STUDIO_CORS_ORIGINS 环境变量控制允许的来源
    let allowed_origins = std::env::var("STUDIO_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("STUDIO_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .nest("/api", routes::member_routes())
        .nest("/api/admin", routes::admin_routes())
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db;
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(cors)
        // 认证中间件：验证 JWT Token，管理路由额外要求 admin 角色
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM（K8s 停止 Pod）或 Ctrl+C 时，
    // 停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "booking-api"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "booking-api",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
