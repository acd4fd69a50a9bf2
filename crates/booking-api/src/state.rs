//! 应用状态定义
//!
//! Axum 路由共享的应用状态

use std::sync::Arc;

use booking_engine::{BookingService, CancellationService, PurchaseService, QueryService};
use sqlx::PgPool;

use crate::auth::{JwtConfig, JwtManager};

/// Axum 应用共享状态
///
/// 事务型服务各自持有连接池，通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池（认证查库与管理接口直接使用）
    pub pool: PgPool,
    /// JWT 管理器
    pub jwt_manager: JwtManager,
    /// 预约服务
    pub booking_service: Arc<BookingService>,
    /// 取消服务
    pub cancellation_service: Arc<CancellationService>,
    /// 购买服务
    pub purchase_service: Arc<PurchaseService>,
    /// 查询服务
    pub query_service: Arc<QueryService>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, jwt_config: JwtConfig) -> Self {
        Self {
            jwt_manager: JwtManager::new(jwt_config),
            booking_service: Arc::new(BookingService::new(pool.clone())),
            cancellation_service: Arc::new(CancellationService::new(pool.clone())),
            purchase_service: Arc::new(PurchaseService::new(pool.clone())),
            query_service: Arc::new(QueryService::new(pool.clone())),
            pool,
        }
    }
}
