//! 预约平台 REST API（C端会员 + B端管理）
//!
//! 认证、查询和管理接口的 HTTP 层，事务型操作全部委托给
//! booking-engine。

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;
