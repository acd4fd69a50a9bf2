//! 预约平台共享基础设施
//!
//! 提供配置加载、数据库连接池和日志初始化，供各服务 crate 复用。

pub mod config;
pub mod database;
pub mod observability;

pub use config::AppConfig;
pub use database::Database;
