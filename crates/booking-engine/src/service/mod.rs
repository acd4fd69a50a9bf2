//! 服务层
//!
//! 每个事务型操作一个服务。服务负责事务编排：开启 SERIALIZABLE
//! 事务、按固定顺序加锁、调用仓储与选卡器、提交或回滚，并在
//! 序列化冲突时整体重试一次。

mod booking_service;
mod cancellation_service;
mod purchase_service;
mod query_service;

pub use booking_service::BookingService;
pub use cancellation_service::CancellationService;
pub use purchase_service::PurchaseService;
pub use query_service::QueryService;
