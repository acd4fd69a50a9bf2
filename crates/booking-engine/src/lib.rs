//! 预约引擎
//!
//! 课程预约平台的事务核心：通卡（订阅/次卡）的购买与消耗、
//! 课程场次的容量控制、预约与取消的原子执行。
//!
//! ## 并发控制策略
//!
//! - SERIALIZABLE 隔离级别 + FOR UPDATE 行级锁：容量判断与预约插入
//!   表现为串行执行，不会超卖座位或透支次卡
//! - 序列化冲突（SQLSTATE 40001）整个事务从头重试一次，
//!   第二次冲突以内部错误上报，避免重试风暴
//! - 部分唯一索引约束兜底：同一用户对同一场次至多一条 booked 记录

pub mod conflict;
pub mod error;
pub mod models;
pub mod repository;
pub mod selector;
pub mod service;

pub use error::{BookingError, Result};
pub use models::{Booking, BookingStatus, ClassSession, PassKind, PassType, UserPass, UserPassStatus};
pub use service::{BookingService, CancellationService, PurchaseService, QueryService};
