//! 仓储层
//!
//! 所有写路径都有 `*_in_tx` 变体，接收 `&mut PgConnection` 在
//! 调用方的事务内执行；池方法只服务读路径。

mod booking_repo;
mod class_session_repo;
mod pass_type_repo;
mod user_pass_repo;

pub use booking_repo::BookingRepository;
pub use class_session_repo::ClassSessionRepository;
pub use pass_type_repo::PassTypeRepository;
pub use user_pass_repo::UserPassRepository;
