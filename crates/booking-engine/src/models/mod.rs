//! 预约引擎实体定义

pub mod booking;
pub mod class_session;
pub mod enums;
pub mod pass_type;
pub mod user_pass;

pub use booking::{Booking, BookingWithSession};
pub use class_session::{ClassSession, ClassSessionWithCount};
pub use enums::{BookingStatus, PassKind, UserPassStatus};
pub use pass_type::PassType;
pub use user_pass::{PassCandidate, UserPass, UserPassWithType};
