//! 请求与响应 DTO

pub mod request;
pub mod response;

pub use request::{
    AdjustCreditsRequest, BookClassRequest, CreateClassSessionRequest, CreatePassTypeRequest,
    LoginRequest, PurchasePassRequest, RegisterRequest, SetUserDisabledRequest, SetUserRoleRequest,
};
pub use response::{ApiResponse, AuthResponse, UserDto};
