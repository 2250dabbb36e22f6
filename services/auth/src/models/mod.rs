//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{
    AuthResponse, LinkUpdate, LoginRequest, NewUser, PublicRegisterRequest, RegisterRequest,
    UpdateRoleRequest, User, UserResponse,
};
