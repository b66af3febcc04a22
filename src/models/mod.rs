pub mod user;

pub use user::{LoginRequest, LoginResponse, UserRole, VerifiedUser};
