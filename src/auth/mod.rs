pub mod error;
pub mod middleware;
pub mod service;
pub mod types;

pub use error::AuthError;
pub use middleware::require_auth;
pub use service::Auth;
pub use types::{AuthSession, AuthUser, Claims, LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile};
