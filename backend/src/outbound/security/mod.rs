//! Credential adapters: password hashing, bearer token signing and failed
//! login throttling.

mod argon2_password_hasher;
mod jwt_token_service;
mod login_attempt_limiter;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_service::{JwtTokenService, MIN_SECRET_LEN, TokenConfigError};
pub use login_attempt_limiter::{
    DEFAULT_MAX_FAILURES, DEFAULT_WINDOW_MINUTES, InMemoryLoginAttemptLimiter,
    LoginThrottleConfigError, LoginThrottlePolicy,
};
