//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to exchange credentials for an access token
//! without knowing which hasher, token format or store sits behind it.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, User};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: AccessToken,
    pub user: User,
}

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue an access token.
    ///
    /// Unknown accounts and wrong passwords fail identically with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;
}
