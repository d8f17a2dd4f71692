//! Port for issuing and verifying bearer access tokens.

use crate::domain::{AccessToken, Principal};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// The token could not be produced.
        Issue { message: String } => "access token could not be issued: {message}",
        /// The token is malformed, tampered with or carries unusable claims.
        Invalid { message: String } => "access token is invalid: {message}",
        /// The token is past its expiry.
        Expired => "access token has expired",
    }
}

/// Issue and verify signed access tokens carrying a [`Principal`].
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `principal`.
    fn issue(&self, principal: &Principal) -> Result<AccessToken, TokenError>;

    /// Verify `token` and recover the principal it was issued for.
    fn verify(&self, token: &str) -> Result<Principal, TokenError>;
}
