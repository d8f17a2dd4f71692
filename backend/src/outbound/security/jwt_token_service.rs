//! HS256 JSON Web Tokens implementing the `TokenService` port.
//!
//! Tokens carry the user id in `sub` and the account role in `role`. Expiry
//! is checked against the injected clock rather than the system time, so
//! `iat` and `exp` always agree with the clock that issued them.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AccessToken, Principal, UserId};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Rejected token service configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenConfigError {
    /// The signing secret is too short for HS256.
    #[error("JWT secret must be at least {min} bytes long")]
    SecretTooShort { min: usize },
    /// The token lifetime is zero or negative.
    #[error("token lifetime must be positive")]
    NonPositiveTtl,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a token service signing with `secret`. Tokens stay valid for
    /// `ttl` after issue.
    ///
    /// # Errors
    ///
    /// Returns [`TokenConfigError`] for a secret shorter than
    /// [`MIN_SECRET_LEN`] bytes or a non-positive lifetime.
    pub fn new(
        secret: &[u8],
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
            });
        }
        if ttl <= Duration::zero() {
            return Err(TokenConfigError::NonPositiveTtl);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, principal: &Principal) -> Result<AccessToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: principal.user_id.to_string(),
            role: principal.role.as_str().to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::issue(err.to_string()))?;
        Ok(AccessToken::new(token, expires_at))
    }

    fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &Self::validation())
            .map_err(|err| TokenError::invalid(err.to_string()))?
            .claims;

        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        let user_id =
            UserId::new(&claims.sub).map_err(|err| TokenError::invalid(err.to_string()))?;
        let role = claims
            .role
            .parse()
            .map_err(|err: crate::domain::UserValidationError| {
                TokenError::invalid(err.to_string())
            })?;
        Ok(Principal { user_id, role })
    }
}
