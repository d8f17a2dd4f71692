//! Credential login backed by the user repository, a password hasher and a
//! token issuer.
//!
//! Failed attempts are counted per normalised e-mail. Once the limiter locks
//! an address, logins for it answer 429 before any lookup or hash check runs.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    LoginAttemptLimiter, LoginOutcome, LoginService, PasswordHasher, TokenService,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Email, Error, LoginCredentials, Principal};

/// Message returned for unknown accounts and wrong passwords alike.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Identifiants invalides";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateEmail { email: message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized(INVALID_CREDENTIALS_MESSAGE)
}

/// [`LoginService`] checking e-mail and password against stored accounts.
#[derive(Clone)]
pub struct PasswordLoginService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    limiter: Arc<dyn LoginAttemptLimiter>,
}

impl<U> PasswordLoginService<U> {
    /// Create a login service over a user repository.
    pub fn new(
        users: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        limiter: Arc<dyn LoginAttemptLimiter>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            limiter,
        }
    }

    fn rejected(&self, key: &str) -> Error {
        self.limiter.record_failure(key);
        invalid_credentials()
    }
}

#[async_trait]
impl<U> LoginService for PasswordLoginService<U>
where
    U: UserRepository,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let key = credentials.email();
        if let Some(wait) = self.limiter.locked_for(key) {
            warn!("login throttled after repeated failures");
            let seconds = u64::try_from(wait.num_seconds()).unwrap_or(0).max(1);
            return Err(Error::too_many_attempts(seconds));
        }

        // A malformed address cannot belong to anyone; answer like an unknown account.
        let Ok(email) = Email::new(key) else {
            warn!("login rejected: malformed e-mail");
            return Err(self.rejected(key));
        };

        let Some(stored) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
        else {
            warn!("login rejected: unknown account");
            return Err(self.rejected(key));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(|err| {
                error!(user_id = %stored.user.id, "stored password hash unusable: {err}");
                Error::internal(format!("password verification failed: {err}"))
            })?;
        if !matches {
            warn!(user_id = %stored.user.id, "login rejected: wrong password");
            return Err(self.rejected(key));
        }
        self.limiter.reset(key);

        let principal = Principal {
            user_id: stored.user.id,
            role: stored.user.role,
        };
        let token = self
            .tokens
            .issue(&principal)
            .map_err(|err| Error::internal(format!("token issue failed: {err}")))?;

        info!(user_id = %stored.user.id, "user logged in");
        Ok(LoginOutcome {
            token,
            user: stored.user,
        })
    }
}
