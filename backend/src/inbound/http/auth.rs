//! Bearer-token authentication for HTTP handlers.
//!
//! [`AuthContext`] is extracted from every request. A missing, malformed,
//! expired or forged token simply yields no identity; handlers then decide
//! whether an identity is required (`require_user`) or an administrator
//! (`require_admin`).

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::{debug, error};

use crate::domain::{Error, Principal, UserId};

use super::error::INTERNAL_ERROR_MESSAGE;
use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller identity established from the `Authorization` header, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    principal: Option<Principal>,
}

impl AuthContext {
    /// Context for a verified principal.
    pub const fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// Context without an identity.
    pub const fn anonymous() -> Self {
        Self { principal: None }
    }

    /// The verified principal, if any.
    pub const fn principal(&self) -> Option<Principal> {
        self.principal
    }

    /// The caller's user id, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.principal.map(|principal| principal.user_id)
    }

    /// Require an identity or fail with the "no user" error (400).
    pub fn require_user(&self) -> Result<Principal, Error> {
        self.principal.ok_or_else(Error::no_user)
    }

    /// Require an administrator. Anonymous callers get the "no user" error,
    /// authenticated non-admins get 403.
    pub fn require_admin(&self) -> Result<Principal, Error> {
        let principal = self.require_user()?;
        if principal.role.is_admin() {
            Ok(principal)
        } else {
            Err(Error::admin_only())
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

fn extract(req: &HttpRequest) -> Result<AuthContext, Error> {
    let Some(token) = bearer_token(req) else {
        return Ok(AuthContext::anonymous());
    };
    let Some(state) = req.app_data::<web::Data<HttpState>>() else {
        error!("HttpState missing from app data; cannot verify bearer token");
        return Err(Error::internal(INTERNAL_ERROR_MESSAGE));
    };

    match state.tokens.verify(token) {
        Ok(principal) => Ok(AuthContext::authenticated(principal)),
        Err(err) => {
            debug!(error = %err, "ignoring unusable bearer token");
            Ok(AuthContext::anonymous())
        }
    }
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
