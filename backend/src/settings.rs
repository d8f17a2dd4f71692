//! Server settings loaded via OrthoConfig.
//!
//! Values come from `ROOMBOOK_*` environment variables, command-line flags
//! or a configuration file. Secrets are redacted from the `Debug` output.

use std::fmt;
use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{BootstrapAdmin, Email, Password, PersonName};
use crate::outbound::security::LoginThrottlePolicy;

/// Address the server binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// Token lifetime when none is configured: one day.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;
/// Connection pool size when none is configured.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ADMIN_NAME: &str = "Administrateur";

/// Settings that cannot be turned into a running server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("{name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Runtime configuration for the HTTP server.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROOMBOOK")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Lifetime of issued bearer tokens, in minutes.
    #[ortho_config(default = 1440)]
    pub token_ttl_minutes: i64,
    /// Maximum number of pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Failed logins tolerated per e-mail before it is locked out.
    #[ortho_config(default = 5)]
    pub login_max_failures: u32,
    /// Sliding window over which failed logins are counted, in minutes.
    #[ortho_config(default = 15)]
    pub login_window_minutes: i64,
    /// E-mail of the administrator created at startup when absent.
    pub bootstrap_admin_email: Option<String>,
    /// Display name of the bootstrap administrator.
    pub bootstrap_admin_name: Option<String>,
    /// Password of the bootstrap administrator.
    pub bootstrap_admin_password: Option<String>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AppSettings")
            .field("database_url", &redact(&self.database_url))
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("db_max_connections", &self.db_max_connections)
            .field("login_max_failures", &self.login_max_failures)
            .field("login_window_minutes", &self.login_window_minutes)
            .field("bootstrap_admin_email", &self.bootstrap_admin_email)
            .field("bootstrap_admin_name", &self.bootstrap_admin_name)
            .field(
                "bootstrap_admin_password",
                &redact(&self.bootstrap_admin_password),
            )
            .finish()
    }
}

impl AppSettings {
    /// The database URL.
    ///
    /// # Errors
    /// [`SettingsError::Missing`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        required(self.database_url.as_deref(), "ROOMBOOK_DATABASE_URL")
    }

    /// The signing secret as bytes.
    ///
    /// # Errors
    /// [`SettingsError::Missing`] when unset or blank.
    pub fn jwt_secret(&self) -> Result<&[u8], SettingsError> {
        required(self.jwt_secret.as_deref(), "ROOMBOOK_JWT_SECRET").map(str::as_bytes)
    }

    /// The parsed bind address, falling back to [`DEFAULT_BIND_ADDR`].
    ///
    /// # Errors
    /// [`SettingsError::Invalid`] when the value is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::Invalid {
                name: "ROOMBOOK_BIND_ADDR",
                message: err.to_string(),
            })
    }

    /// Token lifetime as a duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }

    /// Failed-login throttling policy.
    ///
    /// # Errors
    /// [`SettingsError::Invalid`] when no failure is allowed or the window is
    /// not positive.
    pub fn login_throttle(&self) -> Result<LoginThrottlePolicy, SettingsError> {
        LoginThrottlePolicy::new(
            self.login_max_failures,
            chrono::Duration::minutes(self.login_window_minutes),
        )
        .map_err(|err| SettingsError::Invalid {
            name: "ROOMBOOK_LOGIN_MAX_FAILURES/ROOMBOOK_LOGIN_WINDOW_MINUTES",
            message: err.to_string(),
        })
    }

    /// The administrator to provision at startup, if configured.
    ///
    /// Both e-mail and password must be present; the name defaults to
    /// "Administrateur".
    ///
    /// # Errors
    /// [`SettingsError::Missing`] when only one of e-mail and password is
    /// set, [`SettingsError::Invalid`] when a value fails validation.
    pub fn bootstrap_admin(&self) -> Result<Option<BootstrapAdmin>, SettingsError> {
        let email = self.bootstrap_admin_email.as_deref();
        let password = self.bootstrap_admin_password.as_deref();
        let (email, password) = match (email, password) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(SettingsError::Missing {
                    name: "ROOMBOOK_BOOTSTRAP_ADMIN_PASSWORD",
                });
            }
            (None, Some(_)) => {
                return Err(SettingsError::Missing {
                    name: "ROOMBOOK_BOOTSTRAP_ADMIN_EMAIL",
                });
            }
            (Some(email), Some(password)) => (email, password),
        };
        let invalid = |name: &'static str| {
            move |err: crate::domain::UserValidationError| SettingsError::Invalid {
                name,
                message: err.to_string(),
            }
        };

        Ok(Some(BootstrapAdmin {
            email: Email::new(email).map_err(invalid("ROOMBOOK_BOOTSTRAP_ADMIN_EMAIL"))?,
            name: PersonName::new(
                self.bootstrap_admin_name
                    .as_deref()
                    .unwrap_or(DEFAULT_ADMIN_NAME),
            )
            .map_err(invalid("ROOMBOOK_BOOTSTRAP_ADMIN_NAME"))?,
            password: Password::new(password)
                .map_err(invalid("ROOMBOOK_BOOTSTRAP_ADMIN_PASSWORD"))?,
        }))
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, SettingsError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(SettingsError::Missing { name })
}
