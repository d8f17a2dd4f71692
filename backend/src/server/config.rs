//! HTTP server configuration object and helpers.

use std::fmt;
use std::net::SocketAddr;

use roombook::outbound::persistence::DbPool;
use roombook::outbound::security::LoginThrottlePolicy;
use zeroize::Zeroizing;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: chrono::Duration,
    pub(crate) login_throttle: LoginThrottlePolicy,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        db_pool: DbPool,
        jwt_secret: &[u8],
        token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            bind_addr,
            db_pool,
            jwt_secret: Zeroizing::new(jwt_secret.to_vec()),
            token_ttl,
            login_throttle: LoginThrottlePolicy::default(),
        }
    }

    /// Replace the default failed-login throttling policy.
    #[must_use]
    pub fn with_login_throttle(mut self, policy: LoginThrottlePolicy) -> Self {
        self.login_throttle = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by the server bootstrap tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("login_throttle", &self.login_throttle)
            .finish_non_exhaustive()
    }
}
