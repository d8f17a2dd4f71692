//! Builders wiring Diesel repositories into the domain services behind
//! [`HttpState`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use roombook::domain::ports::{LoginAttemptLimiter, PasswordHasher, TokenService};
use roombook::domain::{
    PasswordLoginService, ReservationCommandService, ReservationQueryService, RoomService,
    UserAccountService,
};
use roombook::inbound::http::state::{HttpState, HttpStatePorts};
use roombook::outbound::persistence::{
    DieselReservationRepository, DieselRoomRepository, DieselUserRepository,
};
use roombook::outbound::security::{
    Argon2PasswordHasher, InMemoryLoginAttemptLimiter, JwtTokenService, TokenConfigError,
};

use super::ServerConfig;

/// Account service over the Diesel user repository, shared by the HTTP
/// state and startup provisioning.
pub(crate) type AccountService = UserAccountService<DieselUserRepository>;

/// Services assembled for one server instance.
pub(crate) struct AppServices {
    pub(crate) http_state: HttpState,
    pub(crate) accounts: Arc<AccountService>,
}

/// Wire every port implementation from the configured pool.
///
/// # Errors
/// Returns [`TokenConfigError`] when the signing secret or token lifetime is
/// rejected.
pub(crate) fn build_services(config: &ServerConfig) -> Result<AppServices, TokenConfigError> {
    let pool = &config.db_pool;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
        &config.jwt_secret,
        config.token_ttl,
        clock.clone(),
    )?);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let limiter: Arc<dyn LoginAttemptLimiter> = Arc::new(InMemoryLoginAttemptLimiter::new(
        config.login_throttle,
        clock.clone(),
    ));

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let rooms = Arc::new(DieselRoomRepository::new(pool.clone()));
    let reservations = Arc::new(DieselReservationRepository::new(pool.clone()));

    let accounts = Arc::new(UserAccountService::new(
        users.clone(),
        hasher.clone(),
        clock.clone(),
    ));
    let room_service = Arc::new(RoomService::new(
        rooms.clone(),
        reservations.clone(),
        clock.clone(),
    ));

    let http_state = HttpState::new(HttpStatePorts {
        login: Arc::new(PasswordLoginService::new(
            users,
            hasher,
            tokens.clone(),
            limiter,
        )),
        tokens,
        accounts: accounts.clone(),
        accounts_query: accounts.clone(),
        rooms: room_service.clone(),
        rooms_query: room_service,
        reservations: Arc::new(ReservationCommandService::new(
            rooms,
            reservations.clone(),
            clock,
        )),
        reservations_query: Arc::new(ReservationQueryService::new(reservations)),
    });

    Ok(AppServices {
        http_state,
        accounts,
    })
}

#[cfg(test)]
mod tests {
    //! Wiring coverage that needs no running database.

    use super::*;
    use roombook::outbound::persistence::{DbPool, PoolConfig};
    use roombook::outbound::security::MIN_SECRET_LEN;
    use rstest::rstest;

    async fn lazy_pool() -> DbPool {
        DbPool::new(PoolConfig::new("postgres://roombook@127.0.0.1:1/roombook").with_min_idle(None))
            .await
            .expect("lazy pool builds without connecting")
    }

    fn config(pool: DbPool, secret: &[u8]) -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket address"),
            pool,
            secret,
            chrono::Duration::hours(1),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn services_issue_verifiable_tokens() {
        let config = config(lazy_pool().await, &[7_u8; MIN_SECRET_LEN]);
        let services = build_services(&config).expect("valid token settings");
        let principal = roombook::domain::Principal {
            user_id: roombook::domain::UserId::random(),
            role: roombook::domain::Role::User,
        };

        let token = services
            .http_state
            .tokens
            .issue(&principal)
            .expect("token issued");

        assert_eq!(
            services.http_state.tokens.verify(token.as_str()),
            Ok(principal)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn short_secret_is_rejected() {
        let config = config(lazy_pool().await, b"short");

        assert!(matches!(
            build_services(&config),
            Err(TokenConfigError::SecretTooShort { .. })
        ));
    }
}
