//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, ReservationCommand, ReservationQuery, RoomCommand, RoomQuery, TokenService,
    UserAccountCommand, UserAccountQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenService>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub accounts_query: Arc<dyn UserAccountQuery>,
    pub rooms: Arc<dyn RoomCommand>,
    pub rooms_query: Arc<dyn RoomQuery>,
    pub reservations: Arc<dyn ReservationCommand>,
    pub reservations_query: Arc<dyn ReservationQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    /// Verifies bearer tokens for the authentication extractor.
    pub tokens: Arc<dyn TokenService>,
    pub accounts: Arc<dyn UserAccountCommand>,
    pub accounts_query: Arc<dyn UserAccountQuery>,
    pub rooms: Arc<dyn RoomCommand>,
    pub rooms_query: Arc<dyn RoomQuery>,
    pub reservations: Arc<dyn ReservationCommand>,
    pub reservations_query: Arc<dyn ReservationQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            tokens,
            accounts,
            accounts_query,
            rooms,
            rooms_query,
            reservations,
            reservations_query,
        } = ports;
        Self {
            login,
            tokens,
            accounts,
            accounts_query,
            rooms,
            rooms_query,
            reservations,
            reservations_query,
        }
    }
}
