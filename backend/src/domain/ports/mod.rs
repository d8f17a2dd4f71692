//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, password hasher, token service, login
//! attempt limiter) are implemented by outbound adapters. Driving ports (login, accounts, rooms,
//! reservations) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod login_attempt_limiter;
mod login_service;
mod password_hasher;
mod reservation_command;
mod reservation_query;
mod reservation_repository;
mod room_catalogue;
mod room_repository;
mod token_service;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use login_attempt_limiter::MockLoginAttemptLimiter;
pub use login_attempt_limiter::LoginAttemptLimiter;
pub use login_service::{LoginOutcome, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use reservation_command::{
    CancelReservationRequest, CreateReservationRequest, ReservationCommand,
};
pub use reservation_query::{
    ListReservationsFromRequest, ListRoomReservationsRequest, ListUserReservationsRequest,
    ReservationQuery,
};
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::{
    ROOM_REFERENCE, ReservationRepository, ReservationRepositoryError, USER_REFERENCE,
};
pub use room_catalogue::{RoomAvailability, RoomCommand, RoomQuery};
#[cfg(test)]
pub use room_repository::MockRoomRepository;
pub use room_repository::{RoomRepository, RoomRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
pub use user_accounts::{
    DeleteUserRequest, RegisterUserRequest, UpdateProfileRequest, UserAccountCommand,
    UserAccountQuery,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
