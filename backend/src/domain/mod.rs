//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed booking entities (users, rooms,
//! reservations), the availability rules that keep a room from being booked
//! twice, and the services implementing the driving ports. Nothing here knows
//! about HTTP or SQL; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport agnostic failure payload.
//! - [`User`], [`Room`], [`Reservation`] and their validated value types.
//! - [`is_room_available`]: the overlap check over a reservation snapshot.
//! - `*Service` types implementing the driving ports.

pub mod auth;
pub mod availability;
pub mod date_bound;
pub mod error;
pub mod ids;
pub mod login_service;
pub mod ports;
pub mod reservation;
pub mod reservation_query_service;
pub mod reservation_service;
pub mod room;
pub mod room_service;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::auth::{AccessToken, LoginCredentials, LoginValidationError, Principal};
pub use self::availability::{first_conflict, is_room_available};
pub use self::date_bound::parse_start_bound;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{IdParseError, ReservationId, RoomId, UserId};
pub use self::login_service::{INVALID_CREDENTIALS_MESSAGE, PasswordLoginService};
pub use self::reservation::{
    InvalidTimeWindow, Reservation, ReservationStatus, TimeWindow, UnknownReservationStatus,
    sort_in_creation_order,
};
pub use self::reservation_query_service::ReservationQueryService;
pub use self::reservation_service::ReservationCommandService;
pub use self::room::{Capacity, Equipment, Room, RoomDraft, RoomName, RoomValidationError};
pub use self::room_service::RoomService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, Password, PasswordHash, PersonName, Role, StoredUser, User, UserUpdate,
    UserValidationError,
};
pub use self::user_account_service::{BootstrapAdmin, UserAccountService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use roombook::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
