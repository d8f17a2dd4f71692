//! Driving port for reservation read models.
//!
//! Requests carry the raw caller identity and parameters as received, so the
//! domain decides what "missing user", "missing room" or "bad date" means and
//! every adapter reports them the same way.

use async_trait::async_trait;

use crate::domain::{Error, Reservation, RoomId, UserId};

/// List the caller's reservations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListUserReservationsRequest {
    pub requester: Option<UserId>,
}

/// List the caller's reservations starting on or after `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReservationsFromRequest {
    pub requester: Option<UserId>,
    /// Unparsed date as sent by the client.
    pub date: String,
}

/// List the reservations of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRoomReservationsRequest {
    pub room_id: Option<RoomId>,
}

/// Reservation queries. Every list is in creation order and may be empty.
///
/// # Examples
/// ```no_run
/// use roombook::domain::ports::{ListUserReservationsRequest, ReservationQuery};
/// use roombook::domain::UserId;
///
/// async fn mine(port: &dyn ReservationQuery, me: UserId) {
///     let reservations = port
///         .list_for_user(ListUserReservationsRequest { requester: Some(me) })
///         .await
///         .expect("query succeeds");
///     assert!(reservations.iter().all(|r| r.user_id == me));
/// }
/// ```
#[async_trait]
pub trait ReservationQuery: Send + Sync {
    /// Reservations owned by the requester.
    async fn list_for_user(
        &self,
        request: ListUserReservationsRequest,
    ) -> Result<Vec<Reservation>, Error>;

    /// Requester's reservations with `start_time >= date`.
    async fn list_starting_from(
        &self,
        request: ListReservationsFromRequest,
    ) -> Result<Vec<Reservation>, Error>;

    /// Reservations for a room.
    async fn list_for_room(
        &self,
        request: ListRoomReservationsRequest,
    ) -> Result<Vec<Reservation>, Error>;

    /// Every reservation in storage.
    async fn list_all(&self) -> Result<Vec<Reservation>, Error>;
}
