//! Port abstraction for reservation persistence.
//!
//! Every list method returns reservations in creation order (`created_at`,
//! then id).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Reservation, ReservationId, RoomId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by reservation repository adapters.
    pub enum ReservationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reservation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "reservation repository query failed: {message}",
        /// A confirmed reservation already occupies part of the window.
        Overlap => "reservation overlaps an existing confirmed reservation",
        /// The referenced room or user no longer exists. `message` names the
        /// violated foreign key.
        MissingReference { message: String } =>
            "reservation references a missing row: {message}",
    }
}

/// Foreign key tying a reservation to its room.
pub const ROOM_REFERENCE: &str = "reservations_room_id_fkey";
/// Foreign key tying a reservation to the user who made it.
pub const USER_REFERENCE: &str = "reservations_user_id_fkey";

/// Storage of reservations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert `reservation` unless a confirmed reservation for the same room
    /// overlaps its window. The check and the insert are atomic.
    async fn insert_if_available(
        &self,
        reservation: &Reservation,
    ) -> Result<(), ReservationRepositoryError>;

    /// Fetch a reservation by identifier.
    async fn find_by_id(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// Every reservation in storage.
    async fn list_all(&self) -> Result<Vec<Reservation>, ReservationRepositoryError>;

    /// Reservations made by `user_id`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError>;

    /// Reservations made by `user_id` whose start is at or after `from`.
    async fn list_for_user_starting_from(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError>;

    /// Reservations for `room_id`.
    async fn list_for_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError>;

    /// Delete a reservation. Returns whether a row was removed.
    async fn delete(&self, id: &ReservationId) -> Result<bool, ReservationRepositoryError>;
}
