//! Driving port for booking and cancelling reservations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, Principal, Reservation, ReservationId, RoomId, UserId};

/// Book `room_id` over `[start, end)` for the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReservationRequest {
    pub requester: Option<UserId>,
    pub room_id: RoomId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Cancel (delete) a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReservationRequest {
    pub requester: Option<Principal>,
    pub reservation_id: ReservationId,
}

/// Reservation mutations.
#[async_trait]
pub trait ReservationCommand: Send + Sync {
    /// Create a confirmed reservation if the room is free.
    async fn create(&self, request: CreateReservationRequest) -> Result<Reservation, Error>;

    /// Delete a reservation owned by the requester (or any, for admins).
    async fn cancel(&self, request: CancelReservationRequest) -> Result<(), Error>;
}
