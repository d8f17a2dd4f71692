//! Booking and cancelling reservations.
//!
//! Creation runs the availability check against the room's current
//! reservations first, then asks the repository for an atomic
//! check-and-insert. Both a failed check and a storage-level overlap surface
//! as the same conflict.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    CancelReservationRequest, CreateReservationRequest, ReservationCommand,
    ReservationRepository, ReservationRepositoryError, RoomRepository,
};
use crate::domain::room_service::{ROOM_NOT_FOUND_MESSAGE, map_reservation_error, map_room_error};
use crate::domain::{Error, Reservation, TimeWindow, first_conflict};

/// Message returned when the reservation to cancel does not exist.
pub const RESERVATION_NOT_FOUND_MESSAGE: &str = "Réservation introuvable";
/// Message returned when a user tries to cancel someone else's reservation.
pub const NOT_OWNER_MESSAGE: &str = "Vous ne pouvez annuler que vos propres réservations";

/// Service implementing [`ReservationCommand`].
#[derive(Clone)]
pub struct ReservationCommandService<R, B> {
    rooms: Arc<R>,
    reservations: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<R, B> ReservationCommandService<R, B> {
    /// Create the command service over room and reservation repositories.
    pub fn new(rooms: Arc<R>, reservations: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms,
            reservations,
            clock,
        }
    }
}

#[async_trait]
impl<R, B> ReservationCommand for ReservationCommandService<R, B>
where
    R: RoomRepository,
    B: ReservationRepository,
{
    async fn create(&self, request: CreateReservationRequest) -> Result<Reservation, Error> {
        let user_id = request.requester.ok_or_else(Error::no_user)?;
        let window =
            TimeWindow::new(request.start, request.end).map_err(|_| Error::invalid_window())?;

        let room = self
            .rooms
            .find_by_id(&request.room_id)
            .await
            .map_err(map_room_error)?
            .ok_or_else(|| Error::not_found(ROOM_NOT_FOUND_MESSAGE))?;

        let existing = self
            .reservations
            .list_for_room(&room.id)
            .await
            .map_err(map_reservation_error)?;
        if let Some(conflict) = first_conflict(&room.id, &window, &existing) {
            warn!(
                room_id = %room.id,
                conflicting = %conflict.id,
                "reservation rejected: room already booked"
            );
            return Err(Error::room_unavailable());
        }

        let reservation = Reservation::confirmed(room.id, user_id, window, self.clock.utc());
        self.reservations
            .insert_if_available(&reservation)
            .await
            .map_err(|err| {
                if matches!(err, ReservationRepositoryError::Overlap) {
                    warn!(room_id = %room.id, "reservation rejected by storage overlap check");
                }
                map_reservation_error(err)
            })?;

        info!(
            reservation_id = %reservation.id,
            room_id = %reservation.room_id,
            user_id = %reservation.user_id,
            "reservation created"
        );
        Ok(reservation)
    }

    async fn cancel(&self, request: CancelReservationRequest) -> Result<(), Error> {
        let requester = request.requester.ok_or_else(Error::no_user)?;
        let reservation = self
            .reservations
            .find_by_id(&request.reservation_id)
            .await
            .map_err(map_reservation_error)?
            .ok_or_else(|| Error::not_found(RESERVATION_NOT_FOUND_MESSAGE))?;
        if !requester.can_act_for(&reservation.user_id) {
            return Err(Error::forbidden(NOT_OWNER_MESSAGE));
        }

        let deleted = self
            .reservations
            .delete(&reservation.id)
            .await
            .map_err(map_reservation_error)?;
        if !deleted {
            return Err(Error::not_found(RESERVATION_NOT_FOUND_MESSAGE));
        }
        info!(
            reservation_id = %reservation.id,
            cancelled_by = %requester.user_id,
            "reservation cancelled"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "reservation_service_tests.rs"]
mod tests;
