//! Room catalogue services: admin mutations, reads and availability.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    ReservationRepository, ReservationRepositoryError, RoomAvailability, RoomCommand, RoomQuery,
    RoomRepository, RoomRepositoryError, USER_REFERENCE,
};
use crate::domain::{Error, Room, RoomDraft, RoomId, TimeWindow, is_room_available};

/// Message returned when a room lookup finds nothing.
pub const ROOM_NOT_FOUND_MESSAGE: &str = "Salle introuvable";

pub(crate) fn map_room_error(error: RoomRepositoryError) -> Error {
    match error {
        RoomRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("room repository unavailable: {message}"))
        }
        RoomRepositoryError::Query { message } => {
            error!("room repository query failed: {message}");
            Error::internal(format!("room repository error: {message}"))
        }
    }
}

pub(crate) fn map_reservation_error(error: ReservationRepositoryError) -> Error {
    match error {
        ReservationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reservation repository unavailable: {message}"))
        }
        ReservationRepositoryError::Overlap => Error::room_unavailable(),
        ReservationRepositoryError::MissingReference { message } if message == USER_REFERENCE => {
            info!("reservation references a deleted user");
            Error::no_user()
        }
        ReservationRepositoryError::MissingReference { message } => {
            info!("reservation references a vanished row: {message}");
            Error::not_found(ROOM_NOT_FOUND_MESSAGE)
        }
        ReservationRepositoryError::Query { message } => {
            error!("reservation repository query failed: {message}");
            Error::internal(format!("reservation repository error: {message}"))
        }
    }
}

/// Service implementing [`RoomCommand`] and [`RoomQuery`].
#[derive(Clone)]
pub struct RoomService<R, B> {
    rooms: Arc<R>,
    reservations: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<R, B> RoomService<R, B> {
    /// Create a room service over room and reservation repositories.
    pub fn new(rooms: Arc<R>, reservations: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms,
            reservations,
            clock,
        }
    }
}

impl<R, B> RoomService<R, B>
where
    R: RoomRepository,
{
    async fn load(&self, id: RoomId) -> Result<Room, Error> {
        self.rooms
            .find_by_id(&id)
            .await
            .map_err(map_room_error)?
            .ok_or_else(|| Error::not_found(ROOM_NOT_FOUND_MESSAGE))
    }
}

#[async_trait]
impl<R, B> RoomCommand for RoomService<R, B>
where
    R: RoomRepository,
    B: ReservationRepository,
{
    async fn create_room(&self, draft: RoomDraft) -> Result<Room, Error> {
        let room = Room::create(RoomId::random(), draft, self.clock.utc());
        self.rooms.create(&room).await.map_err(map_room_error)?;
        info!(room_id = %room.id, "room created");
        Ok(room)
    }

    async fn update_room(&self, id: RoomId, draft: RoomDraft) -> Result<Room, Error> {
        let room = self.load(id).await?.apply(draft, self.clock.utc());
        let updated = self.rooms.update(&room).await.map_err(map_room_error)?;
        if !updated {
            return Err(Error::not_found(ROOM_NOT_FOUND_MESSAGE));
        }
        info!(room_id = %room.id, "room updated");
        Ok(room)
    }

    async fn delete_room(&self, id: RoomId) -> Result<(), Error> {
        let deleted = self.rooms.delete(&id).await.map_err(map_room_error)?;
        if !deleted {
            return Err(Error::not_found(ROOM_NOT_FOUND_MESSAGE));
        }
        info!(room_id = %id, "room deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, B> RoomQuery for RoomService<R, B>
where
    R: RoomRepository,
    B: ReservationRepository,
{
    async fn list_rooms(&self) -> Result<Vec<Room>, Error> {
        self.rooms.list().await.map_err(map_room_error)
    }

    async fn get_room(&self, id: RoomId) -> Result<Room, Error> {
        self.load(id).await
    }

    async fn availability(
        &self,
        id: RoomId,
        window: TimeWindow,
    ) -> Result<RoomAvailability, Error> {
        let room = self.load(id).await?;
        let existing = self
            .reservations
            .list_for_room(&room.id)
            .await
            .map_err(map_reservation_error)?;
        Ok(RoomAvailability {
            room_id: room.id,
            window,
            available: is_room_available(&room.id, &window, &existing),
        })
    }
}
