//! Driving ports for room management and availability lookups.

use async_trait::async_trait;

use crate::domain::{Error, Room, RoomDraft, RoomId, TimeWindow};

/// Availability verdict for one room and window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomAvailability {
    pub room_id: RoomId,
    pub window: TimeWindow,
    pub available: bool,
}

/// Room mutations. Callers are expected to have checked the admin capability.
#[async_trait]
pub trait RoomCommand: Send + Sync {
    /// Create a room.
    async fn create_room(&self, draft: RoomDraft) -> Result<Room, Error>;

    /// Replace a room's attributes.
    async fn update_room(&self, id: RoomId, draft: RoomDraft) -> Result<Room, Error>;

    /// Delete a room and its reservations.
    async fn delete_room(&self, id: RoomId) -> Result<(), Error>;
}

/// Room reads.
#[async_trait]
pub trait RoomQuery: Send + Sync {
    /// Every room, ordered by name.
    async fn list_rooms(&self) -> Result<Vec<Room>, Error>;

    /// One room by id.
    async fn get_room(&self, id: RoomId) -> Result<Room, Error>;

    /// Whether the room is free over `window`.
    async fn availability(&self, id: RoomId, window: TimeWindow)
    -> Result<RoomAvailability, Error>;
}
