//! Port abstraction for room persistence.
use async_trait::async_trait;

use crate::domain::{Room, RoomId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by room repository adapters.
    pub enum RoomRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "room repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "room repository query failed: {message}",
    }
}

/// Storage of bookable rooms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a new room.
    async fn create(&self, room: &Room) -> Result<(), RoomRepositoryError>;

    /// Fetch a room by identifier.
    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RoomRepositoryError>;

    /// List rooms ordered by name, then id.
    async fn list(&self) -> Result<Vec<Room>, RoomRepositoryError>;

    /// Overwrite a room's attributes. Returns whether the room existed.
    async fn update(&self, room: &Room) -> Result<bool, RoomRepositoryError>;

    /// Delete a room and its reservations. Returns whether a row was removed.
    async fn delete(&self, id: &RoomId) -> Result<bool, RoomRepositoryError>;
}
