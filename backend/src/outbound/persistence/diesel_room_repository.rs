//! PostgreSQL-backed `RoomRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RoomRepository, RoomRepositoryError};
use crate::domain::{Capacity, Equipment, Room, RoomId, RoomName};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewRoomRow, RoomChangeset, RoomRow};
use super::pool::{DbPool, PoolError};
use super::schema::rooms;

/// Diesel-backed implementation of the room repository port.
#[derive(Clone)]
pub struct DieselRoomRepository {
    pool: DbPool,
}

impl DieselRoomRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RoomRepositoryError {
    map_basic_pool_error(error, RoomRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RoomRepositoryError {
    map_basic_diesel_error(
        error,
        RoomRepositoryError::query,
        RoomRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain room.
fn row_to_room(row: RoomRow) -> Result<Room, RoomRepositoryError> {
    let RoomRow {
        id,
        name,
        capacity,
        equipment,
        created_at,
        updated_at,
    } = row;
    let corrupt = |err: crate::domain::RoomValidationError| {
        RoomRepositoryError::query(format!("invalid room row {id}: {err}"))
    };

    Ok(Room {
        id: RoomId::from_uuid(id),
        name: RoomName::new(&name).map_err(corrupt)?,
        capacity: Capacity::new(i64::from(capacity)).map_err(corrupt)?,
        equipment: Equipment::new(&equipment).map_err(corrupt)?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl RoomRepository for DieselRoomRepository {
    async fn create(&self, room: &Room) -> Result<(), RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewRoomRow {
            id: *room.id.as_uuid(),
            name: room.name.as_ref(),
            capacity: room.capacity.as_i32(),
            equipment: room.equipment.as_slice(),
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        diesel::insert_into(rooms::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = rooms::table
            .filter(rooms::id.eq(id.as_uuid()))
            .select(RoomRow::as_select())
            .first::<RoomRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_room).transpose()
    }

    async fn list(&self) -> Result<Vec<Room>, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RoomRow> = rooms::table
            .order((rooms::name.asc(), rooms::id.asc()))
            .select(RoomRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_room).collect()
    }

    async fn update(&self, room: &Room) -> Result<bool, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = RoomChangeset {
            name: room.name.as_ref(),
            capacity: room.capacity.as_i32(),
            equipment: room.equipment.as_slice(),
            updated_at: room.updated_at,
        };

        let updated = diesel::update(rooms::table.filter(rooms::id.eq(room.id.as_uuid())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &RoomId) -> Result<bool, RoomRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Reservations go with the room through ON DELETE CASCADE.
        let deleted = diesel::delete(rooms::table.filter(rooms::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn row() -> RoomRow {
        RoomRow {
            id: Uuid::new_v4(),
            name: "Salle Turing".to_owned(),
            capacity: 12,
            equipment: vec!["projecteur".to_owned(), "visio".to_owned()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn valid_row_keeps_equipment_order(row: RoomRow) {
        let room = row_to_room(row).expect("valid row");

        assert_eq!(room.capacity.get(), 12);
        assert_eq!(room.equipment.as_slice(), ["projecteur", "visio"]);
    }

    #[rstest]
    fn non_positive_capacity_is_a_query_error(mut row: RoomRow) {
        row.capacity = 0;

        let error = row_to_room(row).expect_err("corrupt row");

        assert!(matches!(error, RoomRepositoryError::Query { .. }));
    }

    #[rstest]
    fn closed_connection_is_a_connection_error() {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );

        assert!(matches!(
            map_diesel_error(error),
            RoomRepositoryError::Connection { .. }
        ));
    }
}
