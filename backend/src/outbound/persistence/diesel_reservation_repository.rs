//! PostgreSQL-backed `ReservationRepository` implementation using Diesel ORM.
//!
//! `insert_if_available` runs the overlap query and the insert inside one
//! SERIALIZABLE transaction. The `reservations_no_overlap` exclusion
//! constraint backs it up, so two racing inserts cannot both commit; either
//! failure is reported as [`ReservationRepositoryError::Overlap`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ReservationRepository, ReservationRepositoryError};
use crate::domain::{Reservation, ReservationId, ReservationStatus, RoomId, TimeWindow, UserId};

use super::diesel_basic_error_mapping::{
    RESERVATIONS_NO_OVERLAP, is_exclusion_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewReservationRow, ReservationRow};
use super::pool::{DbPool, PoolError};
use super::schema::reservations;

/// Diesel-backed implementation of the reservation repository port.
#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReservationRepositoryError {
    map_basic_pool_error(error, ReservationRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> ReservationRepositoryError {
    map_basic_diesel_error(
        error,
        ReservationRepositoryError::query,
        ReservationRepositoryError::connection,
    )
}

/// Failure inside the insert transaction.
#[derive(Debug)]
enum InsertError {
    Overlap,
    Database(DieselError),
}

impl From<DieselError> for InsertError {
    fn from(error: DieselError) -> Self {
        Self::Database(error)
    }
}

fn map_insert_error(error: InsertError) -> ReservationRepositoryError {
    match error {
        InsertError::Overlap => ReservationRepositoryError::overlap(),
        InsertError::Database(error) => map_insert_database_error(error),
    }
}

fn map_insert_database_error(error: DieselError) -> ReservationRepositoryError {
    if is_exclusion_violation(&error, RESERVATIONS_NO_OVERLAP) {
        debug!("exclusion constraint rejected overlapping reservation");
        return ReservationRepositoryError::overlap();
    }
    match error {
        // Concurrent serializable transaction booking the same room.
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            debug!("serialization failure while inserting reservation");
            ReservationRepositoryError::overlap()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            ReservationRepositoryError::missing_reference(
                info.constraint_name().unwrap_or("reservations foreign key"),
            )
        }
        other => map_diesel_error(other),
    }
}

/// Convert a database row into a domain reservation.
fn row_to_reservation(row: ReservationRow) -> Result<Reservation, ReservationRepositoryError> {
    let ReservationRow {
        id,
        room_id,
        user_id,
        start_time,
        end_time,
        status,
        created_at,
    } = row;

    let window = TimeWindow::new(start_time, end_time)
        .map_err(|err| ReservationRepositoryError::query(format!("reservation {id}: {err}")))?;
    let status = status
        .parse::<ReservationStatus>()
        .map_err(|err| ReservationRepositoryError::query(format!("reservation {id}: {err}")))?;

    Ok(Reservation {
        id: ReservationId::from_uuid(id),
        room_id: RoomId::from_uuid(room_id),
        user_id: UserId::from_uuid(user_id),
        window,
        status,
        created_at,
    })
}

fn rows_to_reservations(
    rows: Vec<ReservationRow>,
) -> Result<Vec<Reservation>, ReservationRepositoryError> {
    rows.into_iter().map(row_to_reservation).collect()
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn insert_if_available(
        &self,
        reservation: &Reservation,
    ) -> Result<(), ReservationRepositoryError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let new_row = NewReservationRow {
            id: *reservation.id.as_uuid(),
            room_id: *reservation.room_id.as_uuid(),
            user_id: *reservation.user_id.as_uuid(),
            start_time: reservation.start_time(),
            end_time: reservation.end_time(),
            status: reservation.status.as_str(),
            created_at: reservation.created_at,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let overlapping: i64 = reservations::table
                        .filter(reservations::room_id.eq(new_row.room_id))
                        .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
                        .filter(reservations::start_time.lt(new_row.end_time))
                        .filter(reservations::end_time.gt(new_row.start_time))
                        .count()
                        .get_result(conn)
                        .await?;
                    if overlapping > 0 {
                        return Err(InsertError::Overlap);
                    }

                    diesel::insert_into(reservations::table)
                        .values(&new_row)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_insert_error)
    }

    async fn find_by_id(
        &self,
        id: &ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = reservations::table
            .filter(reservations::id.eq(id.as_uuid()))
            .select(ReservationRow::as_select())
            .first::<ReservationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_reservation).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReservationRow> = reservations::table
            .order((reservations::created_at.asc(), reservations::id.asc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reservations(rows)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::user_id.eq(user_id.as_uuid()))
            .order((reservations::created_at.asc(), reservations::id.asc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reservations(rows)
    }

    async fn list_for_user_starting_from(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::user_id.eq(user_id.as_uuid()))
            .filter(reservations::start_time.ge(from))
            .order((reservations::created_at.asc(), reservations::id.asc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reservations(rows)
    }

    async fn list_for_room(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::room_id.eq(room_id.as_uuid()))
            .order((reservations::created_at.asc(), reservations::id.asc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reservations(rows)
    }

    async fn delete(&self, id: &ReservationId) -> Result<bool, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(reservations::table.filter(reservations::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
