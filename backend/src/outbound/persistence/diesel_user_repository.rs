//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordHash, PersonName, StoredUser, User, UserId, UserUpdate};

use super::diesel_basic_error_mapping::{
    USERS_EMAIL_KEY, map_basic_diesel_error, map_basic_pool_error, violates_constraint,
};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Like [`map_diesel_error`], recognising the unique e-mail index.
fn map_write_error(error: DieselError, email: Option<&str>) -> UserPersistenceError {
    match (&error, email) {
        (DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info), Some(email))
            if violates_constraint(info.as_ref(), USERS_EMAIL_KEY) =>
        {
            UserPersistenceError::duplicate_email(email)
        }
        _ => map_diesel_error(error),
    }
}

fn row_to_stored_user(row: UserRow) -> Result<StoredUser, UserPersistenceError> {
    let corrupt = |err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("invalid user row {}: {err}", row.id))
    };
    let user = User {
        id: UserId::from_uuid(row.id),
        email: Email::new(&row.email).map_err(|err| corrupt(&err))?,
        name: PersonName::new(&row.name).map_err(|err| corrupt(&err))?,
        role: row.role.parse().map_err(|err| corrupt(&err))?,
        created_at: row.created_at,
    };
    Ok(StoredUser {
        user,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_stored_user(row).map(|stored| stored.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, stored: &StoredUser) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &stored.user;
        let new_row = NewUserRow {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            name: user.name.as_ref(),
            password_hash: stored.password_hash.as_str(),
            role: user.role.as_str(),
            created_at: user.created_at,
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, Some(user.email.as_ref())))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_stored_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        let changeset = UserChangeset {
            email: changes.email.as_ref().map(AsRef::as_ref),
            name: changes.name.as_ref().map(AsRef::as_ref),
            password_hash: changes.password_hash.as_ref().map(PasswordHash::as_str),
        };
        if changeset.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, changeset.email))?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
