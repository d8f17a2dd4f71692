//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, StoredUser, User, UserId, UserUpdate};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this e-mail address.
        DuplicateEmail { email: String } => "e-mail address already registered: {email}",
    }
}

/// Storage of user accounts and their password hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when the address is taken.
    async fn create(&self, user: &StoredUser) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its password hash by e-mail address.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<StoredUser>, UserPersistenceError>;

    /// List every account in creation order.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply a partial update and return the updated user, or `None` when the
    /// user does not exist.
    async fn update(
        &self,
        id: &UserId,
        changes: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete a user and their reservations. Returns whether a row was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
