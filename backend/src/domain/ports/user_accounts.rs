//! Driving ports for account management: signup, profile and admin actions.

use async_trait::async_trait;

use crate::domain::{Email, Error, Password, PersonName, Principal, User, UserId};

/// Request to open a new account.
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub email: Email,
    pub name: PersonName,
    pub password: Password,
}

/// Request to change the caller's own profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileRequest {
    pub requester: Option<UserId>,
    pub email: Option<Email>,
    pub name: Option<PersonName>,
    pub password: Option<Password>,
}

/// Request from an administrator to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteUserRequest {
    pub requester: Principal,
    pub user_id: UserId,
}

/// Account mutations.
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Create a `USER` account. Fails with a conflict when the e-mail is taken.
    async fn register(&self, request: RegisterUserRequest) -> Result<User, Error>;

    /// Update the caller's profile.
    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User, Error>;

    /// Delete another account. Administrators cannot delete themselves.
    async fn delete_user(&self, request: DeleteUserRequest) -> Result<(), Error>;
}

/// Account reads.
#[async_trait]
pub trait UserAccountQuery: Send + Sync {
    /// The caller's own profile.
    async fn profile(&self, requester: Option<UserId>) -> Result<User, Error>;

    /// Every account in creation order.
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}
