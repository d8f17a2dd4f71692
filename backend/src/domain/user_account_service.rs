//! Account management: signup, profile edits, admin deletion and the startup
//! bootstrap of the first administrator.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    DeleteUserRequest, PasswordHasher, RegisterUserRequest, UpdateProfileRequest,
    UserAccountCommand, UserAccountQuery, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, Error, Password, PasswordHash, PersonName, Role, StoredUser, User, UserId, UserUpdate,
};

/// Message returned when a profile or account lookup finds nothing.
pub const USER_NOT_FOUND_MESSAGE: &str = "Utilisateur introuvable";
/// Message returned when signup or a profile edit reuses a taken address.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Cette adresse e-mail est déjà utilisée";
/// Message returned when an administrator targets their own account.
pub const SELF_DELETE_MESSAGE: &str = "Un administrateur ne peut pas supprimer son propre compte";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            error!("user repository query failed: {message}");
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict(DUPLICATE_EMAIL_MESSAGE)
            .with_details(json!({ "field": "email", "code": "duplicate_email" })),
    }
}

/// Administrator account ensured at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: Email,
    pub name: PersonName,
    pub password: Password,
}

/// Service implementing [`UserAccountCommand`] and [`UserAccountQuery`].
#[derive(Clone)]
pub struct UserAccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U> UserAccountService<U> {
    /// Create an account service over a user repository.
    pub fn new(users: Arc<U>, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }

    fn hash(&self, password: &Password) -> Result<PasswordHash, Error> {
        self.hasher
            .hash(password)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }
}

impl<U> UserAccountService<U>
where
    U: UserRepository,
{
    async fn create_account(
        &self,
        email: Email,
        name: PersonName,
        password: &Password,
        role: Role,
    ) -> Result<User, Error> {
        let stored = StoredUser {
            user: User {
                id: UserId::random(),
                email,
                name,
                role,
                created_at: self.clock.utc(),
            },
            password_hash: self.hash(password)?,
        };
        self.users
            .create(&stored)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %stored.user.id, role = %role, "account created");
        Ok(stored.user)
    }

    /// Make sure an administrator with the configured e-mail exists.
    ///
    /// An existing account with that address is returned untouched, whatever
    /// its role or password.
    pub async fn ensure_bootstrap_admin(&self, admin: BootstrapAdmin) -> Result<User, Error> {
        if let Some(existing) = self
            .users
            .find_by_email(&admin.email)
            .await
            .map_err(map_repository_error)?
        {
            info!(user_id = %existing.user.id, "bootstrap admin already present");
            return Ok(existing.user);
        }
        self.create_account(admin.email, admin.name, &admin.password, Role::Admin)
            .await
    }
}

#[async_trait]
impl<U> UserAccountCommand for UserAccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, request: RegisterUserRequest) -> Result<User, Error> {
        self.create_account(request.email, request.name, &request.password, Role::User)
            .await
    }

    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User, Error> {
        let requester = request.requester.ok_or_else(Error::no_user)?;
        let password_hash = request
            .password
            .as_ref()
            .map(|password| self.hash(password))
            .transpose()?;
        let changes = UserUpdate {
            email: request.email,
            name: request.name,
            password_hash,
        };

        let user = self
            .users
            .update(&requester, &changes)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    async fn delete_user(&self, request: DeleteUserRequest) -> Result<(), Error> {
        if !request.requester.role.is_admin() {
            return Err(Error::admin_only());
        }
        if request.requester.user_id == request.user_id {
            return Err(Error::invalid_request(SELF_DELETE_MESSAGE));
        }

        let deleted = self
            .users
            .delete(&request.user_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found(USER_NOT_FOUND_MESSAGE));
        }
        info!(user_id = %request.user_id, deleted_by = %request.requester.user_id, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl<U> UserAccountQuery for UserAccountService<U>
where
    U: UserRepository,
{
    async fn profile(&self, requester: Option<UserId>) -> Result<User, Error> {
        let requester = requester.ok_or_else(Error::no_user)?;
        self.users
            .find_by_id(&requester)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
