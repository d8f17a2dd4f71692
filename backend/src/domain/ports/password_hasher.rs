//! Port for one-way password hashing.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing the password failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be decoded.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hash and verify passwords. Implementations must salt every hash.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce an encoded, salted hash for `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Check `candidate` against a stored hash. A mismatch is `Ok(false)`.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
