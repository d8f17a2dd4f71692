//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user, room and reservation repository
//! ports, backed by PostgreSQL via `diesel-async` with a `bb8` pool.
//!
//! Row structs (`models.rs`) and the table definitions (`schema.rs`) stay
//! private to this module. Repositories only translate between rows and
//! domain types, and map database failures onto the port error enums.
//!
//! # Example
//!
//! ```ignore
//! use roombook::outbound::persistence::{DbPool, DieselRoomRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/roombook")).await?;
//! let rooms = DieselRoomRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_reservation_repository;
mod diesel_room_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_room_repository::DieselRoomRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
