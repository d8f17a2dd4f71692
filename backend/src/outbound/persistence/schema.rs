//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! `diesel print-schema` can regenerate them from a live database; keep the
//! `equipment` column as `Array<Text>` when doing so.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Lowercased e-mail address, unique across accounts.
        email -> Varchar,
        /// Display name (max 100 characters).
        name -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// `USER` or `ADMIN`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookable rooms.
    rooms (id) {
        id -> Uuid,
        name -> Varchar,
        /// Seats, always positive.
        capacity -> Int4,
        /// Equipment tags in display order.
        equipment -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Room bookings over half-open `[start_time, end_time)` windows.
    reservations (id) {
        id -> Uuid,
        room_id -> Uuid,
        user_id -> Uuid,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        /// Only `confirmed` is ever written.
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(reservations -> rooms (room_id));
diesel::joinable!(reservations -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(reservations, rooms, users);
