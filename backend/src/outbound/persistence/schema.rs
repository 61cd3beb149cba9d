//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts.
    ///
    /// `username` is unique; `role` is `admin` or `user`.
    users (id) {
        /// Primary key, auto-incremented.
        id -> Integer,
        /// Unique login name.
        username -> Text,
        /// bcrypt hash of the password.
        password_hash -> Text,
        /// Authorisation role.
        role -> Text,
        /// Creation timestamp.
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Pickup events keyed by airway bill number.
    pickup (awb) {
        /// Airway bill number.
        awb -> Text,
        recipient_name -> Nullable<Text>,
        address -> Nullable<Text>,
        phone -> Nullable<Text>,
        /// `YYYY-MM-DD`.
        event_date -> Nullable<Text>,
        /// Username of the last writer.
        submitted_by -> Text,
    }
}

diesel::table! {
    /// Delivery events keyed by airway bill number.
    delivery (awb) {
        /// Airway bill number.
        awb -> Text,
        /// `Terkirim`, `Gagal` or `Proses`.
        status -> Text,
        /// `YYYY-MM-DD`.
        event_date -> Nullable<Text>,
        /// Username of the last writer.
        submitted_by -> Text,
        /// Non-negative cash-on-delivery amount.
        cod_amount -> Double,
    }
}

diesel::table! {
    /// Hand-entered daily counters, unique per date.
    manual_stats (id) {
        id -> Integer,
        /// `YYYY-MM-DD`, unique.
        date -> Text,
        delivery_success -> BigInt,
        delivery_pending -> BigInt,
        pickup_success -> BigInt,
        pickup_failed -> BigInt,
        cod_packages_count -> BigInt,
        submitted_by -> Text,
        created_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, pickup, delivery, manual_stats);
