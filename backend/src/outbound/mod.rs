//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: SQLite-backed repositories using Diesel ORM
//! - **security**: bcrypt password hashing and HS256 session tokens
//! - **spreadsheet**: workbook decoding with `calamine`
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod persistence;
pub mod security;
pub mod spreadsheet;
