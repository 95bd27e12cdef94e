//! Database module
//!
//! Handles SQLite connection, migrations, and column codecs.

pub mod columns;
pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
