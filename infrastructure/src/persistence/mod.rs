//! Persistence adapters
//!
//! [`SqliteStore`] implements every storage port on one SQLite database:
//! the Action audit table, the tool operation log and the tool inventory.

pub mod sqlite;

pub use sqlite::SqliteStore;
