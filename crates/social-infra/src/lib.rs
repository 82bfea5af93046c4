//! # Social Infrastructure
//!
//! Concrete implementations of the store ports defined in `social-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL stores via SeaORM

pub mod database;
pub mod memory;

mod bounded;

pub use database::DatabaseConfig;
pub use memory::in_memory_storage;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, postgres_storage};
