//! Connection pool and PostgreSQL stores.

mod connections;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCommentRepository, PostgresFollowerRepository, PostgresPostRepository,
    PostgresUserRepository,
};

#[cfg(feature = "postgres")]
use std::sync::Arc;

#[cfg(feature = "postgres")]
use social_core::Storage;

/// Wire all four PostgreSQL stores to one shared pool.
#[cfg(feature = "postgres")]
pub fn postgres_storage(db: Arc<sea_orm::DbConn>) -> Storage {
    Storage::new(
        Arc::new(PostgresPostRepository::new(Arc::clone(&db))),
        Arc::new(PostgresUserRepository::new(Arc::clone(&db))),
        Arc::new(PostgresCommentRepository::new(Arc::clone(&db))),
        Arc::new(PostgresFollowerRepository::new(db)),
    )
}
