//! Application state - shared across all handlers.

#[cfg(feature = "postgres")]
use std::sync::Arc;
use std::time::Duration;

use social_core::Storage;
use social_infra::in_memory_storage;

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use social_infra::{DatabaseConnections, postgres_storage};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub backend: &'static str,
    pub request_timeout: Duration,
    pub stub_user_id: i64,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to in-memory storage when
    /// no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (storage, backend, db) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let storage = postgres_storage(connections.conn());
                    (storage, "postgres", Some(Arc::new(connections)))
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (in_memory_storage(), "memory", None)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (in_memory_storage(), "memory", None)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (storage, backend) = {
            tracing::info!("Running without postgres feature - using in-memory storage");
            (in_memory_storage(), "memory")
        };

        tracing::info!(backend, "Application state initialized");

        Self {
            storage,
            backend,
            request_timeout: config.request_timeout,
            stub_user_id: config.stub_user_id,
            #[cfg(feature = "postgres")]
            db,
        }
    }

    #[cfg(test)]
    pub fn in_memory(stub_user_id: i64) -> Self {
        Self {
            storage: in_memory_storage(),
            backend: "memory",
            request_timeout: Duration::from_secs(5),
            stub_user_id,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Release the connection pool.
    pub async fn shutdown(&self) {
        #[cfg(feature = "postgres")]
        if let Some(db) = &self.db {
            if let Err(e) = db.close().await {
                tracing::error!("Failed to close database pool: {}", e);
            }
        }
    }
}
