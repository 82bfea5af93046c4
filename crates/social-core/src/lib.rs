//! # Social Core
//!
//! The domain layer of the social feed backend.
//! Entities, store ports and the storage facade live here; this crate has no
//! database or HTTP dependencies.

pub mod context;
pub mod domain;
pub mod error;
pub mod ports;
pub mod storage;

pub use context::{Ctx, QUERY_TIMEOUT};
pub use error::RepoError;
pub use storage::Storage;
