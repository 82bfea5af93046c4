//! Store-level error types.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by every store operation.
///
/// `NotFound` and `Conflict` are the two outcomes callers are expected to
/// branch on. Every other variant is an opaque persistence failure.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The row does not exist, or an update did not match the expected version.
    #[error("Entity not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("Entity already exists: {0}")]
    Conflict(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RepoError {
    /// True for failures that carry no domain meaning.
    pub fn is_generic(&self) -> bool {
        !matches!(self, RepoError::NotFound | RepoError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_conflict_are_not_generic() {
        assert!(!RepoError::NotFound.is_generic());
        assert!(!RepoError::Conflict("followers_pkey".into()).is_generic());
        assert!(RepoError::Cancelled.is_generic());
        assert!(RepoError::Timeout(Duration::from_secs(5)).is_generic());
        assert!(RepoError::Constraint("comments_post_id_fkey".into()).is_generic());
    }
}
