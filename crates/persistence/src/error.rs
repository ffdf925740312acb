//! Errors from transactional workflow operations.

use domain::DomainError;
use thiserror::Error;

/// SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// A workflow step either broke a business rule or hit the database.
/// Rule violations roll the transaction back before they surface.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl WorkflowError {
    /// True for failures that a fresh attempt of the same transaction can
    /// succeed on.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::Database(sqlx::Error::Database(db)) => matches!(
                db.code().as_deref(),
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
            ),
            _ => false,
        }
    }
}
