//! Domain error types.

use thiserror::Error;

/// Errors raised by business rules. The API layer maps each variant to a
/// structured response; none of them leave data partially written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Group is full: {member_count} of {max_members} seats taken")]
    CapacityExceeded { member_count: i64, max_members: i32 },

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            DomainError::NotFound("Membership".into()).to_string(),
            "Membership not found"
        );
        assert_eq!(
            DomainError::CapacityExceeded {
                member_count: 2,
                max_members: 2
            }
            .to_string(),
            "Group is full: 2 of 2 seats taken"
        );
        assert_eq!(
            DomainError::AccessDenied("admin only".into()).to_string(),
            "Access denied: admin only"
        );
    }
}
