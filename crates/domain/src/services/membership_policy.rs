//! Group membership rules.
//!
//! These checks run inside the persistence layer's transactions, against rows
//! read under lock, so the decision and the write see the same state.

use crate::models::group::{AssignableRole, GroupRole};
use crate::models::join_request::JoinRequestStatus;
use crate::DomainError;

/// Fails with `CapacityExceeded` unless another member fits.
pub fn ensure_capacity(member_count: i64, max_members: i32) -> Result<(), DomainError> {
    if member_count < i64::from(max_members) {
        Ok(())
    } else {
        Err(DomainError::CapacityExceeded {
            member_count,
            max_members,
        })
    }
}

/// Fails with `StateConflict` unless the request is still pending.
pub fn ensure_pending(status: JoinRequestStatus) -> Result<(), DomainError> {
    if status.is_terminal() {
        Err(DomainError::StateConflict(format!(
            "Join request has already been {}",
            status
        )))
    } else {
        Ok(())
    }
}

/// Who may submit a join request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinRequestPolicy {
    pub allow_re_request_after_denial: bool,
}

impl JoinRequestPolicy {
    pub fn new(allow_re_request_after_denial: bool) -> Self {
        Self {
            allow_re_request_after_denial,
        }
    }

    /// Checks a new request against the user's membership and previous
    /// requests for the same group.
    pub fn check(
        &self,
        is_member: bool,
        previous: &[JoinRequestStatus],
    ) -> Result<(), DomainError> {
        if is_member {
            return Err(DomainError::StateConflict(
                "You are already a member of this group".to_string(),
            ));
        }
        if previous.contains(&JoinRequestStatus::Pending) {
            return Err(DomainError::StateConflict(
                "A join request for this group is already pending".to_string(),
            ));
        }
        if !self.allow_re_request_after_denial && previous.contains(&JoinRequestStatus::Denied) {
            return Err(DomainError::StateConflict(
                "Your previous join request was denied".to_string(),
            ));
        }
        Ok(())
    }
}

/// Group owners and admins manage membership; platform admins may act on any
/// group.
pub fn ensure_can_manage(
    actor_role: Option<GroupRole>,
    is_platform_admin: bool,
) -> Result<(), DomainError> {
    if is_platform_admin || actor_role.is_some_and(|r| r.can_manage_members()) {
        Ok(())
    } else {
        Err(DomainError::AccessDenied(
            "Group owner or admin role required".to_string(),
        ))
    }
}

/// Validates a role change. Only the owner assigns roles and the owner's own
/// row is never changed.
pub fn check_role_change(
    actor_role: GroupRole,
    target_role: GroupRole,
    new_role: AssignableRole,
) -> Result<GroupRole, DomainError> {
    if !actor_role.can_assign_roles() {
        return Err(DomainError::AccessDenied(
            "Only the group owner can change roles".to_string(),
        ));
    }
    if target_role == GroupRole::Owner {
        return Err(DomainError::AccessDenied(
            "The group owner's role cannot be changed".to_string(),
        ));
    }
    Ok(new_role.into())
}

/// The owner holds the subscription and cannot be removed.
pub fn check_removal(target_role: GroupRole) -> Result<(), DomainError> {
    if target_role == GroupRole::Owner {
        Err(DomainError::AccessDenied(
            "The group owner cannot be removed".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn check_leave(role: GroupRole) -> Result<(), DomainError> {
    if role == GroupRole::Owner {
        Err(DomainError::StateConflict(
            "The group owner cannot leave the group".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_capacity() {
        assert!(ensure_capacity(1, 2).is_ok());
        assert_eq!(
            ensure_capacity(2, 2),
            Err(DomainError::CapacityExceeded {
                member_count: 2,
                max_members: 2
            })
        );
        assert!(ensure_capacity(5, 2).is_err());
    }

    #[test]
    fn test_ensure_pending() {
        assert!(ensure_pending(JoinRequestStatus::Pending).is_ok());
        assert!(matches!(
            ensure_pending(JoinRequestStatus::Approved),
            Err(DomainError::StateConflict(_))
        ));
        assert!(matches!(
            ensure_pending(JoinRequestStatus::Denied),
            Err(DomainError::StateConflict(_))
        ));
    }

    #[test]
    fn test_join_policy_blocks_members_and_duplicates() {
        let policy = JoinRequestPolicy::default();
        assert!(policy.check(false, &[]).is_ok());
        assert!(policy.check(true, &[]).is_err());
        assert!(policy.check(false, &[JoinRequestStatus::Pending]).is_err());
    }

    #[test]
    fn test_join_policy_after_denial() {
        let strict = JoinRequestPolicy::new(false);
        assert!(strict.check(false, &[JoinRequestStatus::Denied]).is_err());

        let lenient = JoinRequestPolicy::new(true);
        assert!(lenient.check(false, &[JoinRequestStatus::Denied]).is_ok());
        assert!(lenient
            .check(false, &[JoinRequestStatus::Denied, JoinRequestStatus::Pending])
            .is_err());
    }

    #[test]
    fn test_join_policy_allows_rejoin_after_leaving() {
        let policy = JoinRequestPolicy::default();
        assert!(policy.check(false, &[JoinRequestStatus::Approved]).is_ok());
    }

    #[test]
    fn test_ensure_can_manage() {
        assert!(ensure_can_manage(Some(GroupRole::Owner), false).is_ok());
        assert!(ensure_can_manage(Some(GroupRole::Admin), false).is_ok());
        assert!(ensure_can_manage(Some(GroupRole::Member), false).is_err());
        assert!(ensure_can_manage(None, false).is_err());
        assert!(ensure_can_manage(None, true).is_ok());
    }

    #[test]
    fn test_check_role_change() {
        assert_eq!(
            check_role_change(GroupRole::Owner, GroupRole::Member, AssignableRole::Admin),
            Ok(GroupRole::Admin)
        );
        assert!(
            check_role_change(GroupRole::Admin, GroupRole::Member, AssignableRole::Admin).is_err()
        );
        assert!(
            check_role_change(GroupRole::Owner, GroupRole::Owner, AssignableRole::Member).is_err()
        );
    }

    #[test]
    fn test_owner_cannot_be_removed_or_leave() {
        assert!(check_removal(GroupRole::Owner).is_err());
        assert!(check_removal(GroupRole::Admin).is_ok());
        assert!(check_leave(GroupRole::Owner).is_err());
        assert!(check_leave(GroupRole::Member).is_ok());
    }

    #[test]
    fn test_two_seat_group_approval_sequence() {
        let max_members = 2;
        let mut member_count = 1; // owner

        let mut request_a = JoinRequestStatus::Pending;
        ensure_pending(request_a).unwrap();
        ensure_capacity(member_count, max_members).unwrap();
        request_a = JoinRequestStatus::Approved;
        member_count += 1;

        let request_b = JoinRequestStatus::Pending;
        ensure_pending(request_b).unwrap();
        let result = ensure_capacity(member_count, max_members);

        assert!(matches!(result, Err(DomainError::CapacityExceeded { .. })));
        assert_eq!(request_b, JoinRequestStatus::Pending);
        assert_eq!(member_count, 2);
        assert!(ensure_pending(request_a).is_err());
    }
}
