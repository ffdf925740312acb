//! Group-level authorization.
//!
//! Group routes carry the group id in different path positions, so the
//! checks are helpers called from handlers rather than a path-parsing layer.

use domain::models::group::GroupRole;
use domain::services::{ensure_can_manage, is_admin};
use persistence::entities::{GroupEntity, GroupMembershipEntity};
use persistence::repositories::GroupRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// What the caller is allowed to do in one group.
#[derive(Debug, Clone)]
pub struct GroupAccess {
    pub group: GroupEntity,
    pub membership: Option<GroupMembershipEntity>,
    pub is_platform_admin: bool,
}

impl GroupAccess {
    /// Caller's role in the group, if a member.
    pub fn role(&self) -> Option<GroupRole> {
        self.membership.as_ref().map(|m| m.role.into())
    }

    /// Owners, group admins and platform admins.
    pub fn require_manager(&self) -> Result<(), ApiError> {
        ensure_can_manage(self.role(), self.is_platform_admin).map_err(ApiError::from)
    }

    /// Any member of the group, or a platform admin.
    pub fn require_member(&self) -> Result<(), ApiError> {
        if self.membership.is_some() || self.is_platform_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You are not a member of this group".to_string(),
            ))
        }
    }
}

/// Loads the group and the caller's standing in it.
///
/// Fails with 404 when the group does not exist.
pub async fn load_group_access(
    state: &AppState,
    group_id: Uuid,
    user_id: Uuid,
    email: &str,
) -> Result<GroupAccess, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let group = repo
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;
    let membership = repo.get_membership(group_id, user_id).await?;
    let is_platform_admin = is_admin(state.admin_authority.as_ref(), email).await;

    Ok(GroupAccess {
        group,
        membership,
        is_platform_admin,
    })
}

/// Loads the group and fails unless the caller may manage its members.
pub async fn authorize_group_manager(
    state: &AppState,
    group_id: Uuid,
    user_id: Uuid,
    email: &str,
) -> Result<GroupAccess, ApiError> {
    let access = load_group_access(state, group_id, user_id, email).await?;
    access.require_manager()?;
    Ok(access)
}
