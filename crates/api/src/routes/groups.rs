//! Group routes: creation, membership and the streamings a group shares.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::group::{
    CreateGroupRequest, GroupDetail, GroupRole, GroupStreaming, GroupSummary,
    LinkStreamingRequest, ListGroupsResponse, ListMembersResponse, MembershipInfo,
    RemoveMemberResponse, UpdateGroupStreamingRequest, UpdateRoleRequest, UpdateRoleResponse,
    DEFAULT_MAX_MEMBERS,
};
use persistence::entities::{GroupEntity, GroupMembershipEntity};
use persistence::repositories::{GroupRepository, StreamingRepository};
use shared::pagination::PageRequest;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac::{authorize_group_manager, load_group_access};

async fn group_detail(
    repo: &GroupRepository,
    group: GroupEntity,
    membership: GroupMembershipEntity,
) -> Result<GroupDetail, ApiError> {
    let member_count = repo.count_members(group.id).await?;
    let streamings = repo
        .list_group_streamings(group.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(GroupDetail {
        id: group.id,
        name: group.name,
        description: group.description,
        max_members: group.max_members,
        member_count,
        available_seats: (i64::from(group.max_members) - member_count).max(0),
        created_by: group.created_by,
        created_at: group.created_at,
        updated_at: group.updated_at,
        streamings,
        your_membership: MembershipInfo {
            id: membership.id,
            role: membership.role.into(),
            joined_at: membership.joined_at,
        },
    })
}

/// Create a group. The creator becomes its owner.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupDetail>), ApiError> {
    request.validate()?;

    let repo = GroupRepository::new(state.pool.clone());
    let max_members = request.max_members.unwrap_or(DEFAULT_MAX_MEMBERS);
    let (group, membership) = repo
        .create_group(
            request.name.trim(),
            request.description.as_deref(),
            max_members,
            current.id(),
        )
        .await?;

    info!(
        group_id = %group.id,
        group_name = %group.name,
        user_id = %current.id(),
        "Group created"
    );

    let detail = group_detail(&repo, group, membership).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// List groups the caller belongs to.
///
/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let groups = repo.find_user_groups(current.id()).await?;

    let data: Vec<GroupSummary> = groups
        .into_iter()
        .map(|g| GroupSummary {
            id: g.id,
            name: g.name,
            description: g.description,
            max_members: g.max_members,
            member_count: g.member_count,
            your_role: g.role.into(),
            joined_at: g.joined_at,
        })
        .collect();
    let count = data.len();

    Ok(Json(ListGroupsResponse { data, count }))
}

/// Group details for a member.
///
/// GET /api/v1/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetail>, ApiError> {
    let access = load_group_access(&state, group_id, current.id(), current.email()).await?;
    let membership = access
        .membership
        .ok_or_else(|| ApiError::Forbidden("You are not a member of this group".to_string()))?;

    let repo = GroupRepository::new(state.pool.clone());
    let detail = group_detail(&repo, access.group, membership).await?;
    Ok(Json(detail))
}

/// List a group's members.
///
/// GET /api/v1/groups/:group_id/members
pub async fn list_members(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let access = load_group_access(&state, group_id, current.id(), current.email()).await?;
    access.require_member()?;

    let repo = GroupRepository::new(state.pool.clone());
    let members = repo
        .list_members(group_id, page.limit(), page.offset())
        .await?;
    let total = repo.count_members(group_id).await?;

    Ok(Json(ListMembersResponse {
        data: members.into_iter().map(Into::into).collect(),
        pagination: page.info(total),
    }))
}

/// Assign ADMIN or MEMBER to a member. Owner only.
///
/// PUT /api/v1/groups/:group_id/members/:user_id/role
pub async fn update_member_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UpdateRoleResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    if repo.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    let updated = repo
        .update_member_role(group_id, current.id(), user_id, request.role)
        .await?;
    let role: GroupRole = updated.role.into();

    info!(
        group_id = %group_id,
        target_user_id = %user_id,
        new_role = %role,
        actor_id = %current.id(),
        "Member role updated"
    );

    Ok(Json(UpdateRoleResponse {
        membership_id: updated.id,
        user_id: updated.user_id,
        group_id: updated.group_id,
        role,
        updated_at: updated.updated_at,
    }))
}

/// Leave a group. The owner cannot leave.
///
/// DELETE /api/v1/groups/:group_id/members/me
pub async fn leave_group(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<RemoveMemberResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let membership = repo.leave_group(group_id, current.id()).await?;

    info!(group_id = %group_id, user_id = %current.id(), "Member left group");

    Ok(Json(RemoveMemberResponse {
        removed: true,
        user_id: membership.user_id,
        group_id: membership.group_id,
        message: "You have left the group".to_string(),
    }))
}

/// Share a catalog streaming in a group.
///
/// POST /api/v1/groups/:group_id/streamings
pub async fn link_streaming(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<LinkStreamingRequest>,
) -> Result<(StatusCode, Json<GroupStreaming>), ApiError> {
    authorize_group_manager(&state, group_id, current.id(), current.email()).await?;

    let streaming = StreamingRepository::new(state.pool.clone())
        .find_by_id(request.streaming_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Streaming not found".to_string()))?;
    if !streaming.is_active {
        return Err(ApiError::Conflict("Streaming is not active".to_string()));
    }

    let link = GroupRepository::new(state.pool.clone())
        .link_streaming(group_id, streaming.id)
        .await?;

    info!(
        group_id = %group_id,
        streaming_id = %streaming.id,
        actor_id = %current.id(),
        "Streaming linked to group"
    );

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Toggle whether a linked streaming is active in the group.
///
/// PUT /api/v1/groups/:group_id/streamings/:streaming_id
pub async fn update_group_streaming(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((group_id, streaming_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGroupStreamingRequest>,
) -> Result<Json<GroupStreaming>, ApiError> {
    authorize_group_manager(&state, group_id, current.id(), current.email()).await?;

    let link = GroupRepository::new(state.pool.clone())
        .set_group_streaming_active(group_id, streaming_id, request.is_active)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group streaming not found".to_string()))?;

    info!(
        group_id = %group_id,
        streaming_id = %streaming_id,
        is_active = request.is_active,
        "Group streaming updated"
    );

    Ok(Json(link.into()))
}
