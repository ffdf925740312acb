//! Join request routes: asking to join a group and the owner/admin decision.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::join_request::{
    CreateJoinRequestRequest, JoinRequest, ListJoinRequestsQuery,
    ListJoinRequestsResponse, RespondToJoinRequestResponse,
};
use domain::services::JoinRequestPolicy;
use persistence::entities::JoinRequestEntity;
use persistence::repositories::{JoinRequestRepository, UserRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, UserAuth};
use crate::middleware::rbac::authorize_group_manager;

/// Ask to join a group.
///
/// POST /api/v1/groups/:group_id/join-requests
///
/// The body is optional; an empty body sends no message.
pub async fn create_join_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
    request: Option<Json<CreateJoinRequestRequest>>,
) -> Result<(StatusCode, Json<JoinRequest>), ApiError> {
    let Json(request) = request.unwrap_or_default();
    request.validate()?;

    let policy = JoinRequestPolicy::new(state.config.membership.allow_re_request_after_denial);
    let created = JoinRequestRepository::new(state.pool.clone())
        .create(group_id, current.id(), request.message.as_deref(), policy)
        .await?;

    info!(
        request_id = %created.id,
        group_id = %group_id,
        user_id = %current.id(),
        "Join request created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// The caller's own join requests.
///
/// GET /api/v1/join-requests
///
/// Lookup only: a principal without a user row has no requests.
pub async fn list_my_join_requests(
    State(state): State<AppState>,
    UserAuth(principal): UserAuth,
) -> Result<Json<ListJoinRequestsResponse>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_external_id(&principal.external_id)
        .await?;

    let join_requests = match user {
        Some(user) => JoinRequestRepository::new(state.pool.clone())
            .list_for_user(user.id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        None => Vec::new(),
    };

    Ok(Json(ListJoinRequestsResponse { join_requests }))
}

/// A group's join requests, optionally filtered by status.
///
/// GET /api/v1/groups/:group_id/join-requests
pub async fn list_group_join_requests(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
    Query(query): Query<ListJoinRequestsQuery>,
) -> Result<Json<ListJoinRequestsResponse>, ApiError> {
    authorize_group_manager(&state, group_id, current.id(), current.email()).await?;

    let join_requests = JoinRequestRepository::new(state.pool.clone())
        .list_for_group(group_id, query.status)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListJoinRequestsResponse { join_requests }))
}

async fn load_for_decision(
    state: &AppState,
    current: &CurrentUser,
    request_id: Uuid,
) -> Result<JoinRequestEntity, ApiError> {
    let request = JoinRequestRepository::new(state.pool.clone())
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Join request not found".to_string()))?;
    authorize_group_manager(state, request.group_id, current.id(), current.email()).await?;
    Ok(request)
}

fn responded(request: JoinRequestEntity, responder_id: Uuid) -> RespondToJoinRequestResponse {
    let request: JoinRequest = request.into();
    RespondToJoinRequestResponse {
        id: request.id,
        group_id: request.group_id,
        user_id: request.user_id,
        status: request.status,
        responded_by: request.responded_by.unwrap_or(responder_id),
        responded_at: request.responded_at.unwrap_or_else(chrono::Utc::now),
        membership_id: None,
        role: None,
    }
}

/// Approve a pending request, adding the requester as a member.
///
/// POST /api/v1/join-requests/:request_id/approve
pub async fn approve_join_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RespondToJoinRequestResponse>, ApiError> {
    load_for_decision(&state, &current, request_id).await?;

    let (request, membership) = JoinRequestRepository::new(state.pool.clone())
        .approve(
            request_id,
            current.id(),
            state.config.membership.approval_max_attempts,
        )
        .await?;

    info!(
        request_id = %request_id,
        group_id = %request.group_id,
        user_id = %request.user_id,
        approved_by = %current.id(),
        "Join request approved"
    );

    let mut response = responded(request, current.id());
    response.membership_id = Some(membership.id);
    response.role = Some(membership.role.into());
    Ok(Json(response))
}

/// Deny a pending request.
///
/// POST /api/v1/join-requests/:request_id/deny
pub async fn deny_join_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RespondToJoinRequestResponse>, ApiError> {
    load_for_decision(&state, &current, request_id).await?;

    let request = JoinRequestRepository::new(state.pool.clone())
        .deny(request_id, current.id())
        .await?;

    info!(
        request_id = %request_id,
        group_id = %request.group_id,
        denied_by = %current.id(),
        "Join request denied"
    );

    Ok(Json(responded(request, current.id())))
}
