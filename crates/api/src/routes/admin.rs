//! Platform admin routes.
//!
//! Every handler here runs behind `require_platform_admin`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use domain::models::admin::{
    AdminEmailRequest, AdminEmailResponse, AdminStats, ListAdminsResponse, MaintenanceResponse,
    PurgeCounts,
};
use domain::models::group::{AdminListGroupsResponse, RemoveMemberResponse};
use domain::models::user::ListUsersResponse;
use domain::services::{add_admin_email, remove_admin_email};
use persistence::repositories::{AdminRepository, GroupRepository, UserRepository};
use shared::pagination::PageRequest;
use shared::validation::normalize_email;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::admin_gate::PlatformAdmin;
use crate::middleware::metrics::record_maintenance_run;

/// GET /api/v1/admin/groups
pub async fn list_groups(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<AdminListGroupsResponse>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());
    let groups = repo.list_all_admin(page.limit(), page.offset()).await?;
    let total = repo.count().await?;

    Ok(Json(AdminListGroupsResponse {
        data: groups.into_iter().map(Into::into).collect(),
        pagination: page.info(total),
    }))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let users = repo
        .list_with_group_counts(page.limit(), page.offset())
        .await?;
    let total = repo.count().await?;

    Ok(Json(ListUsersResponse {
        data: users.into_iter().map(Into::into).collect(),
        pagination: page.info(total),
    }))
}

/// GET /api/v1/admin/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<AdminStats>, ApiError> {
    let stats = AdminRepository::new(state.pool.clone()).stats().await?;
    Ok(Json(stats.into()))
}

/// GET /api/v1/admin/admins
pub async fn list_admins(
    State(state): State<AppState>,
) -> Result<Json<ListAdminsResponse>, ApiError> {
    let admins = state.admin_authority.list().await?;
    Ok(Json(ListAdminsResponse { admins }))
}

/// Grant platform admin rights. 201 when added, 200 when already present.
///
/// POST /api/v1/admin/admins
pub async fn add_admin(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Json(request): Json<AdminEmailRequest>,
) -> Result<(StatusCode, Json<AdminEmailResponse>), ApiError> {
    request.validate()?;

    let email = normalize_email(&request.email);
    let added = add_admin_email(state.admin_authority.as_ref(), &email, Some(&admin.email)).await?;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AdminEmailResponse {
            email,
            changed: added,
        }),
    ))
}

/// Revoke platform admin rights.
///
/// DELETE /api/v1/admin/admins/:email
pub async fn remove_admin(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Path(email): Path<String>,
) -> Result<Json<AdminEmailResponse>, ApiError> {
    let email = normalize_email(&email);
    if email == normalize_email(&admin.email) {
        return Err(ApiError::Conflict(
            "You cannot remove your own admin rights".to_string(),
        ));
    }

    let removed = remove_admin_email(state.admin_authority.as_ref(), &email).await?;
    if !removed {
        warn!(email = %email, admin = %admin.email, "Admin email was not on the allow-list");
    }

    Ok(Json(AdminEmailResponse {
        email,
        changed: removed,
    }))
}

/// Remove a member from any group. The owner cannot be removed.
///
/// DELETE /api/v1/admin/groups/:group_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RemoveMemberResponse>, ApiError> {
    let membership = GroupRepository::new(state.pool.clone())
        .remove_member(group_id, user_id)
        .await?;

    info!(
        group_id = %group_id,
        user_id = %user_id,
        membership_id = %membership.id,
        admin = %admin.email,
        "Member removed by admin"
    );

    Ok(Json(RemoveMemberResponse {
        removed: true,
        user_id,
        group_id,
        message: "Member removed from group".to_string(),
    }))
}

/// Delete every group with its memberships, requests, links and deliveries.
///
/// POST /api/v1/admin/maintenance/purge-groups
///
/// Always answers 200; callers branch on `success`.
pub async fn purge_groups(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
) -> Json<MaintenanceResponse<PurgeCounts>> {
    let result = AdminRepository::new(state.pool.clone()).purge_groups().await;
    record_maintenance_run("purge_groups", result.is_ok());

    match result {
        Ok(counts) => {
            info!(
                groups = counts.groups,
                group_users = counts.group_users,
                group_streamings = counts.group_streamings,
                join_requests = counts.join_requests,
                access_deliveries = counts.access_deliveries,
                admin = %admin.email,
                "Groups purged"
            );
            Json(MaintenanceResponse::ok("All groups purged", counts))
        }
        Err(e) => {
            error!(error = %e, admin = %admin.email, "Group purge failed");
            Json(MaintenanceResponse::failed("Group purge failed"))
        }
    }
}
