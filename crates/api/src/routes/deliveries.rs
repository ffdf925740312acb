//! Access-data delivery routes.
//!
//! Owners and group admins send access data to members; members confirm
//! receipt or dispute it. Stats report, per scope of groups, which
//! (member, streaming) pairs are still waiting for access.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use domain::models::delivery::{
    ConfirmDeliveryRequest, CreateDeliveryRequest, DeliveryPair, DeliveryResponse, DeliveryStats,
    ListDeliveriesResponse, UpdateDeliveryRequest,
};
use domain::services::{aggregate_stats, compute_deadline};
use persistence::entities::{AccessDeliveryEntity, GroupMembershipEntity};
use persistence::repositories::{DeliveryRepository, DeliveryScope, GroupRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::admin_gate::PlatformAdmin;
use crate::middleware::rbac::{authorize_group_manager, load_group_access};

fn respond(delivery: AccessDeliveryEntity) -> DeliveryResponse {
    DeliveryResponse::from_delivery(delivery.into(), Utc::now())
}

async fn find_membership(
    state: &AppState,
    membership_id: Uuid,
) -> Result<GroupMembershipEntity, ApiError> {
    GroupRepository::new(state.pool.clone())
        .find_membership_by_id(membership_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Membership not found".to_string()))
}

async fn stats_for(state: &AppState, scope: DeliveryScope) -> Result<DeliveryStats, ApiError> {
    let pairs: Vec<DeliveryPair> = DeliveryRepository::new(state.pool.clone())
        .list_pairs(&scope)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(aggregate_stats(&pairs, Utc::now()))
}

/// Send access data to a member.
///
/// POST /api/v1/groups/:group_id/deliveries
pub async fn create_delivery(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<DeliveryResponse>), ApiError> {
    request.validate()?;
    authorize_group_manager(&state, group_id, current.id(), current.email()).await?;

    let deadline = compute_deadline(
        Utc::now(),
        state.config.delivery.confirmation_deadline_hours,
    );
    let delivery = DeliveryRepository::new(state.pool.clone())
        .create(group_id, &request, current.id(), deadline)
        .await?;

    info!(
        delivery_id = %delivery.id,
        group_id = %group_id,
        membership_id = %delivery.membership_id,
        streaming_id = %delivery.streaming_id,
        channel = request.channel.as_str(),
        sent_by = %current.id(),
        "Access data sent"
    );

    Ok((StatusCode::CREATED, Json(respond(delivery))))
}

/// Delivery history of a membership, newest first.
///
/// GET /api/v1/memberships/:membership_id/deliveries
pub async fn list_membership_deliveries(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(membership_id): Path<Uuid>,
) -> Result<Json<ListDeliveriesResponse>, ApiError> {
    let membership = find_membership(&state, membership_id).await?;
    if membership.user_id != current.id() {
        load_group_access(&state, membership.group_id, current.id(), current.email())
            .await?
            .require_manager()?;
    }

    let deliveries = DeliveryRepository::new(state.pool.clone())
        .list_for_membership(membership_id)
        .await?
        .into_iter()
        .map(respond)
        .collect();

    Ok(Json(ListDeliveriesResponse { deliveries }))
}

/// Confirm or dispute a delivery. Only the member may answer.
///
/// POST /api/v1/memberships/:membership_id/deliveries/confirm
pub async fn confirm_delivery(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(membership_id): Path<Uuid>,
    Json(request): Json<ConfirmDeliveryRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    request.validate()?;

    let membership = find_membership(&state, membership_id).await?;
    if membership.user_id != current.id() {
        return Err(ApiError::Forbidden(
            "Only the member can answer a delivery".to_string(),
        ));
    }

    let delivery = DeliveryRepository::new(state.pool.clone())
        .confirm(
            membership_id,
            request.delivery_id,
            request.confirmed,
            request.notes.as_deref(),
        )
        .await?;

    info!(
        delivery_id = %delivery.id,
        membership_id = %membership_id,
        confirmed = request.confirmed,
        rejection_count = delivery.rejection_count,
        "Delivery answered"
    );

    Ok(Json(respond(delivery)))
}

/// Administrative status or deadline correction.
///
/// PATCH /api/v1/admin/deliveries/:delivery_id
pub async fn admin_update_delivery(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Path(delivery_id): Path<Uuid>,
    Json(request): Json<UpdateDeliveryRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery = DeliveryRepository::new(state.pool.clone())
        .override_status(delivery_id, &request)
        .await?;

    info!(
        delivery_id = %delivery_id,
        status = ?request.status,
        deadline = ?delivery.deadline,
        admin = %admin.email,
        "Delivery updated by admin"
    );

    Ok(Json(respond(delivery)))
}

/// Stats for one group.
///
/// GET /api/v1/groups/:group_id/deliveries/stats
pub async fn group_delivery_stats(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(group_id): Path<Uuid>,
) -> Result<Json<DeliveryStats>, ApiError> {
    authorize_group_manager(&state, group_id, current.id(), current.email()).await?;
    let stats = stats_for(&state, DeliveryScope::Groups(vec![group_id])).await?;
    Ok(Json(stats))
}

/// Stats across every group the caller owns or administers.
///
/// GET /api/v1/deliveries/stats
pub async fn managed_delivery_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DeliveryStats>, ApiError> {
    let group_ids = GroupRepository::new(state.pool.clone())
        .find_managed_group_ids(current.id())
        .await?;
    if group_ids.is_empty() {
        return Ok(Json(DeliveryStats::default()));
    }
    let stats = stats_for(&state, DeliveryScope::Groups(group_ids)).await?;
    Ok(Json(stats))
}

/// Stats across all groups.
///
/// GET /api/v1/admin/deliveries/stats
pub async fn admin_delivery_stats(
    State(state): State<AppState>,
) -> Result<Json<DeliveryStats>, ApiError> {
    let stats = stats_for(&state, DeliveryScope::AllGroups).await?;
    Ok(Json(stats))
}
