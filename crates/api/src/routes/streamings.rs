//! Streaming catalog routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use domain::models::admin::{CatalogResetCounts, MaintenanceResponse, StreamingPurgeCounts};
use domain::models::streaming::{
    default_catalog, CreateStreamingRequest, ListStreamingsResponse, Streaming,
    StreamingResponse, UpdateStreamingRequest,
};
use persistence::entities::StreamingEntity;
use persistence::repositories::StreamingRepository;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::admin_gate::PlatformAdmin;
use crate::middleware::metrics::record_maintenance_run;

fn to_response(entities: Vec<StreamingEntity>) -> ListStreamingsResponse {
    ListStreamingsResponse {
        streamings: entities
            .into_iter()
            .map(|e| StreamingResponse::from(Streaming::from(e)))
            .collect(),
    }
}

/// Active catalog entries, for any authenticated caller.
///
/// GET /api/v1/streamings
pub async fn list_streamings(
    State(state): State<AppState>,
) -> Result<Json<ListStreamingsResponse>, ApiError> {
    let streamings = StreamingRepository::new(state.pool.clone())
        .list_active()
        .await?;
    Ok(Json(to_response(streamings)))
}

/// Every catalog entry, active or not.
///
/// GET /api/v1/admin/streamings
pub async fn admin_list_streamings(
    State(state): State<AppState>,
) -> Result<Json<ListStreamingsResponse>, ApiError> {
    let streamings = StreamingRepository::new(state.pool.clone())
        .list_all()
        .await?;
    Ok(Json(to_response(streamings)))
}

/// POST /api/v1/admin/streamings
pub async fn create_streaming(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Json(request): Json<CreateStreamingRequest>,
) -> Result<(StatusCode, Json<StreamingResponse>), ApiError> {
    request.validate()?;

    let created = StreamingRepository::new(state.pool.clone())
        .create(&request)
        .await?;

    info!(
        streaming_id = %created.id,
        name = %created.name,
        admin = %admin.email,
        "Streaming created"
    );

    Ok((
        StatusCode::CREATED,
        Json(StreamingResponse::from(Streaming::from(created))),
    ))
}

/// PUT /api/v1/admin/streamings/:streaming_id
pub async fn update_streaming(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Path(streaming_id): Path<Uuid>,
    Json(request): Json<UpdateStreamingRequest>,
) -> Result<Json<StreamingResponse>, ApiError> {
    request.validate()?;

    let updated = StreamingRepository::new(state.pool.clone())
        .update(streaming_id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Streaming not found".to_string()))?;

    info!(streaming_id = %streaming_id, admin = %admin.email, "Streaming updated");

    Ok(Json(StreamingResponse::from(Streaming::from(updated))))
}

/// Soft-disable a catalog entry.
///
/// DELETE /api/v1/admin/streamings/:streaming_id
pub async fn deactivate_streaming(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
    Path(streaming_id): Path<Uuid>,
) -> Result<Json<StreamingResponse>, ApiError> {
    let deactivated = StreamingRepository::new(state.pool.clone())
        .deactivate(streaming_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Streaming not found".to_string()))?;

    info!(streaming_id = %streaming_id, admin = %admin.email, "Streaming deactivated");

    Ok(Json(StreamingResponse::from(Streaming::from(deactivated))))
}

/// Re-seed the built-in catalog.
///
/// POST /api/v1/admin/streamings/reset
pub async fn reset_catalog(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
) -> Json<MaintenanceResponse<CatalogResetCounts>> {
    let result = StreamingRepository::new(state.pool.clone())
        .reset_catalog(&default_catalog())
        .await;
    record_maintenance_run("reset_catalog", result.is_ok());

    match result {
        Ok(counts) => {
            info!(
                created = counts.created,
                updated = counts.updated,
                admin = %admin.email,
                "Streaming catalog reset"
            );
            Json(MaintenanceResponse::ok("Streaming catalog reset", counts))
        }
        Err(e) => {
            error!(error = %e, admin = %admin.email, "Streaming catalog reset failed");
            Json(MaintenanceResponse::failed("Streaming catalog reset failed"))
        }
    }
}

/// Hard-delete the catalog with its group links and deliveries.
///
/// POST /api/v1/admin/maintenance/purge-streamings
///
/// Always answers 200; callers branch on `success`.
pub async fn purge_streamings(
    State(state): State<AppState>,
    Extension(admin): Extension<PlatformAdmin>,
) -> Json<MaintenanceResponse<StreamingPurgeCounts>> {
    let result = StreamingRepository::new(state.pool.clone()).purge_all().await;
    record_maintenance_run("purge_streamings", result.is_ok());

    match result {
        Ok(counts) => {
            info!(
                streamings = counts.streamings,
                group_streamings = counts.group_streamings,
                access_deliveries = counts.access_deliveries,
                admin = %admin.email,
                "Streamings purged"
            );
            Json(MaintenanceResponse::ok("All streamings purged", counts))
        }
        Err(e) => {
            error!(error = %e, admin = %admin.email, "Streaming purge failed");
            Json(MaintenanceResponse::failed("Streaming purge failed"))
        }
    }
}
