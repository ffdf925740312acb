//! Current user endpoint.

use axum::{extract::State, Json};
use domain::models::user::CurrentUserResponse;
use domain::services::is_admin;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Resolve and return the caller's user row.
///
/// GET /api/v1/me
pub async fn get_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let is_admin = is_admin(state.admin_authority.as_ref(), current.email()).await;
    let user = current.user;

    Ok(Json(CurrentUserResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        credits: user.credits,
        is_admin,
        created_at: user.created_at,
    }))
}
