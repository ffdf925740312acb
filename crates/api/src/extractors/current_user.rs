//! Resolves the authenticated principal to its local user row.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use persistence::entities::UserEntity;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::user_auth::UserAuth;
use crate::middleware::user_auth::Principal;

/// The caller's user row, created on first sight and refreshed from the
/// token's email and name on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserEntity,
    pub principal: Principal,
}

impl CurrentUser {
    pub fn id(&self) -> uuid::Uuid {
        self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentUser>() {
            return Ok(current.clone());
        }

        let UserAuth(principal) = UserAuth::from_request_parts(parts, state).await?;
        let repo = UserRepository::new(state.pool.clone());
        let user = repo.upsert_from_principal(&principal.identity()).await?;

        tracing::debug!(user_id = %user.id, external_id = %user.external_id, "Resolved principal");

        let current = CurrentUser { user, principal };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}
