//! Principal authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::{authenticate, Principal};

/// Verified principal for the current request.
///
/// Reuses the principal stored by `require_user_auth` when present and
/// verifies the bearer token itself otherwise.
#[derive(Debug, Clone)]
pub struct UserAuth(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(UserAuth(principal.clone()));
        }

        let principal = authenticate(&state.verifier, &parts.headers)?;
        parts.extensions.insert(principal.clone());
        Ok(UserAuth(principal))
    }
}
