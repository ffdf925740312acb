//! Platform administrator gate.
//!
//! Admin routes run behind [`require_user_auth`](super::user_auth::require_user_auth);
//! this layer then checks the principal's email against the admin authority.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::services::is_admin;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_auth_failure;
use crate::middleware::user_auth::{authenticate, Principal};

/// Marker placed in request extensions once the caller is known to be a
/// platform admin.
#[derive(Debug, Clone)]
pub struct PlatformAdmin {
    pub email: String,
}

/// Middleware that requires the caller to be a platform admin.
pub async fn require_platform_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let principal = match req.extensions().get::<Principal>().cloned() {
        Some(principal) => principal,
        None => match authenticate(&state.verifier, req.headers()) {
            Ok(principal) => {
                req.extensions_mut().insert(principal.clone());
                principal
            }
            Err(e) => return e.into_response(),
        },
    };

    if !is_admin(state.admin_authority.as_ref(), &principal.email).await {
        record_auth_failure("not_admin");
        tracing::warn!(email = %principal.email, "Non-admin attempted platform admin access");
        return ApiError::Forbidden("Platform admin access required".to_string()).into_response();
    }

    req.extensions_mut().insert(PlatformAdmin {
        email: principal.email,
    });
    next.run(req).await
}
