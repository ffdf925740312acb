//! Principal authentication middleware.
//!
//! Callers authenticate with a bearer token issued by the identity provider.
//! A verified token yields a [`Principal`]; the local user row is resolved
//! separately, by the `CurrentUser` extractor, only where a handler needs it.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::PrincipalIdentity;
use shared::jwt::{JwtError, PrincipalClaims, PrincipalVerifier};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_auth_failure;

/// Verified caller identity taken from the token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
}

impl Principal {
    /// Attributes used to resolve the principal to a local user.
    pub fn identity(&self) -> PrincipalIdentity {
        PrincipalIdentity::new(&self.external_id, &self.email, self.name.as_deref())
    }
}

impl From<PrincipalClaims> for Principal {
    fn from(claims: PrincipalClaims) -> Self {
        let identity = PrincipalIdentity::new(&claims.sub, &claims.email, claims.name.as_deref());
        Self {
            external_id: identity.external_id,
            email: identity.email,
            name: identity.display_name,
        }
    }
}

/// Pulls the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Verifies the request's bearer token.
pub fn authenticate(verifier: &PrincipalVerifier, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        record_auth_failure("missing_token");
        ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    verifier.verify(token).map(Principal::from).map_err(|e| {
        match e {
            JwtError::TokenExpired => record_auth_failure("expired"),
            _ => record_auth_failure("invalid"),
        }
        tracing::debug!(error = %e, "Principal token rejected");
        ApiError::from(e)
    })
}

/// Middleware that requires a valid principal token.
///
/// The verified [`Principal`] is stored in request extensions for the
/// extractors and gates that run after it.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state.verifier, req.headers()) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use shared::jwt::PrincipalSigner;

    const SECRET: &str = "principal-test-secret";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_authenticate_valid_token() {
        let signer = PrincipalSigner::new_for_testing(SECRET);
        let verifier = PrincipalVerifier::new_for_testing(SECRET);
        let token = signer
            .sign("idp|42", "  Alice@Example.COM ", Some("Alice"), 300)
            .unwrap();

        let principal = authenticate(&verifier, &headers_with(&format!("Bearer {}", token))).unwrap();
        assert_eq!(principal.external_id, "idp|42");
        assert_eq!(principal.email, "alice@example.com");
        assert_eq!(principal.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_authenticate_rejects_foreign_signature() {
        let signer = PrincipalSigner::new_for_testing("someone-else");
        let verifier = PrincipalVerifier::new_for_testing(SECRET);
        let token = signer.sign("idp|42", "alice@example.com", None, 300).unwrap();

        let err = authenticate(&verifier, &headers_with(&format!("Bearer {}", token))).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authenticate_missing_header() {
        let verifier = PrincipalVerifier::new_for_testing(SECRET);
        let err = authenticate(&verifier, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_principal_identity_drops_blank_name() {
        let principal = Principal {
            external_id: "idp|7".to_string(),
            email: "bob@example.com".to_string(),
            name: None,
        };
        let identity = principal.identity();
        assert_eq!(identity.external_id, "idp|7");
        assert!(identity.display_name.is_none());
    }
}
