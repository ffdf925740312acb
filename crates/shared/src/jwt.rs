//! Principal token utilities.
//!
//! Users authenticate against an external identity provider which issues
//! RS256-signed JWTs. This module verifies those tokens and exposes the
//! principal claims the backend needs (external id, email, display name).
//! A matching signer is provided for tooling and integration tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Claims carried by an identity provider token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalClaims {
    /// Subject: the principal's id at the identity provider.
    pub sub: String,
    /// Primary email address of the principal.
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verifies principal tokens issued by the identity provider.
#[derive(Clone)]
pub struct PrincipalVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: Option<String>,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for PrincipalVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalVerifier")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl PrincipalVerifier {
    /// Creates a verifier from the provider's RSA public key in PEM format.
    ///
    /// When `issuer` is set, tokens must carry a matching `iss` claim.
    pub fn from_rsa_pem(
        public_key_pem: &str,
        issuer: Option<&str>,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            decoding_key,
            algorithm: Algorithm::RS256,
            issuer: issuer.filter(|i| !i.is_empty()).map(str::to_string),
            leeway_secs,
        })
    }

    /// Creates a verifier using an HS256 shared secret.
    /// DO NOT use in production - only for tests.
    pub fn new_for_testing(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            issuer: None,
            leeway_secs: 0,
        }
    }

    /// Validates a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<PrincipalClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        let token_data =
            decode::<PrincipalClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature
                    | jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidToken,
                    _ => JwtError::DecodingError(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.sub.trim().is_empty() || claims.email.trim().is_empty() {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }
}

/// Issues principal tokens. Used by integration tests and local tooling to
/// stand in for the identity provider.
#[derive(Clone)]
pub struct PrincipalSigner {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    issuer: Option<String>,
}

impl PrincipalSigner {
    /// Creates a signer from an RSA private key in PEM format.
    pub fn from_rsa_pem(private_key_pem: &str, issuer: Option<&str>) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            encoding_key,
            algorithm: Algorithm::RS256,
            issuer: issuer.map(str::to_string),
        })
    }

    /// HS256 counterpart of [`PrincipalVerifier::new_for_testing`].
    pub fn new_for_testing(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            issuer: None,
        }
    }

    /// Signs a token for the given principal, valid for `ttl_secs`.
    pub fn sign(
        &self,
        external_id: &str,
        email: &str,
        name: Option<&str>,
        ttl_secs: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = PrincipalClaims {
            sub: external_id.to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }
}
