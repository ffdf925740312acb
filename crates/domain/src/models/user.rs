//! User domain models.
//!
//! Users are mirrored from the external identity provider: the provider owns
//! the identity, this service keeps a local row keyed by the provider's id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::PageInfo;
use uuid::Uuid;

/// Represents a user account mirrored from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    /// Principal id at the identity provider (unique).
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    /// Current credit balance.
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Principal attributes used to create or refresh the local user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalIdentity {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl PrincipalIdentity {
    /// Builds an identity, normalizing the email and dropping blank names.
    pub fn new(external_id: &str, email: &str, display_name: Option<&str>) -> Self {
        Self {
            external_id: external_id.trim().to_string(),
            email: shared::validation::normalize_email(email),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

/// Public user info exposed to other group members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserPublic {
    pub id: Uuid,
    pub display_name: Option<String>,
}

/// Response for `GET /api/v1/me`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CurrentUserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub credits: i64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// User row in the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminUserItem {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub credits: i64,
    pub group_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Response for the admin user listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListUsersResponse {
    pub data: Vec<AdminUserItem>,
    pub pagination: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_identity_normalizes() {
        let identity = PrincipalIdentity::new(" user_2x ", " Bob@Example.com", Some("  "));
        assert_eq!(identity.external_id, "user_2x");
        assert_eq!(identity.email, "bob@example.com");
        assert_eq!(identity.display_name, None);
    }

    #[test]
    fn test_principal_identity_keeps_name() {
        let identity = PrincipalIdentity::new("user_2x", "bob@example.com", Some(" Bob "));
        assert_eq!(identity.display_name.as_deref(), Some("Bob"));
    }
}
