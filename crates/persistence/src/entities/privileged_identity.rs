//! Privileged identity entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the privileged_identities table.
#[derive(Debug, Clone, FromRow)]
pub struct PrivilegedIdentityEntity {
    pub email: String,
    pub added_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PrivilegedIdentityEntity> for domain::models::PrivilegedIdentity {
    fn from(entity: PrivilegedIdentityEntity) -> Self {
        Self {
            email: entity.email,
            added_by: entity.added_by,
            created_at: entity.created_at,
        }
    }
}
