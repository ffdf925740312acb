//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            external_id: entity.external_id,
            email: entity.email,
            display_name: entity.display_name,
            credits: entity.credits,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// User row with aggregate for the admin listing.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserEntity {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub credits: i64,
    pub group_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUserEntity> for domain::models::user::AdminUserItem {
    fn from(entity: AdminUserEntity) -> Self {
        Self {
            id: entity.id,
            external_id: entity.external_id,
            email: entity.email,
            display_name: entity.display_name,
            credits: entity.credits,
            group_count: entity.group_count,
            created_at: entity.created_at,
        }
    }
}
