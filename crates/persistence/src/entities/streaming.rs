//! Streaming catalog entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the streamings table.
#[derive(Debug, Clone, FromRow)]
pub struct StreamingEntity {
    pub id: Uuid,
    pub name: String,
    pub platform: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub monthly_price_cents: i64,
    pub max_users: i32,
    pub max_screens: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StreamingEntity> for domain::models::Streaming {
    fn from(entity: StreamingEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            platform: entity.platform,
            description: entity.description,
            logo_url: entity.logo_url,
            website_url: entity.website_url,
            monthly_price_cents: entity.monthly_price_cents,
            max_users: entity.max_users,
            max_screens: entity.max_screens,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
