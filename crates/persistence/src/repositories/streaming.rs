//! Streaming catalog repository.

use domain::models::admin::{CatalogResetCounts, StreamingPurgeCounts};
use domain::models::streaming::{CatalogSeed, CreateStreamingRequest, UpdateStreamingRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::StreamingEntity;
use crate::metrics::QueryTimer;

const STREAMING_COLUMNS: &str = "id, name, platform, description, logo_url, website_url, \
    monthly_price_cents, max_users, max_screens, is_active, created_at, updated_at";

/// Repository for catalog database operations.
#[derive(Clone)]
pub struct StreamingRepository {
    pool: PgPool,
}

impl StreamingRepository {
    /// Creates a new StreamingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Active catalog entries, by name.
    pub async fn list_active(&self) -> Result<Vec<StreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_streamings");
        let result = sqlx::query_as::<_, StreamingEntity>(&format!(
            "SELECT {STREAMING_COLUMNS} FROM streamings WHERE is_active = true ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Every catalog entry, by name.
    pub async fn list_all(&self) -> Result<Vec<StreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_streamings");
        let result = sqlx::query_as::<_, StreamingEntity>(&format!(
            "SELECT {STREAMING_COLUMNS} FROM streamings ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a catalog entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_streaming_by_id");
        let result = sqlx::query_as::<_, StreamingEntity>(&format!(
            "SELECT {STREAMING_COLUMNS} FROM streamings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a catalog entry. Names are unique.
    pub async fn create(&self, req: &CreateStreamingRequest) -> Result<StreamingEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_streaming");
        let result = sqlx::query_as::<_, StreamingEntity>(&format!(
            r#"
            INSERT INTO streamings (name, platform, description, logo_url, website_url,
                                    monthly_price_cents, max_users, max_screens)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {STREAMING_COLUMNS}
            "#
        ))
        .bind(req.name.trim())
        .bind(req.platform.trim())
        .bind(req.description.as_deref())
        .bind(req.logo_url.as_deref())
        .bind(req.website_url.as_deref())
        .bind(req.monthly_price_cents)
        .bind(req.max_users)
        .bind(req.max_screens)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Partially update a catalog entry.
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateStreamingRequest,
    ) -> Result<Option<StreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_streaming");
        let result = sqlx::query_as::<_, StreamingEntity>(&format!(
            r#"
            UPDATE streamings
            SET
                name = COALESCE($2, name),
                platform = COALESCE($3, platform),
                description = COALESCE($4, description),
                logo_url = COALESCE($5, logo_url),
                website_url = COALESCE($6, website_url),
                monthly_price_cents = COALESCE($7, monthly_price_cents),
                max_users = COALESCE($8, max_users),
                max_screens = COALESCE($9, max_screens),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STREAMING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.platform.as_deref().map(str::trim))
        .bind(req.description.as_deref())
        .bind(req.logo_url.as_deref())
        .bind(req.website_url.as_deref())
        .bind(req.monthly_price_cents)
        .bind(req.max_users)
        .bind(req.max_screens)
        .bind(req.is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft-disable a catalog entry.
    pub async fn deactivate(&self, id: Uuid) -> Result<Option<StreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_streaming");
        let result = sqlx::query_as::<_, StreamingEntity>(&format!(
            r#"
            UPDATE streamings
            SET is_active = false, updated_at = NOW()
            WHERE id = $1
            RETURNING {STREAMING_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upsert the built-in catalog by name, reactivating existing entries.
    pub async fn reset_catalog(&self, seeds: &[CatalogSeed]) -> Result<CatalogResetCounts, sqlx::Error> {
        let timer = QueryTimer::new("reset_streaming_catalog");
        let mut tx = self.pool.begin().await?;
        let mut counts = CatalogResetCounts::default();

        for seed in seeds {
            // xmax is zero only for freshly inserted tuples
            let inserted = sqlx::query_scalar::<_, bool>(
                r#"
                INSERT INTO streamings (name, platform, description, website_url,
                                        monthly_price_cents, max_users, max_screens, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, true)
                ON CONFLICT (name) DO UPDATE
                SET platform = EXCLUDED.platform,
                    description = EXCLUDED.description,
                    website_url = EXCLUDED.website_url,
                    monthly_price_cents = EXCLUDED.monthly_price_cents,
                    max_users = EXCLUDED.max_users,
                    max_screens = EXCLUDED.max_screens,
                    is_active = true,
                    updated_at = NOW()
                RETURNING (xmax = 0) AS inserted
                "#,
            )
            .bind(seed.name)
            .bind(seed.platform)
            .bind(seed.description)
            .bind(seed.website_url)
            .bind(seed.monthly_price_cents)
            .bind(seed.max_users)
            .bind(seed.max_screens)
            .fetch_one(&mut *tx)
            .await?;

            if inserted {
                counts.created += 1;
            } else {
                counts.updated += 1;
            }
        }

        tx.commit().await?;
        timer.record();
        Ok(counts)
    }

    /// Hard-delete the whole catalog with its group links and deliveries.
    pub async fn purge_all(&self) -> Result<StreamingPurgeCounts, sqlx::Error> {
        let timer = QueryTimer::new("purge_streamings");
        let mut tx = self.pool.begin().await?;

        sqlx::query("LOCK TABLE access_deliveries, group_streamings, streamings IN ACCESS EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let access_deliveries = sqlx::query("DELETE FROM access_deliveries")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let group_streamings = sqlx::query("DELETE FROM group_streamings")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let streamings = sqlx::query("DELETE FROM streamings")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(StreamingPurgeCounts {
            streamings,
            group_streamings,
            access_deliveries,
        })
    }
}
