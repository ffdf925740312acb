//! User repository for database operations.

use domain::models::PrincipalIdentity;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AdminUserEntity, UserEntity};
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, external_id, email, display_name, credits, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by the identity provider's principal id, without creating it.
    pub async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_external_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, external_id, email, display_name, credits, created_at, updated_at
            FROM users
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Resolve a principal to its user row, creating it on first sight.
    ///
    /// Idempotent on `external_id`; email and display name are refreshed from
    /// the principal. A clash on email with a different principal surfaces as
    /// a unique violation.
    pub async fn upsert_from_principal(
        &self,
        identity: &PrincipalIdentity,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_user_from_principal");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (external_id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (external_id) DO UPDATE
            SET email = EXCLUDED.email,
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                updated_at = CASE
                    WHEN users.email IS DISTINCT FROM EXCLUDED.email
                      OR users.display_name IS DISTINCT FROM COALESCE(EXCLUDED.display_name, users.display_name)
                    THEN NOW()
                    ELSE users.updated_at
                END
            RETURNING id, external_id, email, display_name, credits, created_at, updated_at
            "#,
        )
        .bind(&identity.external_id)
        .bind(&identity.email)
        .bind(identity.display_name.as_deref())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List users with membership counts, newest first.
    pub async fn list_with_group_counts(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users_admin");
        let result = sqlx::query_as::<_, AdminUserEntity>(
            r#"
            SELECT
                u.id, u.external_id, u.email, u.display_name, u.credits, u.created_at,
                (SELECT COUNT(*) FROM group_memberships gm WHERE gm.user_id = u.id) AS group_count
            FROM users u
            ORDER BY u.created_at DESC, u.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
