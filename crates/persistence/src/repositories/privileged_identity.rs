//! Persisted platform admin allow-list.

use async_trait::async_trait;
use domain::models::PrivilegedIdentity;
use domain::services::{AdminAuthority, AuthorityError};
use sqlx::PgPool;

use crate::entities::PrivilegedIdentityEntity;
use crate::metrics::QueryTimer;

/// Repository for the privileged_identities table.
#[derive(Clone)]
pub struct PrivilegedIdentityRepository {
    pool: PgPool,
}

impl PrivilegedIdentityRepository {
    /// Creates a new PrivilegedIdentityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check whether an email is on the allow-list.
    pub async fn exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("privileged_identity_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM privileged_identities WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert an email. Returns false if it was already present.
    pub async fn insert(&self, email: &str, added_by: Option<&str>) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("insert_privileged_identity");
        let result = sqlx::query(
            r#"
            INSERT INTO privileged_identities (email, added_by)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(added_by)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected() == 1);
        timer.record();
        result
    }

    /// Delete an email. Returns false if it was absent.
    pub async fn delete(&self, email: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_privileged_identity");
        let result = sqlx::query("DELETE FROM privileged_identities WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() == 1);
        timer.record();
        result
    }

    /// All entries, by email.
    pub async fn list_all(&self) -> Result<Vec<PrivilegedIdentityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_privileged_identities");
        let result = sqlx::query_as::<_, PrivilegedIdentityEntity>(
            "SELECT email, added_by, created_at FROM privileged_identities ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

fn store_error(e: sqlx::Error) -> AuthorityError {
    AuthorityError::Store(e.to_string())
}

#[async_trait]
impl AdminAuthority for PrivilegedIdentityRepository {
    async fn is_privileged(&self, email: &str) -> Result<bool, AuthorityError> {
        self.exists(email).await.map_err(store_error)
    }

    async fn grant(&self, email: &str, added_by: Option<&str>) -> Result<bool, AuthorityError> {
        self.insert(email, added_by).await.map_err(store_error)
    }

    async fn revoke(&self, email: &str) -> Result<bool, AuthorityError> {
        self.delete(email).await.map_err(store_error)
    }

    async fn list(&self) -> Result<Vec<PrivilegedIdentity>, AuthorityError> {
        self.list_all()
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(store_error)
    }
}
