//! Platform-wide maintenance and statistics.

use domain::models::admin::PurgeCounts;
use sqlx::PgPool;
use tracing::info;

use crate::entities::AdminStatsEntity;
use crate::metrics::{record_workflow_event, QueryTimer};

/// Repository for whole-dataset operations.
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    /// Creates a new AdminRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Delete every group with everything hanging off it.
    ///
    /// Children go before parents (deliveries, join requests, group streaming
    /// links, memberships, groups) inside one transaction, and the counts are
    /// the rows actually deleted. The tables are locked up front so a
    /// concurrent insert cannot land between two deletes and trip a foreign
    /// key.
    pub async fn purge_groups(&self) -> Result<PurgeCounts, sqlx::Error> {
        let timer = QueryTimer::new("purge_groups");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            LOCK TABLE access_deliveries, join_requests, group_streamings,
                group_memberships, streaming_groups
            IN ACCESS EXCLUSIVE MODE
            "#,
        )
        .execute(&mut *tx)
        .await?;

        let access_deliveries = sqlx::query("DELETE FROM access_deliveries")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let join_requests = sqlx::query("DELETE FROM join_requests")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let group_streamings = sqlx::query("DELETE FROM group_streamings")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let group_users = sqlx::query("DELETE FROM group_memberships")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let groups = sqlx::query("DELETE FROM streaming_groups")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        timer.record();
        record_workflow_event("maintenance", "groups_purged");

        let counts = PurgeCounts {
            groups,
            group_users,
            group_streamings,
            join_requests,
            access_deliveries,
        };
        info!(?counts, "Purged all groups");
        Ok(counts)
    }

    /// Platform-wide counters.
    pub async fn stats(&self) -> Result<AdminStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("admin_stats");
        let result = sqlx::query_as::<_, AdminStatsEntity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM streaming_groups) AS groups,
                (SELECT COUNT(*) FROM group_memberships) AS memberships,
                (SELECT COUNT(*) FROM join_requests WHERE status = 'pending') AS pending_join_requests,
                (SELECT COUNT(*) FROM streamings WHERE is_active) AS active_streamings,
                (SELECT COUNT(*) FROM access_deliveries
                  WHERE is_current AND status = 'sent') AS deliveries_sent,
                (SELECT COUNT(*) FROM access_deliveries
                  WHERE is_current AND status = 'confirmed') AS deliveries_confirmed,
                (SELECT COUNT(*) FROM access_deliveries
                  WHERE is_current AND status = 'sent' AND deadline < NOW()) AS deliveries_overdue
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
