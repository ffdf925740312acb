//! Platform-wide aggregate rows.

use sqlx::FromRow;

/// Counters for the admin dashboard.
#[derive(Debug, Clone, FromRow)]
pub struct AdminStatsEntity {
    pub users: i64,
    pub groups: i64,
    pub memberships: i64,
    pub pending_join_requests: i64,
    pub active_streamings: i64,
    pub deliveries_sent: i64,
    pub deliveries_confirmed: i64,
    pub deliveries_overdue: i64,
}

impl From<AdminStatsEntity> for domain::models::admin::AdminStats {
    fn from(entity: AdminStatsEntity) -> Self {
        Self {
            users: entity.users,
            groups: entity.groups,
            memberships: entity.memberships,
            pending_join_requests: entity.pending_join_requests,
            active_streamings: entity.active_streamings,
            deliveries_sent: entity.deliveries_sent,
            deliveries_confirmed: entity.deliveries_confirmed,
            deliveries_overdue: entity.deliveries_overdue,
        }
    }
}
