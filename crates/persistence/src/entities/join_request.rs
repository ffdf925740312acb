//! Join request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::join_request::{
    JoinRequest, JoinRequestGroupInfo, JoinRequestItem, JoinRequestStatus,
};
use domain::models::user::UserPublic;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for join_request_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "join_request_status", rename_all = "lowercase")]
pub enum JoinRequestStatusDb {
    Pending,
    Approved,
    Denied,
}

impl From<JoinRequestStatusDb> for JoinRequestStatus {
    fn from(status: JoinRequestStatusDb) -> Self {
        match status {
            JoinRequestStatusDb::Pending => JoinRequestStatus::Pending,
            JoinRequestStatusDb::Approved => JoinRequestStatus::Approved,
            JoinRequestStatusDb::Denied => JoinRequestStatus::Denied,
        }
    }
}

impl From<JoinRequestStatus> for JoinRequestStatusDb {
    fn from(status: JoinRequestStatus) -> Self {
        match status {
            JoinRequestStatus::Pending => JoinRequestStatusDb::Pending,
            JoinRequestStatus::Approved => JoinRequestStatusDb::Approved,
            JoinRequestStatus::Denied => JoinRequestStatusDb::Denied,
        }
    }
}

/// Database row mapping for the join_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct JoinRequestEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub status: JoinRequestStatusDb,
    pub message: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub responded_by: Option<Uuid>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<JoinRequestEntity> for JoinRequest {
    fn from(entity: JoinRequestEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            status: entity.status.into(),
            message: entity.message,
            requested_at: entity.requested_at,
            responded_by: entity.responded_by,
            responded_at: entity.responded_at,
        }
    }
}

/// Join request with group and requester info for listings.
#[derive(Debug, Clone, FromRow)]
pub struct JoinRequestWithDetailsEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub group_name: String,
    pub user_id: Uuid,
    pub user_display_name: Option<String>,
    pub status: JoinRequestStatusDb,
    pub message: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub responded_by: Option<Uuid>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<JoinRequestWithDetailsEntity> for JoinRequestItem {
    fn from(entity: JoinRequestWithDetailsEntity) -> Self {
        Self {
            id: entity.id,
            group: JoinRequestGroupInfo {
                id: entity.group_id,
                name: entity.group_name,
            },
            user: UserPublic {
                id: entity.user_id,
                display_name: entity.user_display_name,
            },
            status: entity.status.into(),
            message: entity.message,
            requested_at: entity.requested_at,
            responded_by: entity.responded_by,
            responded_at: entity.responded_at,
        }
    }
}
