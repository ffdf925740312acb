//! Platform administration models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Envelope for maintenance operations. These always answer 200; callers
/// branch on `success`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MaintenanceResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> MaintenanceResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Rows deleted by a group purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PurgeCounts {
    pub groups: u64,
    pub group_users: u64,
    pub group_streamings: u64,
    pub join_requests: u64,
    pub access_deliveries: u64,
}

/// Rows deleted by a catalog purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamingPurgeCounts {
    pub streamings: u64,
    pub group_streamings: u64,
    pub access_deliveries: u64,
}

/// Result of re-seeding the default catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogResetCounts {
    pub created: u64,
    pub updated: u64,
}

/// Platform-wide counters.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminStats {
    pub users: i64,
    pub groups: i64,
    pub memberships: i64,
    pub pending_join_requests: i64,
    pub active_streamings: i64,
    pub deliveries_sent: i64,
    pub deliveries_confirmed: i64,
    pub deliveries_overdue: i64,
}

/// Request to grant platform admin rights to an email.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AdminEmailRequest {
    #[validate(custom(function = "shared::validation::validate_email_address"))]
    pub email: String,
}

/// Entry of the privileged identity allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PrivilegedIdentity {
    pub email: String,
    pub added_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response for listing admins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListAdminsResponse {
    pub admins: Vec<PrivilegedIdentity>,
}

/// Response after granting or revoking admin rights.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminEmailResponse {
    pub email: String,
    /// False when the call was a no-op.
    pub changed: bool,
}
