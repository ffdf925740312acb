//! Join request domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::group::GroupRole;
use super::user::UserPublic;

/// Resolution state of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Denied,
}

impl JoinRequestStatus {
    /// Approved and denied requests are never resolved again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JoinRequestStatus::Pending)
    }
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinRequestStatus::Pending => write!(f, "pending"),
            JoinRequestStatus::Approved => write!(f, "approved"),
            JoinRequestStatus::Denied => write!(f, "denied"),
        }
    }
}

/// A request by a user to join a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinRequest {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub status: JoinRequestStatus,
    pub message: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub responded_by: Option<Uuid>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// Request body for asking to join a group.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateJoinRequestRequest {
    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

/// Brief group info embedded in join request listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinRequestGroupInfo {
    pub id: Uuid,
    pub name: String,
}

/// Join request item for listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinRequestItem {
    pub id: Uuid,
    pub group: JoinRequestGroupInfo,
    pub user: UserPublic,
    pub status: JoinRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

/// Response for listing join requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListJoinRequestsResponse {
    pub join_requests: Vec<JoinRequestItem>,
}

/// Query parameters for listing a group's join requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListJoinRequestsQuery {
    #[serde(default)]
    pub status: Option<JoinRequestStatus>,
}

/// Response after approving or denying a join request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RespondToJoinRequestResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub status: JoinRequestStatus,
    pub responded_by: Uuid,
    pub responded_at: DateTime<Utc>,
    /// Membership created by an approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<GroupRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(JoinRequestStatus::Pending.to_string(), "pending");
        assert_eq!(JoinRequestStatus::Approved.to_string(), "approved");
        assert_eq!(JoinRequestStatus::Denied.to_string(), "denied");
    }

    #[test]
    fn test_status_terminality() {
        assert!(!JoinRequestStatus::Pending.is_terminal());
        assert!(JoinRequestStatus::Approved.is_terminal());
        assert!(JoinRequestStatus::Denied.is_terminal());
    }

    #[test]
    fn test_create_request_accepts_empty_body() {
        let req: CreateJoinRequestRequest = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_message_too_long() {
        let req = CreateJoinRequestRequest {
            message: Some("x".repeat(501)),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_list_query_status_filter() {
        let query: ListJoinRequestsQuery = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(query.status, Some(JoinRequestStatus::Pending));
    }
}
