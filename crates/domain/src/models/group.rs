//! Group domain models for subscription sharing groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::PageInfo;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::user::UserPublic;

/// Default seat count for a new group (creator included).
pub const DEFAULT_MAX_MEMBERS: i32 = 4;

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Owner,
    Admin,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Owner => "owner",
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        }
    }

    /// Returns true if this role can approve join requests, link streamings
    /// and send access data.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, GroupRole::Owner | GroupRole::Admin)
    }

    /// Returns true if this role can change other members' roles.
    pub fn can_assign_roles(&self) -> bool {
        matches!(self, GroupRole::Owner)
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(GroupRole::Owner),
            "admin" => Ok(GroupRole::Admin),
            "member" => Ok(GroupRole::Member),
            _ => Err(format!("Invalid group role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Roles that may be granted through role assignment. OWNER is only ever
/// given to the creator when the group is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    Admin,
    Member,
}

impl From<AssignableRole> for GroupRole {
    fn from(role: AssignableRole) -> Self {
        match role {
            AssignableRole::Admin => GroupRole::Admin,
            AssignableRole::Member => GroupRole::Member,
        }
    }
}

/// A cost-sharing collective for one or more subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamingGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_members: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents a user's membership in a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupMembership {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 2, max = 50, message = "Max members must be between 2 and 50"))]
    pub max_members: Option<i32>,
}

/// Response for group listing (minimal info).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_members: i32,
    pub member_count: i64,
    pub your_role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Response for listing groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListGroupsResponse {
    pub data: Vec<GroupSummary>,
    pub count: usize,
}

/// Basic membership info for group responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MembershipInfo {
    pub id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Streaming shared inside a group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupStreamingInfo {
    pub streaming_id: Uuid,
    pub name: String,
    pub platform: String,
    pub monthly_price_cents: i64,
    pub max_screens: i32,
    pub is_active: bool,
}

/// Response for group detail and creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_members: i32,
    pub member_count: i64,
    pub available_seats: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub streamings: Vec<GroupStreamingInfo>,
    pub your_membership: MembershipInfo,
}

/// Member response in list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberResponse {
    pub membership_id: Uuid,
    pub user: UserPublic,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Response for listing members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListMembersResponse {
    pub data: Vec<MemberResponse>,
    pub pagination: PageInfo,
}

/// Response when removing a member or leaving a group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoveMemberResponse {
    pub removed: bool,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub message: String,
}

/// Request to update a member's role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRoleRequest {
    pub role: AssignableRole,
}

/// Response after updating a member's role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateRoleResponse {
    pub membership_id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub role: GroupRole,
    pub updated_at: DateTime<Utc>,
}

/// Link between a group and a catalog streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupStreaming {
    pub id: Uuid,
    pub group_id: Uuid,
    pub streaming_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to share a catalog streaming inside a group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LinkStreamingRequest {
    pub streaming_id: Uuid,
}

/// Request to toggle whether a shared streaming is currently in force.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGroupStreamingRequest {
    pub is_active: bool,
}

/// Group row in the admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminGroupItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_members: i32,
    pub member_count: i64,
    pub streaming_count: i64,
    pub pending_requests: i64,
    pub created_by: Uuid,
    pub owner_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response for the admin group listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminListGroupsResponse {
    pub data: Vec<AdminGroupItem>,
    pub pagination: PageInfo,
}
