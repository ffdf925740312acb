//! Group entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::group::{
    AdminGroupItem, GroupRole, GroupStreaming, GroupStreamingInfo, MemberResponse,
};
use domain::models::user::UserPublic;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Owner,
    Admin,
    Member,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Owner => GroupRole::Owner,
            GroupRoleDb::Admin => GroupRole::Admin,
            GroupRoleDb::Member => GroupRole::Member,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Owner => GroupRoleDb::Owner,
            GroupRole::Admin => GroupRoleDb::Admin,
            GroupRole::Member => GroupRoleDb::Member,
        }
    }
}

/// Database row mapping for the streaming_groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_members: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::StreamingGroup {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            max_members: entity.max_members,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the group_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupMembershipEntity> for domain::models::GroupMembership {
    fn from(entity: GroupMembershipEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            joined_at: entity.joined_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Group with the requesting user's membership and member count.
#[derive(Debug, Clone, FromRow)]
pub struct GroupWithMembershipEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub max_members: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Membership fields
    pub membership_id: Uuid,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
    // Aggregates
    pub member_count: i64,
}

/// Member entity with user info for listing members.
#[derive(Debug, Clone, FromRow)]
pub struct MemberWithUserEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
    pub display_name: Option<String>,
}

impl From<MemberWithUserEntity> for MemberResponse {
    fn from(entity: MemberWithUserEntity) -> Self {
        Self {
            membership_id: entity.id,
            user: UserPublic {
                id: entity.user_id,
                display_name: entity.display_name,
            },
            role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}

/// Database row mapping for the group_streamings table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupStreamingEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub streaming_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupStreamingEntity> for GroupStreaming {
    fn from(entity: GroupStreamingEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            streaming_id: entity.streaming_id,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Group streaming link joined with its catalog entry.
#[derive(Debug, Clone, FromRow)]
pub struct GroupStreamingInfoEntity {
    pub streaming_id: Uuid,
    pub name: String,
    pub platform: String,
    pub monthly_price_cents: i64,
    pub max_screens: i32,
    pub is_active: bool,
}

impl From<GroupStreamingInfoEntity> for GroupStreamingInfo {
    fn from(entity: GroupStreamingInfoEntity) -> Self {
        Self {
            streaming_id: entity.streaming_id,
            name: entity.name,
            platform: entity.platform,
            monthly_price_cents: entity.monthly_price_cents,
            max_screens: entity.max_screens,
            is_active: entity.is_active,
        }
    }
}

/// Group row with aggregates for the admin listing.
#[derive(Debug, Clone, FromRow)]
pub struct AdminGroupEntity {
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

impl From<AdminGroupEntity> for AdminGroupItem {
    fn from(entity: AdminGroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            max_members: entity.max_members,
            member_count: entity.member_count,
            streaming_count: entity.streaming_count,
            pending_requests: entity.pending_requests,
            created_by: entity.created_by,
            owner_email: entity.owner_email,
            created_at: entity.created_at,
        }
    }
}
