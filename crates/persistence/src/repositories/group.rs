//! Group repository for database operations.

use domain::models::group::{AssignableRole, GroupRole};
use domain::services::membership_policy;
use domain::DomainError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{
    AdminGroupEntity, GroupEntity, GroupMembershipEntity, GroupRoleDb, GroupStreamingEntity,
    GroupStreamingInfoEntity, GroupWithMembershipEntity, MemberWithUserEntity,
};
use crate::error::WorkflowError;
use crate::metrics::QueryTimer;

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a new group and add the creator as owner.
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        max_members: i32,
        created_by: Uuid,
    ) -> Result<(GroupEntity, GroupMembershipEntity), sqlx::Error> {
        let timer = QueryTimer::new("create_group");

        // Group and owner membership are created atomically
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO streaming_groups (name, description, max_members, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, max_members, created_by, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(max_members)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let membership = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            INSERT INTO group_memberships (group_id, user_id, role)
            VALUES ($1, $2, 'owner')
            RETURNING id, group_id, user_id, role, joined_at, updated_at
            "#,
        )
        .bind(group.id)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok((group, membership))
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, description, max_members, created_by, created_at, updated_at
            FROM streaming_groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all groups a user belongs to.
    pub async fn find_user_groups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupWithMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_groups");
        let result = sqlx::query_as::<_, GroupWithMembershipEntity>(
            r#"
            SELECT
                g.id, g.name, g.description, g.max_members, g.created_by, g.created_at, g.updated_at,
                gm.id as membership_id, gm.role, gm.joined_at,
                (SELECT COUNT(*) FROM group_memberships WHERE group_id = g.id) as member_count
            FROM streaming_groups g
            JOIN group_memberships gm ON g.id = gm.group_id
            WHERE gm.user_id = $1
            ORDER BY gm.joined_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find group with membership info for a specific user.
    pub async fn find_group_with_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupWithMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_with_membership");
        let result = sqlx::query_as::<_, GroupWithMembershipEntity>(
            r#"
            SELECT
                g.id, g.name, g.description, g.max_members, g.created_by, g.created_at, g.updated_at,
                gm.id as membership_id, gm.role, gm.joined_at,
                (SELECT COUNT(*) FROM group_memberships WHERE group_id = g.id) as member_count
            FROM streaming_groups g
            JOIN group_memberships gm ON g.id = gm.group_id
            WHERE g.id = $1 AND gm.user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Get user's membership for a group.
    pub async fn get_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_group_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT id, group_id, user_id, role, joined_at, updated_at
            FROM group_memberships
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a membership by its own ID.
    pub async fn find_membership_by_id(
        &self,
        membership_id: Uuid,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_membership_by_id");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT id, group_id, user_id, role, joined_at, updated_at
            FROM group_memberships
            WHERE id = $1
            "#,
        )
        .bind(membership_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count members of a group.
    pub async fn count_members(&self, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_group_members");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM group_memberships
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List members of a group with pagination, owner first.
    pub async fn list_members(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, MemberWithUserEntity>(
            r#"
            SELECT gm.id, gm.group_id, gm.user_id, gm.role, gm.joined_at, u.display_name
            FROM group_memberships gm
            JOIN users u ON gm.user_id = u.id
            WHERE gm.group_id = $1
            ORDER BY gm.role ASC, gm.joined_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(group_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Change a member's role on behalf of `actor_id`.
    pub async fn update_member_role(
        &self,
        group_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
        new_role: AssignableRole,
    ) -> Result<GroupMembershipEntity, WorkflowError> {
        let timer = QueryTimer::new("update_member_role");
        let mut tx = self.pool.begin().await?;

        let actor = lock_membership(&mut tx, group_id, actor_id)
            .await?
            .ok_or_else(|| DomainError::AccessDenied("Not a member of this group".to_string()))?;
        let target = lock_membership(&mut tx, group_id, target_user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership".to_string()))?;

        let role = membership_policy::check_role_change(
            actor.role.into(),
            target.role.into(),
            new_role,
        )?;
        let role_db: GroupRoleDb = role.into();

        let updated = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            UPDATE group_memberships
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, group_id, user_id, role, joined_at, updated_at
            "#,
        )
        .bind(target.id)
        .bind(role_db)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(updated)
    }

    /// Remove a member (administrative). Fails with NotFound when the pair
    /// has no membership; the owner cannot be removed.
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupMembershipEntity, WorkflowError> {
        let timer = QueryTimer::new("remove_group_member");
        let result = self
            .delete_membership(group_id, user_id, membership_policy::check_removal)
            .await;
        timer.record();
        result
    }

    /// Leave a group. The owner cannot leave.
    pub async fn leave_group(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupMembershipEntity, WorkflowError> {
        let timer = QueryTimer::new("leave_group");
        let result = self
            .delete_membership(group_id, user_id, membership_policy::check_leave)
            .await;
        timer.record();
        result
    }

    async fn delete_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        rule: fn(GroupRole) -> Result<(), DomainError>,
    ) -> Result<GroupMembershipEntity, WorkflowError> {
        let mut tx = self.pool.begin().await?;

        let membership = lock_membership(&mut tx, group_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Membership".to_string()))?;
        rule(membership.role.into())?;

        sqlx::query("DELETE FROM access_deliveries WHERE membership_id = $1")
            .bind(membership.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM group_memberships WHERE id = $1")
            .bind(membership.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(membership)
    }

    /// IDs of groups where the user is owner or admin.
    pub async fn find_managed_group_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_managed_group_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT group_id
            FROM group_memberships
            WHERE user_id = $1 AND role IN ('owner', 'admin')
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    // =========================================================================
    // Group streaming links
    // =========================================================================

    /// Streamings shared in a group, with catalog details.
    pub async fn list_group_streamings(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<GroupStreamingInfoEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_streamings");
        let result = sqlx::query_as::<_, GroupStreamingInfoEntity>(
            r#"
            SELECT s.id as streaming_id, s.name, s.platform, s.monthly_price_cents, s.max_screens,
                   gs.is_active
            FROM group_streamings gs
            JOIN streamings s ON gs.streaming_id = s.id
            WHERE gs.group_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the link between a group and a streaming.
    pub async fn find_group_streaming(
        &self,
        group_id: Uuid,
        streaming_id: Uuid,
    ) -> Result<Option<GroupStreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_streaming");
        let result = sqlx::query_as::<_, GroupStreamingEntity>(
            r#"
            SELECT id, group_id, streaming_id, is_active, created_at, updated_at
            FROM group_streamings
            WHERE group_id = $1 AND streaming_id = $2
            "#,
        )
        .bind(group_id)
        .bind(streaming_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Share a streaming in a group. Re-linking reactivates an existing link.
    pub async fn link_streaming(
        &self,
        group_id: Uuid,
        streaming_id: Uuid,
    ) -> Result<GroupStreamingEntity, sqlx::Error> {
        let timer = QueryTimer::new("link_group_streaming");
        let result = sqlx::query_as::<_, GroupStreamingEntity>(
            r#"
            INSERT INTO group_streamings (group_id, streaming_id)
            VALUES ($1, $2)
            ON CONFLICT (group_id, streaming_id) DO UPDATE
            SET is_active = true, updated_at = NOW()
            RETURNING id, group_id, streaming_id, is_active, created_at, updated_at
            "#,
        )
        .bind(group_id)
        .bind(streaming_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set whether a shared streaming is in force.
    pub async fn set_group_streaming_active(
        &self,
        group_id: Uuid,
        streaming_id: Uuid,
        is_active: bool,
    ) -> Result<Option<GroupStreamingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_group_streaming_active");
        let result = sqlx::query_as::<_, GroupStreamingEntity>(
            r#"
            UPDATE group_streamings
            SET is_active = $3, updated_at = NOW()
            WHERE group_id = $1 AND streaming_id = $2
            RETURNING id, group_id, streaming_id, is_active, created_at, updated_at
            "#,
        )
        .bind(group_id)
        .bind(streaming_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    // =========================================================================
    // Admin listing
    // =========================================================================

    /// List all groups with aggregates, newest first.
    pub async fn list_all_admin(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminGroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups_admin");
        let result = sqlx::query_as::<_, AdminGroupEntity>(
            r#"
            SELECT
                g.id, g.name, g.description, g.max_members, g.created_by, g.created_at,
                u.email as owner_email,
                (SELECT COUNT(*) FROM group_memberships gm WHERE gm.group_id = g.id) as member_count,
                (SELECT COUNT(*) FROM group_streamings gs WHERE gs.group_id = g.id) as streaming_count,
                (SELECT COUNT(*) FROM join_requests jr
                  WHERE jr.group_id = g.id AND jr.status = 'pending') as pending_requests
            FROM streaming_groups g
            LEFT JOIN users u ON g.created_by = u.id
            ORDER BY g.created_at DESC, g.id
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

    /// Count all groups.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_groups");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM streaming_groups")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}

/// Reads a membership row under `FOR UPDATE`.
async fn lock_membership(
    tx: &mut Transaction<'_, Postgres>,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
    sqlx::query_as::<_, GroupMembershipEntity>(
        r#"
        SELECT id, group_id, user_id, role, joined_at, updated_at
        FROM group_memberships
        WHERE group_id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
}
