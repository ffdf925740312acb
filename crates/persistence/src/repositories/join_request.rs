//! Join request repository: submission and the approve/deny workflow.

use domain::models::join_request::JoinRequestStatus;
use domain::services::membership_policy::{self, JoinRequestPolicy};
use domain::DomainError;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{
    GroupEntity, GroupMembershipEntity, JoinRequestEntity, JoinRequestStatusDb,
    JoinRequestWithDetailsEntity,
};
use crate::error::WorkflowError;
use crate::metrics::{record_transaction_retry, record_workflow_event, QueryTimer};

const JOIN_REQUEST_COLUMNS: &str =
    "id, group_id, user_id, status, message, requested_at, responded_by, responded_at";

/// Repository for join request database operations.
#[derive(Clone)]
pub struct JoinRequestRepository {
    pool: PgPool,
}

impl JoinRequestRepository {
    /// Creates a new JoinRequestRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Submit a pending request for `user_id` to join `group_id`.
    ///
    /// Capacity is not checked here; it is checked at approval time. A racing
    /// duplicate is rejected by the one-pending-per-pair index.
    pub async fn create(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        message: Option<&str>,
        policy: JoinRequestPolicy,
    ) -> Result<JoinRequestEntity, WorkflowError> {
        let timer = QueryTimer::new("create_join_request");
        let mut tx = self.pool.begin().await?;

        let group_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM streaming_groups WHERE id = $1)")
                .bind(group_id)
                .fetch_one(&mut *tx)
                .await?;
        if !group_exists {
            return Err(DomainError::NotFound("Group".to_string()).into());
        }

        let is_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_memberships WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let previous: Vec<JoinRequestStatus> = sqlx::query_scalar::<_, JoinRequestStatusDb>(
            "SELECT status FROM join_requests WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        policy.check(is_member, &previous)?;

        let request = sqlx::query_as::<_, JoinRequestEntity>(&format!(
            r#"
            INSERT INTO join_requests (group_id, user_id, message)
            VALUES ($1, $2, $3)
            RETURNING {JOIN_REQUEST_COLUMNS}
            "#
        ))
        .bind(group_id)
        .bind(user_id)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        record_workflow_event("join_request", "created");
        Ok(request)
    }

    /// Find a join request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<JoinRequestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_join_request_by_id");
        let result = sqlx::query_as::<_, JoinRequestEntity>(&format!(
            "SELECT {JOIN_REQUEST_COLUMNS} FROM join_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All requests submitted by a user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<JoinRequestWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_join_requests_for_user");
        let result = sqlx::query_as::<_, JoinRequestWithDetailsEntity>(
            r#"
            SELECT jr.id, jr.group_id, g.name as group_name, jr.user_id,
                   u.display_name as user_display_name, jr.status, jr.message,
                   jr.requested_at, jr.responded_by, jr.responded_at
            FROM join_requests jr
            JOIN streaming_groups g ON jr.group_id = g.id
            JOIN users u ON jr.user_id = u.id
            WHERE jr.user_id = $1
            ORDER BY jr.requested_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Requests for a group, optionally filtered by status, oldest first.
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        status: Option<JoinRequestStatus>,
    ) -> Result<Vec<JoinRequestWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_join_requests_for_group");
        let status_db: Option<JoinRequestStatusDb> = status.map(Into::into);
        let result = sqlx::query_as::<_, JoinRequestWithDetailsEntity>(
            r#"
            SELECT jr.id, jr.group_id, g.name as group_name, jr.user_id,
                   u.display_name as user_display_name, jr.status, jr.message,
                   jr.requested_at, jr.responded_by, jr.responded_at
            FROM join_requests jr
            JOIN streaming_groups g ON jr.group_id = g.id
            JOIN users u ON jr.user_id = u.id
            WHERE jr.group_id = $1 AND ($2::join_request_status IS NULL OR jr.status = $2)
            ORDER BY jr.requested_at ASC
            "#,
        )
        .bind(group_id)
        .bind(status_db)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approve a pending request and add the requester as MEMBER.
    ///
    /// Runs as one transaction holding the group row lock, so concurrent
    /// approvals for the same group are serialized and the capacity check
    /// sees every committed membership. On `CapacityExceeded` the request is
    /// left pending. Serialization failures and deadlocks are retried up to
    /// `max_attempts` times in total.
    pub async fn approve(
        &self,
        request_id: Uuid,
        responder_id: Uuid,
        max_attempts: u32,
    ) -> Result<(JoinRequestEntity, GroupMembershipEntity), WorkflowError> {
        let timer = QueryTimer::new("approve_join_request");
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        let result = loop {
            match self.approve_once(request_id, responder_id).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        request_id = %request_id,
                        attempt,
                        error = %e,
                        "Retrying join request approval"
                    );
                    record_transaction_retry("approve_join_request");
                    attempt += 1;
                }
                other => break other,
            }
        };

        timer.record();
        match &result {
            Ok(_) => record_workflow_event("join_request", "approved"),
            Err(WorkflowError::Domain(DomainError::CapacityExceeded { .. })) => {
                record_workflow_event("join_request", "capacity_exceeded")
            }
            Err(_) => {}
        }
        result
    }

    async fn approve_once(
        &self,
        request_id: Uuid,
        responder_id: Uuid,
    ) -> Result<(JoinRequestEntity, GroupMembershipEntity), WorkflowError> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, JoinRequestEntity>(&format!(
            "SELECT {JOIN_REQUEST_COLUMNS} FROM join_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound("Join request".to_string()))?;

        membership_policy::ensure_pending(request.status.into())?;

        let group = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, description, max_members, created_by, created_at, updated_at
            FROM streaming_groups
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(request.group_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound("Group".to_string()))?;

        let member_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM group_memberships WHERE group_id = $1",
        )
        .bind(group.id)
        .fetch_one(&mut *tx)
        .await?;

        membership_policy::ensure_capacity(member_count, group.max_members)?;

        let approved = sqlx::query_as::<_, JoinRequestEntity>(&format!(
            r#"
            UPDATE join_requests
            SET status = 'approved', responded_by = $2, responded_at = NOW()
            WHERE id = $1
            RETURNING {JOIN_REQUEST_COLUMNS}
            "#
        ))
        .bind(request.id)
        .bind(responder_id)
        .fetch_one(&mut *tx)
        .await?;

        let membership = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            INSERT INTO group_memberships (group_id, user_id, role)
            VALUES ($1, $2, 'member')
            RETURNING id, group_id, user_id, role, joined_at, updated_at
            "#,
        )
        .bind(group.id)
        .bind(request.user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(
            request_id = %request_id,
            group_id = %group.id,
            member_count = member_count + 1,
            max_members = group.max_members,
            "Join request approved"
        );
        Ok((approved, membership))
    }

    /// Deny a pending request. Resolved requests are never resolved again.
    pub async fn deny(
        &self,
        request_id: Uuid,
        responder_id: Uuid,
    ) -> Result<JoinRequestEntity, WorkflowError> {
        let timer = QueryTimer::new("deny_join_request");
        let denied = sqlx::query_as::<_, JoinRequestEntity>(&format!(
            r#"
            UPDATE join_requests
            SET status = 'denied', responded_by = $2, responded_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {JOIN_REQUEST_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(responder_id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        match denied {
            Some(request) => {
                record_workflow_event("join_request", "denied");
                Ok(request)
            }
            None => match self.find_by_id(request_id).await? {
                Some(existing) => {
                    membership_policy::ensure_pending(existing.status.into())?;
                    // Pending again means a concurrent writer raced us; report it.
                    Err(DomainError::StateConflict(
                        "Join request changed concurrently".to_string(),
                    )
                    .into())
                }
                None => Err(DomainError::NotFound("Join request".to_string()).into()),
            },
        }
    }
}
