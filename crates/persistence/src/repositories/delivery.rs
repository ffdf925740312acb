//! Access delivery repository.
//!
//! Deliveries are never updated in place except for their confirmation
//! fields; a new delivery for the same (membership, streaming) pair moves the
//! current flag to the new row and keeps the old one for audit.

use chrono::{DateTime, Utc};
use domain::models::delivery::{CreateDeliveryRequest, DeliveryStatus, UpdateDeliveryRequest};
use domain::services::delivery_workflow::{self, ConfirmAction};
use domain::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    AccessDeliveryEntity, DeliveryChannelDb, DeliveryPairEntity, DeliveryStatusDb,
    GroupMembershipEntity,
};
use crate::error::WorkflowError;
use crate::metrics::{record_workflow_event, QueryTimer};

const DELIVERY_COLUMNS: &str = "id, membership_id, group_id, streaming_id, channel, content, \
    is_invite_link, notes, status, deadline, is_current, sent_by, confirmed_at, rejection_count, \
    last_rejected_at, member_notes, created_at, updated_at";

/// Which groups a stats query covers.
#[derive(Debug, Clone)]
pub enum DeliveryScope {
    AllGroups,
    Groups(Vec<Uuid>),
}

/// Repository for access delivery database operations.
#[derive(Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Creates a new DeliveryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Record a delivery and make it the current one for its pair.
    ///
    /// The membership must belong to `group_id` and the streaming must be
    /// linked to the group and active.
    pub async fn create(
        &self,
        group_id: Uuid,
        req: &CreateDeliveryRequest,
        sent_by: Uuid,
        deadline: DateTime<Utc>,
    ) -> Result<AccessDeliveryEntity, WorkflowError> {
        let timer = QueryTimer::new("create_access_delivery");
        let mut tx = self.pool.begin().await?;

        // Locking the membership serializes deliveries for the same member
        let membership = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT id, group_id, user_id, role, joined_at, updated_at
            FROM group_memberships
            WHERE id = $1 AND group_id = $2
            FOR UPDATE
            "#,
        )
        .bind(req.membership_id)
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound("Membership".to_string()))?;

        let link_active = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT gs.is_active AND s.is_active
            FROM group_streamings gs
            JOIN streamings s ON gs.streaming_id = s.id
            WHERE gs.group_id = $1 AND gs.streaming_id = $2
            "#,
        )
        .bind(group_id)
        .bind(req.streaming_id)
        .fetch_optional(&mut *tx)
        .await?;

        match link_active {
            None => {
                return Err(DomainError::StateConflict(
                    "Streaming is not shared in this group".to_string(),
                )
                .into())
            }
            Some(false) => {
                return Err(DomainError::StateConflict(
                    "Streaming is not active in this group".to_string(),
                )
                .into())
            }
            Some(true) => {}
        }

        sqlx::query(
            r#"
            UPDATE access_deliveries
            SET is_current = false, updated_at = NOW()
            WHERE membership_id = $1 AND streaming_id = $2 AND is_current
            "#,
        )
        .bind(membership.id)
        .bind(req.streaming_id)
        .execute(&mut *tx)
        .await?;

        let channel: DeliveryChannelDb = req.channel.into();
        let delivery = sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
            r#"
            INSERT INTO access_deliveries (membership_id, group_id, streaming_id, channel, content,
                                           is_invite_link, notes, deadline, sent_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {DELIVERY_COLUMNS}
            "#
        ))
        .bind(membership.id)
        .bind(group_id)
        .bind(req.streaming_id)
        .bind(channel)
        .bind(req.payload.content())
        .bind(req.payload.is_invite_link())
        .bind(req.notes.as_deref())
        .bind(deadline)
        .bind(sent_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        record_workflow_event("delivery", "sent");
        Ok(delivery)
    }

    /// Find a delivery by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AccessDeliveryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_access_delivery_by_id");
        let result = sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM access_deliveries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Full delivery history of a membership, newest first.
    pub async fn list_for_membership(
        &self,
        membership_id: Uuid,
    ) -> Result<Vec<AccessDeliveryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_access_deliveries_for_membership");
        let result = sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
            r#"
            SELECT {DELIVERY_COLUMNS}
            FROM access_deliveries
            WHERE membership_id = $1
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(membership_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a member's answer to a delivery.
    ///
    /// Without `delivery_id` the most recent unconfirmed delivery of the
    /// membership is answered. `confirmed = false` records the dispute and
    /// leaves the delivery Sent.
    pub async fn confirm(
        &self,
        membership_id: Uuid,
        delivery_id: Option<Uuid>,
        confirmed: bool,
        notes: Option<&str>,
    ) -> Result<AccessDeliveryEntity, WorkflowError> {
        let timer = QueryTimer::new("confirm_access_delivery");
        let mut tx = self.pool.begin().await?;

        let target = match delivery_id {
            Some(id) => sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
                r#"
                SELECT {DELIVERY_COLUMNS}
                FROM access_deliveries
                WHERE id = $1 AND membership_id = $2
                FOR UPDATE
                "#
            ))
            .bind(id)
            .bind(membership_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::NotFound("Delivery".to_string()))?,
            None => sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
                r#"
                SELECT {DELIVERY_COLUMNS}
                FROM access_deliveries
                WHERE membership_id = $1 AND status = 'sent' AND is_current
                ORDER BY created_at DESC, id
                LIMIT 1
                FOR UPDATE
                "#
            ))
            .bind(membership_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::NotFound("Unconfirmed delivery".to_string()))?,
        };

        let action = delivery_workflow::plan_confirmation(target.status.into(), confirmed)?;

        let updated = match action {
            ConfirmAction::Confirm => {
                sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
                    r#"
                    UPDATE access_deliveries
                    SET status = 'confirmed', confirmed_at = NOW(),
                        member_notes = COALESCE($2, member_notes), updated_at = NOW()
                    WHERE id = $1 AND status = 'sent'
                    RETURNING {DELIVERY_COLUMNS}
                    "#
                ))
                .bind(target.id)
                .bind(notes)
                .fetch_one(&mut *tx)
                .await?
            }
            ConfirmAction::Reject => {
                sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
                    r#"
                    UPDATE access_deliveries
                    SET rejection_count = rejection_count + 1, last_rejected_at = NOW(),
                        member_notes = COALESCE($2, member_notes), updated_at = NOW()
                    WHERE id = $1 AND status = 'sent'
                    RETURNING {DELIVERY_COLUMNS}
                    "#
                ))
                .bind(target.id)
                .bind(notes)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        timer.record();
        record_workflow_event(
            "delivery",
            match action {
                ConfirmAction::Confirm => "confirmed",
                ConfirmAction::Reject => "rejected",
            },
        );
        Ok(updated)
    }

    /// Administrative status/deadline correction. A confirmed delivery is
    /// never reopened.
    pub async fn override_status(
        &self,
        delivery_id: Uuid,
        req: &UpdateDeliveryRequest,
    ) -> Result<AccessDeliveryEntity, WorkflowError> {
        let timer = QueryTimer::new("override_access_delivery");
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM access_deliveries WHERE id = $1 FOR UPDATE"
        ))
        .bind(delivery_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::NotFound("Delivery".to_string()))?;

        let new_status = delivery_workflow::plan_status_override(current.status.into(), req.status)?;
        let confirm_now = new_status == Some(DeliveryStatus::Confirmed);
        let status_db: DeliveryStatusDb = new_status.unwrap_or(current.status.into()).into();
        let deadline = if req.clear_deadline {
            None
        } else {
            req.deadline.or(current.deadline)
        };

        let updated = sqlx::query_as::<_, AccessDeliveryEntity>(&format!(
            r#"
            UPDATE access_deliveries
            SET status = $2,
                confirmed_at = CASE WHEN $3 THEN NOW() ELSE confirmed_at END,
                deadline = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DELIVERY_COLUMNS}
            "#
        ))
        .bind(current.id)
        .bind(status_db)
        .bind(confirm_now)
        .bind(deadline)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        if confirm_now {
            record_workflow_event("delivery", "confirmed_by_admin");
        }
        Ok(updated)
    }

    /// Every (non-owner membership, active link) pair in scope with its
    /// current delivery, if any.
    pub async fn list_pairs(
        &self,
        scope: &DeliveryScope,
    ) -> Result<Vec<DeliveryPairEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_delivery_pairs");
        let group_ids: Option<&[Uuid]> = match scope {
            DeliveryScope::AllGroups => None,
            DeliveryScope::Groups(ids) => Some(ids.as_slice()),
        };
        let result = sqlx::query_as::<_, DeliveryPairEntity>(
            r#"
            SELECT
                gm.id AS membership_id, gm.user_id, u.email AS user_email,
                g.id AS group_id, g.name AS group_name,
                s.id AS streaming_id, s.name AS streaming_name,
                d.id AS delivery_id, d.status, d.deadline
            FROM group_memberships gm
            JOIN users u ON u.id = gm.user_id
            JOIN streaming_groups g ON g.id = gm.group_id
            JOIN group_streamings gs ON gs.group_id = gm.group_id AND gs.is_active
            JOIN streamings s ON s.id = gs.streaming_id
            LEFT JOIN access_deliveries d
                ON d.membership_id = gm.id AND d.streaming_id = gs.streaming_id AND d.is_current
            WHERE gm.role <> 'owner'
              AND ($1::uuid[] IS NULL OR gm.group_id = ANY($1))
            ORDER BY g.name, u.email, s.name
            "#,
        )
        .bind(group_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
