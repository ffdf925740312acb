//! Access delivery entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::delivery::{
    AccessDelivery, CurrentDelivery, DeliveryChannel, DeliveryPair, DeliveryPayload,
    DeliveryStatus,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for delivery_channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_channel", rename_all = "snake_case")]
pub enum DeliveryChannelDb {
    Email,
    Message,
    InApp,
    InviteLink,
}

impl From<DeliveryChannelDb> for DeliveryChannel {
    fn from(channel: DeliveryChannelDb) -> Self {
        match channel {
            DeliveryChannelDb::Email => DeliveryChannel::Email,
            DeliveryChannelDb::Message => DeliveryChannel::Message,
            DeliveryChannelDb::InApp => DeliveryChannel::InApp,
            DeliveryChannelDb::InviteLink => DeliveryChannel::InviteLink,
        }
    }
}

impl From<DeliveryChannel> for DeliveryChannelDb {
    fn from(channel: DeliveryChannel) -> Self {
        match channel {
            DeliveryChannel::Email => DeliveryChannelDb::Email,
            DeliveryChannel::Message => DeliveryChannelDb::Message,
            DeliveryChannel::InApp => DeliveryChannelDb::InApp,
            DeliveryChannel::InviteLink => DeliveryChannelDb::InviteLink,
        }
    }
}

/// Database enum for delivery_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
pub enum DeliveryStatusDb {
    Sent,
    Confirmed,
}

impl From<DeliveryStatusDb> for DeliveryStatus {
    fn from(status: DeliveryStatusDb) -> Self {
        match status {
            DeliveryStatusDb::Sent => DeliveryStatus::Sent,
            DeliveryStatusDb::Confirmed => DeliveryStatus::Confirmed,
        }
    }
}

impl From<DeliveryStatus> for DeliveryStatusDb {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Sent => DeliveryStatusDb::Sent,
            DeliveryStatus::Confirmed => DeliveryStatusDb::Confirmed,
        }
    }
}

/// Database row mapping for the access_deliveries table.
#[derive(Debug, Clone, FromRow)]
pub struct AccessDeliveryEntity {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub group_id: Uuid,
    pub streaming_id: Uuid,
    pub channel: DeliveryChannelDb,
    pub content: String,
    pub is_invite_link: bool,
    pub notes: Option<String>,
    pub status: DeliveryStatusDb,
    pub deadline: Option<DateTime<Utc>>,
    pub is_current: bool,
    pub sent_by: Uuid,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub rejection_count: i32,
    pub last_rejected_at: Option<DateTime<Utc>>,
    pub member_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccessDeliveryEntity> for AccessDelivery {
    fn from(entity: AccessDeliveryEntity) -> Self {
        Self {
            id: entity.id,
            membership_id: entity.membership_id,
            group_id: entity.group_id,
            streaming_id: entity.streaming_id,
            channel: entity.channel.into(),
            payload: DeliveryPayload::from_stored(entity.content, entity.is_invite_link),
            notes: entity.notes,
            status: entity.status.into(),
            deadline: entity.deadline,
            is_current: entity.is_current,
            sent_by: entity.sent_by,
            confirmed_at: entity.confirmed_at,
            rejection_count: entity.rejection_count,
            last_rejected_at: entity.last_rejected_at,
            member_notes: entity.member_notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// A (membership, active link) pair left-joined with its current delivery.
#[derive(Debug, Clone, FromRow)]
pub struct DeliveryPairEntity {
    pub membership_id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub group_id: Uuid,
    pub group_name: String,
    pub streaming_id: Uuid,
    pub streaming_name: String,
    pub delivery_id: Option<Uuid>,
    pub status: Option<DeliveryStatusDb>,
    pub deadline: Option<DateTime<Utc>>,
}

impl From<DeliveryPairEntity> for DeliveryPair {
    fn from(entity: DeliveryPairEntity) -> Self {
        let current = match (entity.delivery_id, entity.status) {
            (Some(id), Some(status)) => Some(CurrentDelivery {
                id,
                status: status.into(),
                deadline: entity.deadline,
            }),
            _ => None,
        };
        Self {
            membership_id: entity.membership_id,
            user_id: entity.user_id,
            user_email: entity.user_email,
            group_id: entity.group_id,
            group_name: entity.group_name,
            streaming_id: entity.streaming_id,
            streaming_name: entity.streaming_name,
            current,
        }
    }
}
