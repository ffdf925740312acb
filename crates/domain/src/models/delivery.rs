//! Access-data delivery models.
//!
//! A delivery is one act of sending subscription credentials (or an invite
//! link) to a group member for one of the group's streamings. Deliveries form
//! an append-only log; exactly one row per (membership, streaming) pair is
//! flagged as current and drives the pair's state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::services::delivery_workflow;

/// Maximum length of credential text.
pub const MAX_CREDENTIALS_LENGTH: usize = 2000;

/// Channel a delivery was sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    Email,
    Message,
    InApp,
    InviteLink,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryChannel::Email => "email",
            DeliveryChannel::Message => "message",
            DeliveryChannel::InApp => "in_app",
            DeliveryChannel::InviteLink => "invite_link",
        }
    }
}

impl std::fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeliveryPayload {
    Credentials { text: String },
    InviteLink { url: String },
}

impl DeliveryPayload {
    pub fn is_invite_link(&self) -> bool {
        matches!(self, DeliveryPayload::InviteLink { .. })
    }

    /// The stored content column.
    pub fn content(&self) -> &str {
        match self {
            DeliveryPayload::Credentials { text } => text,
            DeliveryPayload::InviteLink { url } => url,
        }
    }

    /// Rebuilds the payload from its stored representation.
    pub fn from_stored(content: String, is_invite_link: bool) -> Self {
        if is_invite_link {
            DeliveryPayload::InviteLink { url: content }
        } else {
            DeliveryPayload::Credentials { text: content }
        }
    }
}

fn validate_payload(payload: &DeliveryPayload) -> Result<(), ValidationError> {
    match payload {
        DeliveryPayload::Credentials { text } => {
            shared::validation::validate_not_blank(text)?;
            if text.chars().count() > MAX_CREDENTIALS_LENGTH {
                let mut err = ValidationError::new("length");
                err.message = Some("Credentials must be at most 2000 characters".into());
                return Err(err);
            }
            Ok(())
        }
        DeliveryPayload::InviteLink { url } => shared::validation::validate_invite_url(url),
    }
}

fn validate_channel_matches_payload(req: &CreateDeliveryRequest) -> Result<(), ValidationError> {
    if req.channel == DeliveryChannel::InviteLink && !req.payload.is_invite_link() {
        let mut err = ValidationError::new("channel_payload");
        err.message = Some("The invite_link channel requires an invite_link payload".into());
        return Err(err);
    }
    Ok(())
}

/// Status stored on a delivery row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Confirmed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// State of a (membership, streaming) pair, derived from its current delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    NotSent,
    Sent,
    Confirmed,
}

impl From<Option<DeliveryStatus>> for PairState {
    fn from(current: Option<DeliveryStatus>) -> Self {
        match current {
            None => PairState::NotSent,
            Some(DeliveryStatus::Sent) => PairState::Sent,
            Some(DeliveryStatus::Confirmed) => PairState::Confirmed,
        }
    }
}

/// One delivery in the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessDelivery {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub group_id: Uuid,
    pub streaming_id: Uuid,
    pub channel: DeliveryChannel,
    pub payload: DeliveryPayload,
    pub notes: Option<String>,
    pub status: DeliveryStatus,
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

impl AccessDelivery {
    /// Sent and past its deadline. Confirmed deliveries are never overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        delivery_workflow::is_overdue(self.status, self.deadline, now)
    }

    /// Whole days until the deadline, negative once it has passed.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline
            .map(|deadline| delivery_workflow::days_remaining(deadline, now))
    }
}

/// Request to send access data to a member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_channel_matches_payload"))]
pub struct CreateDeliveryRequest {
    pub membership_id: Uuid,
    pub streaming_id: Uuid,
    pub channel: DeliveryChannel,
    #[validate(custom(function = "validate_payload"))]
    pub payload: DeliveryPayload,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Member's answer to a delivery.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ConfirmDeliveryRequest {
    /// Delivery being answered; the most recent unconfirmed one when absent.
    pub delivery_id: Option<Uuid>,
    pub confirmed: bool,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Administrative correction of a delivery.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateDeliveryRequest {
    pub status: Option<DeliveryStatus>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_deadline: bool,
}

/// Delivery as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub membership_id: Uuid,
    pub group_id: Uuid,
    pub streaming_id: Uuid,
    pub channel: DeliveryChannel,
    pub payload: DeliveryPayload,
    pub is_invite_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub is_current: bool,
    pub sent_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub rejection_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryResponse {
    pub fn from_delivery(delivery: AccessDelivery, now: DateTime<Utc>) -> Self {
        let is_overdue = delivery.is_overdue(now);
        let days_remaining = match delivery.status {
            DeliveryStatus::Sent => delivery.days_remaining(now),
            DeliveryStatus::Confirmed => None,
        };
        let is_invite_link = delivery.payload.is_invite_link();
        Self {
            id: delivery.id,
            membership_id: delivery.membership_id,
            group_id: delivery.group_id,
            streaming_id: delivery.streaming_id,
            channel: delivery.channel,
            payload: delivery.payload,
            is_invite_link,
            notes: delivery.notes,
            status: delivery.status,
            deadline: delivery.deadline,
            is_overdue,
            days_remaining,
            is_current: delivery.is_current,
            sent_by: delivery.sent_by,
            confirmed_at: delivery.confirmed_at,
            rejection_count: delivery.rejection_count,
            last_rejected_at: delivery.last_rejected_at,
            member_notes: delivery.member_notes,
            created_at: delivery.created_at,
        }
    }
}

/// Response for a membership's delivery history, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListDeliveriesResponse {
    pub deliveries: Vec<DeliveryResponse>,
}

/// A (membership, streaming) pair with its current delivery, if any.
/// Input to stats aggregation.
#[derive(Debug, Clone)]
pub struct DeliveryPair {
    pub membership_id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub group_id: Uuid,
    pub group_name: String,
    pub streaming_id: Uuid,
    pub streaming_name: String,
    pub current: Option<CurrentDelivery>,
}

/// The part of a current delivery that stats care about.
#[derive(Debug, Clone, Copy)]
pub struct CurrentDelivery {
    pub id: Uuid,
    pub status: DeliveryStatus,
    pub deadline: Option<DateTime<Utc>>,
}

/// An unconfirmed delivery whose deadline has passed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OverdueDelivery {
    pub delivery_id: Uuid,
    pub membership_id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub group_id: Uuid,
    pub group_name: String,
    pub streaming_id: Uuid,
    pub streaming_name: String,
    pub deadline: DateTime<Utc>,
    pub days_remaining: i64,
}

/// Aggregate delivery counts across a scope of groups.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryStats {
    pub pending: i64,
    pub sent: i64,
    pub confirmed: i64,
    pub overdue: i64,
    pub overdue_deliveries: Vec<OverdueDelivery>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(status: DeliveryStatus, deadline: Option<DateTime<Utc>>) -> AccessDelivery {
        let now = Utc::now();
        AccessDelivery {
            id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            streaming_id: Uuid::new_v4(),
            channel: DeliveryChannel::InviteLink,
            payload: DeliveryPayload::InviteLink {
                url: "https://www.netflix.com/invite/abc".to_string(),
            },
            notes: None,
            status,
            deadline,
            is_current: true,
            sent_by: Uuid::new_v4(),
            confirmed_at: None,
            rejection_count: 0,
            last_rejected_at: None,
            member_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payload_tagged_representation() {
        let payload: DeliveryPayload =
            serde_json::from_str(r#"{"type":"credentials","text":"user / pass"}"#).unwrap();
        assert!(!payload.is_invite_link());
        assert_eq!(payload.content(), "user / pass");

        let payload: DeliveryPayload =
            serde_json::from_str(r#"{"type":"invite_link","url":"https://x.example/i"}"#).unwrap();
        assert!(payload.is_invite_link());
    }

    #[test]
    fn test_payload_rejects_unknown_variant() {
        let result: Result<DeliveryPayload, _> =
            serde_json::from_str(r#"{"type":"carrier_pigeon","text":"hi"}"#);
        assert!(result.is_err());

        let result: Result<DeliveryPayload, _> = serde_json::from_str(r#"{"type":"invite_link"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_from_stored() {
        assert_eq!(
            DeliveryPayload::from_stored("secret".into(), false),
            DeliveryPayload::Credentials {
                text: "secret".into()
            }
        );
        assert!(DeliveryPayload::from_stored("https://a.example".into(), true).is_invite_link());
    }

    #[test]
    fn test_create_request_validation() {
        let json = r#"{
            "membership_id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "streaming_id": "7f9619ff-8b86-d011-b42d-00c04fc964ff",
            "channel": "invite_link",
            "payload": {"type": "invite_link", "url": "https://www.netflix.com/invite/abc"}
        }"#;
        let req: CreateDeliveryRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_ok());

        let mismatched = CreateDeliveryRequest {
            channel: DeliveryChannel::InviteLink,
            payload: DeliveryPayload::Credentials {
                text: "user / pass".into(),
            },
            ..req.clone()
        };
        assert!(mismatched.validate().is_err());

        let blank = CreateDeliveryRequest {
            channel: DeliveryChannel::Email,
            payload: DeliveryPayload::Credentials { text: "  ".into() },
            ..req.clone()
        };
        assert!(blank.validate().is_err());

        let bad_url = CreateDeliveryRequest {
            payload: DeliveryPayload::InviteLink {
                url: "not a url".into(),
            },
            ..req
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_pair_state_from_current() {
        assert_eq!(PairState::from(None), PairState::NotSent);
        assert_eq!(PairState::from(Some(DeliveryStatus::Sent)), PairState::Sent);
        assert_eq!(
            PairState::from(Some(DeliveryStatus::Confirmed)),
            PairState::Confirmed
        );
    }

    #[test]
    fn test_overdue_only_when_sent_and_past_deadline() {
        let now = Utc::now();
        let past = Some(now - Duration::hours(1));
        let future = Some(now + Duration::hours(1));

        assert!(sample(DeliveryStatus::Sent, past).is_overdue(now));
        assert!(!sample(DeliveryStatus::Sent, future).is_overdue(now));
        assert!(!sample(DeliveryStatus::Sent, None).is_overdue(now));
        assert!(!sample(DeliveryStatus::Confirmed, past).is_overdue(now));
    }

    #[test]
    fn test_response_hides_days_remaining_once_confirmed() {
        let now = Utc::now();
        let deadline = Some(now + Duration::hours(48));

        let sent = DeliveryResponse::from_delivery(sample(DeliveryStatus::Sent, deadline), now);
        assert_eq!(sent.days_remaining, Some(2));
        assert!(sent.is_invite_link);

        let confirmed =
            DeliveryResponse::from_delivery(sample(DeliveryStatus::Confirmed, deadline), now);
        assert_eq!(confirmed.days_remaining, None);
        assert!(!confirmed.is_overdue);
    }

    #[test]
    fn test_update_request_defaults() {
        let req: UpdateDeliveryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.status.is_none());
        assert!(req.deadline.is_none());
        assert!(!req.clear_deadline);
    }
}
