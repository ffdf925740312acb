//! Access-data delivery state machine.
//!
//! Per (membership, streaming) pair: `NotSent -> Sent -> Confirmed`, with
//! `Overdue` derived for Sent deliveries past their deadline. Confirmation is
//! terminal.

use chrono::{DateTime, Duration, Utc};

use crate::models::delivery::{DeliveryPair, DeliveryStats, DeliveryStatus, OverdueDelivery};
use crate::DomainError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Deadline for a delivery sent at `now`.
pub fn compute_deadline(now: DateTime<Utc>, confirmation_deadline_hours: u32) -> DateTime<Utc> {
    now + Duration::hours(i64::from(confirmation_deadline_hours))
}

pub fn is_overdue(
    status: DeliveryStatus,
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    status == DeliveryStatus::Sent && deadline.is_some_and(|d| now > d)
}

/// `floor((deadline - now) / 1 day)`; negative once the deadline has passed.
pub fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Effect of a member's answer on a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Move to Confirmed.
    Confirm,
    /// Record the dispute; the delivery stays Sent.
    Reject,
}

/// Decides what a member's answer does to a delivery in `status`.
pub fn plan_confirmation(
    status: DeliveryStatus,
    confirmed: bool,
) -> Result<ConfirmAction, DomainError> {
    match (status, confirmed) {
        (DeliveryStatus::Confirmed, _) => Err(DomainError::StateConflict(
            "Delivery has already been confirmed".to_string(),
        )),
        (DeliveryStatus::Sent, true) => Ok(ConfirmAction::Confirm),
        (DeliveryStatus::Sent, false) => Ok(ConfirmAction::Reject),
    }
}

/// Validates an administrative status override. Returns the status to store,
/// or `None` when nothing changes.
pub fn plan_status_override(
    current: DeliveryStatus,
    requested: Option<DeliveryStatus>,
) -> Result<Option<DeliveryStatus>, DomainError> {
    match (current, requested) {
        (_, None) => Ok(None),
        (DeliveryStatus::Confirmed, Some(DeliveryStatus::Sent)) => Err(
            DomainError::StateConflict("A confirmed delivery cannot be reopened".to_string()),
        ),
        (current, Some(requested)) if current == requested => Ok(None),
        (_, Some(requested)) => Ok(Some(requested)),
    }
}

/// Counts pair states across `pairs` and lists overdue deliveries, most
/// overdue first.
pub fn aggregate_stats(pairs: &[DeliveryPair], now: DateTime<Utc>) -> DeliveryStats {
    let mut stats = DeliveryStats::default();

    for pair in pairs {
        let Some(current) = pair.current else {
            stats.pending += 1;
            continue;
        };

        match current.status {
            DeliveryStatus::Confirmed => stats.confirmed += 1,
            DeliveryStatus::Sent => {
                stats.sent += 1;
                if let Some(deadline) = current.deadline.filter(|d| now > *d) {
                    stats.overdue += 1;
                    stats.overdue_deliveries.push(OverdueDelivery {
                        delivery_id: current.id,
                        membership_id: pair.membership_id,
                        user_id: pair.user_id,
                        user_email: pair.user_email.clone(),
                        group_id: pair.group_id,
                        group_name: pair.group_name.clone(),
                        streaming_id: pair.streaming_id,
                        streaming_name: pair.streaming_name.clone(),
                        deadline,
                        days_remaining: days_remaining(deadline, now),
                    });
                }
            }
        }
    }

    stats.overdue_deliveries.sort_by_key(|d| d.deadline);
    stats
}
