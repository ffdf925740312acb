//! Domain models for Love2Share.

pub mod admin;
pub mod credit;
pub mod delivery;
pub mod group;
pub mod join_request;
pub mod streaming;
pub mod user;

pub use admin::{MaintenanceResponse, PrivilegedIdentity, PurgeCounts, StreamingPurgeCounts};
pub use delivery::{AccessDelivery, DeliveryChannel, DeliveryPayload, DeliveryStats, DeliveryStatus};
pub use group::{GroupMembership, GroupRole, StreamingGroup};
pub use join_request::{JoinRequest, JoinRequestStatus};
pub use streaming::Streaming;
pub use user::{PrincipalIdentity, User};
