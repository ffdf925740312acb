//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod admin;
pub mod credit;
pub mod delivery;
pub mod group;
pub mod join_request;
pub mod privileged_identity;
pub mod streaming;
pub mod user;

pub use admin::AdminStatsEntity;
pub use credit::{CreditTransactionEntity, PaymentTransactionEntity};
pub use delivery::{AccessDeliveryEntity, DeliveryChannelDb, DeliveryPairEntity, DeliveryStatusDb};
pub use group::{
    AdminGroupEntity, GroupEntity, GroupMembershipEntity, GroupRoleDb, GroupStreamingEntity,
    GroupStreamingInfoEntity, GroupWithMembershipEntity, MemberWithUserEntity,
};
pub use join_request::{JoinRequestEntity, JoinRequestStatusDb, JoinRequestWithDetailsEntity};
pub use privileged_identity::PrivilegedIdentityEntity;
pub use streaming::StreamingEntity;
pub use user::{AdminUserEntity, UserEntity};
