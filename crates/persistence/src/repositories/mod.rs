//! Repository implementations for database operations.

pub mod admin;
pub mod credit;
pub mod delivery;
pub mod group;
pub mod join_request;
pub mod privileged_identity;
pub mod streaming;
pub mod user;

pub use admin::AdminRepository;
pub use credit::CreditRepository;
pub use delivery::{DeliveryRepository, DeliveryScope};
pub use group::GroupRepository;
pub use join_request::JoinRequestRepository;
pub use privileged_identity::PrivilegedIdentityRepository;
pub use streaming::StreamingRepository;
pub use user::UserRepository;
