//! Domain services for Love2Share.
//!
//! Services hold the business rules that operate on domain models. They are
//! free of I/O except through the [`AdminAuthority`] capability.

pub mod admin_authority;
pub mod delivery_workflow;
pub mod membership_policy;

pub use admin_authority::{
    add_admin_email, is_admin, remove_admin_email, require_admin, AdminAuthority, AuthorityError,
    InMemoryAdminAuthority,
};
pub use delivery_workflow::{
    aggregate_stats, compute_deadline, days_remaining, plan_confirmation, plan_status_override,
    ConfirmAction,
};
pub use membership_policy::{
    check_leave, check_removal, check_role_change, ensure_can_manage, ensure_capacity,
    ensure_pending, JoinRequestPolicy,
};
