//! Application services run outside the request path.

pub mod admin_bootstrap;

pub use admin_bootstrap::{bootstrap_admins, BootstrapError, BootstrapSummary};
