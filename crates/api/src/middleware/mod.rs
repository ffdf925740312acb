//! HTTP middleware components.

pub mod admin_gate;
pub mod logging;
pub mod metrics;
pub mod rbac;
pub mod trace_id;
pub mod user_auth;

pub use admin_gate::{require_platform_admin, PlatformAdmin};
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rbac::{authorize_group_manager, load_group_access, GroupAccess};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
pub use user_auth::{require_user_auth, Principal};
