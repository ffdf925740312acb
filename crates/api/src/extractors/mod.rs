//! Custom Axum extractors.

pub mod current_user;
pub mod user_auth;

pub use current_user::CurrentUser;
pub use user_auth::UserAuth;
