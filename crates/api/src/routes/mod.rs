//! HTTP route handlers.

pub mod admin;
pub mod credits;
pub mod deliveries;
pub mod groups;
pub mod health;
pub mod join_requests;
pub mod me;
pub mod streamings;
