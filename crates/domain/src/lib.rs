//! Domain layer for the Love2Share backend.
//!
//! This crate contains:
//! - Domain models (User, StreamingGroup, JoinRequest, Streaming, AccessDelivery)
//! - Business rules for membership and access-data delivery
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
