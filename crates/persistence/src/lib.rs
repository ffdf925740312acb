//! Persistence layer for the Love2Share backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the transactional workflow steps
//! - Query metrics

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;

pub use error::WorkflowError;
