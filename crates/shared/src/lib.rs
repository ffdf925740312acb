//! Shared utilities and common types for the Love2Share backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Principal token verification (identity provider JWTs)
//! - Offset pagination helpers
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod validation;
