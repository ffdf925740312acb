//! Platform admin allow-list.
//!
//! The allow-list is keyed by normalized email. Storage sits behind the
//! [`AdminAuthority`] capability so callers never touch it directly: the API
//! uses the Postgres-backed implementation, tests and tooling can use
//! [`InMemoryAdminAuthority`].

use std::collections::BTreeMap;

use chrono::Utc;
use shared::validation::normalize_email;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::PrivilegedIdentity;
use crate::DomainError;

/// Failure of the backing store.
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("Admin store unavailable: {0}")]
    Store(String),
}

/// Storage of privileged identities.
///
/// `grant` and `revoke` are idempotent and report whether they changed
/// anything. Emails passed in are already normalized.
#[async_trait::async_trait]
pub trait AdminAuthority: Send + Sync {
    async fn is_privileged(&self, email: &str) -> Result<bool, AuthorityError>;

    async fn grant(&self, email: &str, added_by: Option<&str>) -> Result<bool, AuthorityError>;

    async fn revoke(&self, email: &str) -> Result<bool, AuthorityError>;

    async fn list(&self) -> Result<Vec<PrivilegedIdentity>, AuthorityError>;
}

/// True iff the principal's email is on the allow-list. Never fails: a store
/// error is logged and answered with `false`.
pub async fn is_admin(authority: &dyn AdminAuthority, email: &str) -> bool {
    let email = normalize_email(email);
    if email.is_empty() {
        return false;
    }
    match authority.is_privileged(&email).await {
        Ok(privileged) => privileged,
        Err(e) => {
            warn!(error = %e, "Admin lookup failed, treating principal as non-admin");
            false
        }
    }
}

/// Succeeds iff [`is_admin`] holds.
pub async fn require_admin(authority: &dyn AdminAuthority, email: &str) -> Result<(), DomainError> {
    if is_admin(authority, email).await {
        Ok(())
    } else {
        Err(DomainError::AccessDenied(
            "Platform admin privileges required".to_string(),
        ))
    }
}

/// Adds an email to the allow-list. Returns false if it was already present.
pub async fn add_admin_email(
    authority: &dyn AdminAuthority,
    email: &str,
    added_by: Option<&str>,
) -> Result<bool, AuthorityError> {
    let email = normalize_email(email);
    let added_by = added_by.map(normalize_email);
    let added = authority.grant(&email, added_by.as_deref()).await?;
    if added {
        info!(email = %email, added_by = ?added_by, "Admin email added");
    }
    Ok(added)
}

/// Removes an email from the allow-list. Returns false if it was absent.
pub async fn remove_admin_email(
    authority: &dyn AdminAuthority,
    email: &str,
) -> Result<bool, AuthorityError> {
    let email = normalize_email(email);
    let removed = authority.revoke(&email).await?;
    if removed {
        info!(email = %email, "Admin email removed");
    }
    Ok(removed)
}

/// Process-local allow-list.
#[derive(Debug, Default)]
pub struct InMemoryAdminAuthority {
    entries: RwLock<BTreeMap<String, PrivilegedIdentity>>,
}

impl InMemoryAdminAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allow-list holding the given emails.
    pub fn with_seed<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = Utc::now();
        let entries = emails
            .into_iter()
            .map(|e| normalize_email(e.as_ref()))
            .filter(|e| !e.is_empty())
            .map(|email| {
                let identity = PrivilegedIdentity {
                    email: email.clone(),
                    added_by: None,
                    created_at: now,
                };
                (email, identity)
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait::async_trait]
impl AdminAuthority for InMemoryAdminAuthority {
    async fn is_privileged(&self, email: &str) -> Result<bool, AuthorityError> {
        Ok(self.entries.read().await.contains_key(email))
    }

    async fn grant(&self, email: &str, added_by: Option<&str>) -> Result<bool, AuthorityError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(email) {
            return Ok(false);
        }
        entries.insert(
            email.to_string(),
            PrivilegedIdentity {
                email: email.to_string(),
                added_by: added_by.map(str::to_string),
                created_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn revoke(&self, email: &str) -> Result<bool, AuthorityError> {
        Ok(self.entries.write().await.remove(email).is_some())
    }

    async fn list(&self) -> Result<Vec<PrivilegedIdentity>, AuthorityError> {
        Ok(self.entries.read().await.values().cloned().collect())
    }
}
