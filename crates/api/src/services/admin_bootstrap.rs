//! Admin bootstrap service for initial setup.
//!
//! Seeds the privileged identity allow-list from `admin.seed_emails` on
//! startup. Seeding is idempotent: emails already on the list are left alone,
//! and emails removed through the API are re-added on the next start only if
//! they are still configured.

use domain::services::{add_admin_email, AdminAuthority, AuthorityError};
use shared::validation::{normalize_email, validate_email_address};
use tracing::{info, warn};

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Admin store error: {0}")]
    Store(#[from] AuthorityError),
}

/// Outcome of a bootstrap run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub added: usize,
    pub already_present: usize,
    pub skipped: usize,
}

/// Seed the configured admin emails.
///
/// Malformed entries are skipped with a warning rather than failing startup.
pub async fn bootstrap_admins(
    authority: &dyn AdminAuthority,
    seed_emails: &[String],
) -> Result<BootstrapSummary, BootstrapError> {
    let mut summary = BootstrapSummary::default();

    for raw in seed_emails {
        let email = normalize_email(raw);
        if email.is_empty() {
            continue;
        }
        if validate_email_address(&email).is_err() {
            warn!(email = %email, "Ignoring malformed admin seed email");
            summary.skipped += 1;
            continue;
        }

        if add_admin_email(authority, &email, None).await? {
            summary.added += 1;
        } else {
            summary.already_present += 1;
        }
    }

    if summary.added > 0 {
        info!(
            added = summary.added,
            already_present = summary.already_present,
            "Admin allow-list seeded"
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::{is_admin, InMemoryAdminAuthority};

    fn emails(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_emails() {
        let authority = InMemoryAdminAuthority::new();
        let summary = bootstrap_admins(&authority, &emails(&["Ops@Example.com", "root@example.com"]))
            .await
            .unwrap();

        assert_eq!(summary.added, 2);
        assert!(is_admin(&authority, "ops@example.com").await);
        assert!(is_admin(&authority, "root@example.com").await);
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let authority = InMemoryAdminAuthority::new();
        let seed = emails(&["ops@example.com"]);
        bootstrap_admins(&authority, &seed).await.unwrap();
        let summary = bootstrap_admins(&authority, &seed).await.unwrap();

        assert_eq!(summary.added, 0);
        assert_eq!(summary.already_present, 1);
        assert_eq!(authority.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_skips_malformed_and_blank() {
        let authority = InMemoryAdminAuthority::new();
        let summary = bootstrap_admins(&authority, &emails(&["", "  ", "not-an-email"]))
            .await
            .unwrap();

        assert_eq!(summary.added, 0);
        assert_eq!(summary.skipped, 1);
        assert!(authority.list().await.unwrap().is_empty());
    }
}
