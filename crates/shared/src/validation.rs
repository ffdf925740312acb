//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of an email address (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Normalizes an email address for comparisons and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a plausible email address (single `@`, non-empty local part,
/// dotted domain). Full RFC validation is left to the identity provider.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let valid = email.len() <= MAX_EMAIL_LENGTH
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// Validates that a string contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates an invite link: absolute http(s) URL with a host.
pub fn validate_invite_url(url: &str) -> Result<(), ValidationError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    let host_ok = rest
        .map(|r| r.split(|c: char| c == '/' || c == '?' || c == '#').next().unwrap_or(""))
        .map(|host| !host.is_empty() && !host.chars().any(char::is_whitespace))
        .unwrap_or(false);

    if host_ok && !url.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invite_url");
        err.message = Some("Invite link must be an absolute http(s) URL".into());
        Err(err)
    }
}

/// Validates a monetary amount in cents (non-negative).
pub fn validate_price_cents(cents: i64) -> Result<(), ValidationError> {
    if cents >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Price must be non-negative".into());
        Err(err)
    }
}
