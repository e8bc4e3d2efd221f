//! Field validation behind the confirm step.
//!
//! A freshly copied version starts `unconfirmed`; it only becomes a `draft`
//! once these checks pass. Messages are user-facing.

use crate::error::CoreError;

/// Maximum allowed length for an organisation or profession name.
pub const MAX_ENTITY_NAME_LENGTH: usize = 200;

/// Earliest year a decision dataset may cover.
pub const MIN_DATASET_YEAR: i32 = 2020;

/// Latest year a decision dataset may cover.
pub const MAX_DATASET_YEAR: i32 = 2100;

/// Validate an entity name: non-empty, trimmed, within
/// [`MAX_ENTITY_NAME_LENGTH`].
pub fn validate_entity_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".to_string()));
    }
    if trimmed.len() != name.len() {
        return Err(CoreError::Validation(
            "Name must not have leading or trailing whitespace".to_string(),
        ));
    }
    if name.chars().count() > MAX_ENTITY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must not exceed {MAX_ENTITY_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional contact email: a single `@` with a dotted domain.
///
/// Full RFC parsing is deliberately out of scope; the register only needs
/// to reject obvious typos before publication.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

/// Validate an optional public URL: http or https scheme with a host.
pub fn validate_url(url: &str) -> Result<(), CoreError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(CoreError::Validation(format!("'{url}' is not a valid URL"))),
    }
}

/// Validate a decision dataset year.
pub fn validate_dataset_year(year: i32) -> Result<(), CoreError> {
    if (MIN_DATASET_YEAR..=MAX_DATASET_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Dataset year must be between {MIN_DATASET_YEAR} and {MAX_DATASET_YEAR}, got {year}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- validate_entity_name ------------------------------------------------

    #[test]
    fn valid_name() {
        assert!(validate_entity_name("General Osteopathic Council").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_entity_name("").is_err());
        assert!(validate_entity_name("   ").is_err());
    }

    #[test]
    fn rejects_untrimmed_name() {
        assert!(validate_entity_name(" Farrier").is_err());
        assert!(validate_entity_name("Farrier ").is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "a".repeat(MAX_ENTITY_NAME_LENGTH + 1);
        assert!(validate_entity_name(&name).is_err());
    }

    // -- validate_email ------------------------------------------------------

    #[test]
    fn valid_email() {
        assert!(validate_email("registrar@example.gov.uk").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "no-at-sign", "a@b", "a@b.", "a@@b.com", "@b.com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    // -- validate_url --------------------------------------------------------

    #[test]
    fn valid_urls() {
        assert!(validate_url("https://www.example.gov.uk/register").is_ok());
        assert!(validate_url("http://example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_urls() {
        for bad in ["", "ftp://example.org", "example.org", "https://"] {
            assert!(validate_url(bad).is_err(), "{bad} should be rejected");
        }
    }

    // -- validate_dataset_year -----------------------------------------------

    #[test]
    fn year_bounds() {
        assert!(validate_dataset_year(MIN_DATASET_YEAR).is_ok());
        assert!(validate_dataset_year(MAX_DATASET_YEAR).is_ok());
        assert!(validate_dataset_year(MIN_DATASET_YEAR - 1).is_err());
        assert!(validate_dataset_year(MAX_DATASET_YEAR + 1).is_err());
    }
}
