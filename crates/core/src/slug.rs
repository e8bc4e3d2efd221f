//! Public URL slug generation.
//!
//! A slug is assigned the first time an entity is published and never
//! changes afterwards. Collision disambiguation happens in the publication
//! service, which appends `-2`, `-3`, ... after probing existing slugs.

/// Derive a URL-safe slug from an entity name.
///
/// Lowercases, collapses every run of non-alphanumeric characters to a
/// single hyphen, and trims leading/trailing hyphens.
///
/// # Examples
///
/// ```
/// use register_core::slug::slugify;
///
/// assert_eq!(slugify("General Medical Council"), "general-medical-council");
/// assert_eq!(slugify("Architects (Registration) Board"), "architects-registration-board");
/// assert_eq!(slugify("  Gas -- Safe  "), "gas-safe");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Append a numeric suffix to a base slug: `gas-safe` -> `gas-safe-2`.
pub fn with_suffix(base: &str, n: u32) -> String {
    format!("{base}-{n}")
}
