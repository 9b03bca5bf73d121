//! Slug validation and generation.
//!
//! Slugs identify programs, posts, and categories in URLs and must be
//! unique per collection (enforced by `uq_` constraints in the database).
//! This module only checks the shape.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Lowercase alphanumeric segments separated by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

/// Maximum slug length in bytes.
pub const MAX_SLUG_LEN: usize = 96;

/// Check whether a string is a well-formed slug.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.len() <= MAX_SLUG_LEN && SLUG_RE.is_match(slug)
}

/// Validate a slug, returning a user-facing error when malformed.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Slug invalide : « {slug} ». Utilisez uniquement des minuscules, chiffres et tirets."
        )))
    }
}

/// Derive a slug from a free-form title.
///
/// Non-alphanumeric runs collapse to a single hyphen; leading/trailing
/// hyphens are trimmed; the result is truncated to [`MAX_SLUG_LEN`].
/// Returns `None` when the title yields no usable characters.
pub fn slugify(title: &str) -> Option<String> {
    let mut slug = String::with_capacity(title.len());
    let mut prev_hyphen = true; // suppress a leading hyphen

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_slugs() {
        assert!(is_valid_slug("reset-7"));
        assert!(is_valid_slug("a"));
        assert!(is_valid_slug("programme-21-jours"));
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Reset-7"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("accent-é"));
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Reset 7 jours !"), Some("reset-7-jours".to_string()));
        assert_eq!(slugify("  --  "), None);
        assert_eq!(slugify("Déjà vu"), Some("d-j-vu".to_string()));
    }

    #[test]
    fn slugify_truncates_long_titles() {
        let title = "x".repeat(300);
        let slug = slugify(&title).unwrap();
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(is_valid_slug(&slug));
    }
}
