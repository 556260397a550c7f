//! Slug validation and generation

use crate::error::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_.]{2,}$").expect("slug pattern compiles"));

/// Check a repository or document slug
///
/// # Errors
/// Returns [`RepoError::InvalidSlug`] for slugs shorter than two characters
/// or containing anything but letters, digits, `-`, `_` and `.`.
pub fn validate_slug(slug: &str) -> RepoResult<()> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        Err(RepoError::InvalidSlug(slug.to_string()))
    }
}

/// Random slug for documents created without one
#[must_use]
pub fn random_slug() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..10].to_string()
}
