//! Slug generation for brands and public experience URLs

use std::future::Future;

use rand::Rng;

use crate::{Error, Result};

/// Maximum length of the readable part of a slug
const MAX_BASE_LEN: usize = 48;

/// Suffixes drawn before `free_slug` gives up
pub const SLUG_ATTEMPTS: usize = 8;

/// Lowercase ASCII slug: alphanumerics kept, everything else collapses to `-`
///
/// Returns `"item"` when nothing usable remains.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_BASE_LEN {
            break;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

/// Slug with a random 6-character suffix, for values that must be unique
pub fn unique_slug(input: &str) -> String {
    const ALPHABET: &[u8] = b"abcdefghijkmnpqrstuvwxyz23456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", slugify(input), suffix)
}

/// `unique_slug` that is not yet in use, redrawing the suffix on collision
///
/// `is_taken` checks a candidate against storage. After `SLUG_ATTEMPTS`
/// collisions the result is `Error::Conflict`.
pub async fn free_slug<F, Fut>(input: &str, mut is_taken: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for _ in 0..SLUG_ATTEMPTS {
        let candidate = unique_slug(input);
        if !is_taken(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(Error::Conflict(format!("No free slug for '{}'", slugify(input))))
}

/// True when `s` looks like something `slugify`/`unique_slug` produced
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 64
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
