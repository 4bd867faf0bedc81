//! Username derivation from first/last names with collision avoidance.
//!
//! # Contract
//! - Base is `first.last`, whitespace removed, lower-cased, truncated to
//!   50 characters.
//! - Collisions append `1`, `2`, ... after cutting the base short enough that
//!   base plus suffix still fits in 50 characters; the suffix itself is never
//!   cut.
//! - Names whose base fails the username format yield no username.
//! - The result is free only at the instant of checking; the storage unique
//!   index still rejects a concurrent winner with `DuplicateValue`.

use crate::repo::RepoResult;
use crate::validation::{validate_username, UniqueLookup, USERNAME_MAX_CHARS};
use log::debug;

const USERNAME_FIELD: &str = "username";

/// Builds the un-suffixed username for `first`/`last`.
pub fn username_base(first_name: &str, last_name: &str) -> String {
    let base = format!("{}.{}", squash_name(first_name), squash_name(last_name));
    truncate_chars(&base, USERNAME_MAX_CHARS).to_string()
}

/// Returns a username not yet used by any live record, or `None` when either
/// name is blank or the names do not form a valid username (for example
/// accented letters); the caller then has to supply one explicitly.
pub fn generate_unique_username<L>(
    lookup: &L,
    first_name: &str,
    last_name: &str,
) -> RepoResult<Option<String>>
where
    L: UniqueLookup + ?Sized,
{
    if squash_name(first_name).is_empty() || squash_name(last_name).is_empty() {
        return Ok(None);
    }

    let base = username_base(first_name, last_name);
    if validate_username(&base).is_err() {
        debug!("event=username_generate module=service status=skipped reason=invalid_base");
        return Ok(None);
    }

    let mut candidate = base.clone();
    let mut suffix: u64 = 1;
    while lookup.value_taken(USERNAME_FIELD, &candidate, None)? {
        candidate = with_suffix(&base, suffix);
        suffix += 1;
    }

    if candidate != base {
        debug!(
            "event=username_collision module=service status=ok attempts={} base_chars={}",
            suffix - 1,
            base.chars().count()
        );
    }

    Ok(Some(candidate))
}

fn with_suffix(base: &str, suffix: u64) -> String {
    let suffix = suffix.to_string();
    let room = USERNAME_MAX_CHARS.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate_chars(base, room))
}

fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => &value[..cut],
        None => value,
    }
}

fn squash_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
