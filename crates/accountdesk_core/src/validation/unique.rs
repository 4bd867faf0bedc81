//! Uniqueness checks against stored live records.
//!
//! # Invariants
//! - Empty values pass without a lookup; required-ness is checked elsewhere.
//! - The record being edited never conflicts with itself.
//! - The check is advisory: the storage unique index is the final backstop.

use super::error::ValidationError;
use crate::model::account::AccountId;
use crate::repo::{RepoError, RepoResult};

/// Storage query needed by uniqueness checks.
pub trait UniqueLookup {
    type Id: Copy;

    /// Human-readable entity name used in default messages, e.g. `Account`.
    fn entity_label(&self) -> &'static str;

    /// Whether a live record other than `exclude` already stores `value` in `field`.
    fn value_taken(&self, field: &str, value: &str, exclude: Option<Self::Id>)
        -> RepoResult<bool>;
}

/// Fails with `DuplicateValue` (code `unique_<field>`) when `value` is taken.
pub fn validate_unique_field<L>(
    lookup: &L,
    field: &str,
    value: Option<&str>,
    instance: Option<L::Id>,
    message: Option<&str>,
) -> RepoResult<()>
where
    L: UniqueLookup + ?Sized,
{
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return Ok(());
    };

    if !lookup.value_taken(field, value, instance)? {
        return Ok(());
    }

    let message = message.map_or_else(
        || {
            format!(
                "A {} with this {} already exists.",
                lookup.entity_label(),
                field
            )
        },
        str::to_string,
    );
    Err(RepoError::Validation(ValidationError::duplicate(
        format!("unique_{field}"),
        message,
    )))
}

pub fn validate_unique_email<L>(
    lookup: &L,
    email: Option<&str>,
    instance: Option<AccountId>,
) -> RepoResult<()>
where
    L: UniqueLookup<Id = AccountId> + ?Sized,
{
    validate_unique_field(
        lookup,
        "email",
        email,
        instance,
        Some("This email address is already registered."),
    )
}

pub fn validate_unique_username<L>(
    lookup: &L,
    username: Option<&str>,
    instance: Option<AccountId>,
) -> RepoResult<()>
where
    L: UniqueLookup<Id = AccountId> + ?Sized,
{
    validate_unique_field(
        lookup,
        "username",
        username,
        instance,
        Some("A user with this username already exists."),
    )
}
