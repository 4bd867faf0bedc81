//! Account domain model.
//!
//! # Responsibility
//! - Define the identity record used for sign-in and profile management.
//! - Provide the profile-completeness predicate used as an onboarding gate.
//!
//! # Invariants
//! - `id` is stable and never reused for another account.
//! - `email` and `username` are unique among live accounts (storage enforced).
//! - `validate()` must pass before any write reaches storage.

use super::lifecycle::{AuditStamp, SoftDeletable, SoftDeleteState};
use crate::validation::{
    validate_email, validate_human_name, validate_phone, validate_username, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AccountId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Stored normalized, see [`normalize_email`].
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    #[serde(flatten)]
    pub audit: AuditStamp,
    #[serde(flatten)]
    pub deletion: SoftDeleteState,
}

impl Account {
    /// Creates an active, non-staff account with empty profile fields.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        audit: AuditStamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            job_title: String::new(),
            phone: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            audit,
            deletion: SoftDeleteState::default(),
        }
    }

    /// True once first name, last name and job title are all non-empty.
    pub fn is_profile_complete(&self) -> bool {
        [&self.first_name, &self.last_name, &self.job_title]
            .iter()
            .all(|value| !value.is_empty())
    }

    /// Checks field shapes. Empty optional profile fields are accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.is_empty() {
            return Err(ValidationError::missing("email"));
        }
        validate_email(&self.email)?;

        if self.username.is_empty() {
            return Err(ValidationError::missing("username"));
        }
        validate_username(&self.username)?;

        for name in [&self.first_name, &self.last_name] {
            if !name.is_empty() {
                validate_human_name(name)?;
            }
        }

        if let Some(phone) = self.phone.as_deref().filter(|phone| !phone.is_empty()) {
            validate_phone(phone)?;
        }
        Ok(())
    }
}

impl SoftDeletable for Account {
    fn deletion(&self) -> &SoftDeleteState {
        &self.deletion
    }

    fn deletion_mut(&mut self) -> &mut SoftDeleteState {
        &mut self.deletion
    }
}

/// Trims and lower-cases the domain part; the local part keeps its case.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
