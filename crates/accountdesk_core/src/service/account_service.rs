//! Account use-case service.
//!
//! # Responsibility
//! - Orchestrate validation, username generation, audit stamping and
//!   persistence for account lifecycle use-cases.
//!
//! # Invariants
//! - Every mutating call receives the acting identity explicitly.
//! - Uniqueness pre-checks are advisory; storage duplicates propagate
//!   unchanged as `DuplicateValue` and are never retried.
//! - Service layer remains storage-agnostic.

use crate::clock::Clock;
use crate::model::account::{normalize_email, Account, AccountId};
use crate::model::lifecycle::{ActorContext, AuditStamp, SoftDeletable};
use crate::repo::account_repo::{AccountListQuery, AccountRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::username::generate_unique_username;
use crate::validation::{
    validate_email, validate_unique_email, validate_unique_username, ValidationError,
};
use log::{info, warn};

/// Input for account creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    /// Generated from the names when absent or blank.
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub phone: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Partial profile edit; `None` leaves a field unchanged.
///
/// `phone: Some(String::new())` clears the stored phone number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
    pub phone: Option<String>,
}

/// Onboarding form: all three profile fields are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteProfile {
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub phone: Option<String>,
}

/// Use-case service wrapper for account operations.
pub struct AccountService<R: AccountRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: AccountRepository, C: Clock> AccountService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates an account, generating the username from the names when needed.
    ///
    /// # Errors
    /// - `MissingRequiredInput` for a blank email, or when no username was
    ///   given and the names cannot produce one.
    /// - `InvalidFormat` for malformed email/username/names/phone.
    /// - `DuplicateValue` when email or username belongs to a live account.
    pub fn create_account(&self, new: NewAccount, actor: &ActorContext) -> RepoResult<Account> {
        let result = self.create_account_inner(new, actor);
        match &result {
            Ok(account) => info!(
                "event=account_create module=service status=ok account_id={} staff={} superuser={}",
                account.id, account.is_staff, account.is_superuser
            ),
            Err(err) => warn!(
                "event=account_create module=service status=error error_code={}",
                error_code(err)
            ),
        }
        result
    }

    /// Creates an account with staff and superuser rights.
    pub fn create_superuser(&self, new: NewAccount, actor: &ActorContext) -> RepoResult<Account> {
        self.create_account(
            NewAccount {
                is_staff: true,
                is_superuser: true,
                ..new
            },
            actor,
        )
    }

    fn create_account_inner(&self, new: NewAccount, actor: &ActorContext) -> RepoResult<Account> {
        let email = normalize_email(&new.email);
        if email.is_empty() {
            return Err(ValidationError::missing("email").into());
        }
        validate_email(&email)?;

        let first_name = new.first_name.trim().to_string();
        let last_name = new.last_name.trim().to_string();
        let username = match new
            .username
            .as_deref()
            .map(str::trim)
            .filter(|username| !username.is_empty())
        {
            Some(explicit) => explicit.to_string(),
            None => generate_unique_username(&self.repo, &first_name, &last_name)?
                .ok_or_else(|| ValidationError::missing("username"))?,
        };

        let mut account = Account::new(
            email,
            username,
            AuditStamp::created(self.clock.now_ms(), actor),
        );
        account.first_name = first_name;
        account.last_name = last_name;
        account.job_title = new.job_title.trim().to_string();
        account.phone = normalize_phone(new.phone);
        account.is_staff = new.is_staff;
        account.is_superuser = new.is_superuser;
        account.validate()?;

        validate_unique_email(&self.repo, Some(account.email.as_str()), None)?;
        validate_unique_username(&self.repo, Some(account.username.as_str()), None)?;

        self.repo.create_account(&account)?;
        Ok(account)
    }

    /// Applies a partial profile edit to a live account.
    ///
    /// Keeping one's own email or username never conflicts.
    pub fn update_profile(
        &self,
        id: AccountId,
        update: ProfileUpdate,
        actor: &ActorContext,
    ) -> RepoResult<Account> {
        let mut account = self.require_live(id)?;

        if let Some(email) = update.email {
            account.email = normalize_email(&email);
        }
        if let Some(username) = update.username {
            account.username = username.trim().to_string();
        }
        if let Some(first_name) = update.first_name {
            account.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            account.last_name = last_name.trim().to_string();
        }
        if let Some(job_title) = update.job_title {
            account.job_title = job_title.trim().to_string();
        }
        if update.phone.is_some() {
            account.phone = normalize_phone(update.phone);
        }
        account.validate()?;

        validate_unique_email(&self.repo, Some(account.email.as_str()), Some(account.id))?;
        validate_unique_username(&self.repo, Some(account.username.as_str()), Some(account.id))?;

        account.audit.touch(self.clock.now_ms(), actor);
        self.repo.update_account(&account)?;

        info!(
            "event=profile_update module=service status=ok account_id={}",
            account.id
        );
        // Storage may have advanced `updated_at` past our stamp.
        self.require_live(id)
    }

    /// Fills in the onboarding profile fields.
    pub fn complete_profile(
        &self,
        id: AccountId,
        profile: CompleteProfile,
        actor: &ActorContext,
    ) -> RepoResult<Account> {
        for (field, value) in [
            ("first_name", &profile.first_name),
            ("last_name", &profile.last_name),
            ("job_title", &profile.job_title),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::missing(field).into());
            }
        }

        let account = self.update_profile(
            id,
            ProfileUpdate {
                first_name: Some(profile.first_name),
                last_name: Some(profile.last_name),
                job_title: Some(profile.job_title),
                phone: profile.phone,
                ..ProfileUpdate::default()
            },
            actor,
        )?;

        info!(
            "event=profile_completed module=service status=ok account_id={}",
            account.id
        );
        Ok(account)
    }

    /// Whether the onboarding gate should still send this account to profile completion.
    pub fn needs_profile_completion(&self, id: AccountId) -> RepoResult<bool> {
        Ok(!self.require_live(id)?.is_profile_complete())
    }

    /// Soft-deletes an account and returns it with its tombstone.
    ///
    /// Deleting an already-deleted account is a no-op that keeps the first
    /// `deleted_at`/`deleted_by`.
    pub fn soft_delete(&self, id: AccountId, actor: &ActorContext) -> RepoResult<Account> {
        let mut account = self.require_existing(id)?;
        if !account.is_live() {
            info!("event=account_soft_delete module=service status=noop account_id={id}");
            return Ok(account);
        }

        account.soft_delete(self.clock.now_ms(), actor);
        self.repo.soft_delete_account(id, account.deletion())?;
        info!("event=account_soft_delete module=service status=ok account_id={id}");
        Ok(account)
    }

    /// Restores a soft-deleted account. Restoring a live account is a no-op.
    ///
    /// Fails with `DuplicateValue` when a live account took over the email or
    /// username in the meantime.
    pub fn restore(&self, id: AccountId, actor: &ActorContext) -> RepoResult<Account> {
        let mut account = self.require_existing(id)?;
        if account.is_live() {
            info!("event=account_restore module=service status=noop account_id={id}");
            return Ok(account);
        }

        if let Err(err) = self.repo.restore_account(id) {
            warn!(
                "event=account_restore module=service status=error account_id={id} error_code={}",
                error_code(&err)
            );
            return Err(err);
        }
        account.restore();
        info!(
            "event=account_restore module=service status=ok account_id={id} actor={}",
            actor
                .actor_id()
                .map_or_else(|| "system".to_string(), |actor| actor.to_string())
        );
        Ok(account)
    }

    pub fn get(&self, id: AccountId, include_deleted: bool) -> RepoResult<Option<Account>> {
        self.repo.get_account(id, include_deleted)
    }

    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        self.repo.find_by_email(&normalize_email(email), false)
    }

    pub fn list(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>> {
        self.repo.list_accounts(query)
    }

    /// Suggests a free username for the given names without creating anything.
    pub fn suggest_username(&self, first_name: &str, last_name: &str) -> RepoResult<Option<String>> {
        generate_unique_username(&self.repo, first_name, last_name)
    }

    fn require_live(&self, id: AccountId) -> RepoResult<Account> {
        self.repo
            .get_account(id, false)?
            .ok_or(RepoError::NotFound(id))
    }

    fn require_existing(&self, id: AccountId) -> RepoResult<Account> {
        self.repo
            .get_account(id, true)?
            .ok_or(RepoError::NotFound(id))
    }
}

fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|phone| phone.trim().to_string())
        .filter(|phone| !phone.is_empty())
}

fn error_code(err: &RepoError) -> &str {
    match err {
        RepoError::Validation(err) => err.code.as_str(),
        RepoError::Db(_) => "db_error",
        RepoError::NotFound(_) => "not_found",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::UninitializedConnection { .. }
        | RepoError::MissingRequiredTable(_)
        | RepoError::MissingRequiredColumn { .. } => "schema_not_ready",
    }
}
