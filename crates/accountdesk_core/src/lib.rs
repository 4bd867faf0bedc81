//! Core domain logic for AccountDesk.
//! This crate is the single source of truth for account invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod security;
pub mod service;
pub mod settings;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{Account, AccountId};
pub use model::group::{Group, GroupId};
pub use model::lifecycle::{ActorContext, AuditStamp, SoftDeletable, SoftDeleteState};
pub use repo::account_repo::{AccountListQuery, AccountRepository, SqliteAccountRepository};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::{RepoError, RepoResult};
pub use security::{record_auth_event, AuthEvent, ClientInfo};
pub use service::account_service::{AccountService, CompleteProfile, NewAccount, ProfileUpdate};
pub use service::username::generate_unique_username;
pub use settings::{CoreSettings, SettingsError};
pub use validation::{ValidationError, ValidationErrorKind, ValidationResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
