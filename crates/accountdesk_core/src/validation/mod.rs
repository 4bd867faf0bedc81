//! Field validators.
//!
//! # Responsibility
//! - Reject malformed or out-of-range field values before persistence.
//! - Reject values that collide with another live record.
//!
//! # Invariants
//! - Format, date and file validators are pure and side-effect free.
//! - Every failure carries a stable machine code plus a human message.

pub mod error;
pub mod file;
pub mod format;
pub mod temporal;
pub mod unique;

pub use error::{ValidationError, ValidationErrorKind, ValidationResult};
pub use file::{ContentTypeAllowList, FileSizeLimit, UploadedFile};
pub use format::{
    validate_alphanumeric, validate_email, validate_hex_color, validate_human_name,
    validate_numeric, validate_phone, validate_sku_code, validate_slug, validate_username,
    validate_uuid, USERNAME_MAX_CHARS,
};
pub use temporal::{age_on, validate_date_not_in_future, validate_date_not_in_past, MinimumAge};
pub use unique::{
    validate_unique_email, validate_unique_field, validate_unique_username, UniqueLookup,
};
