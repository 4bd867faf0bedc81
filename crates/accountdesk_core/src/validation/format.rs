//! Stateless shape validators for single field values.
//!
//! Every validator either returns `Ok(())` or an `InvalidFormat` error with a
//! stable code. Length bounds are counted in characters, not bytes.

use super::error::{ValidationError, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;

/// Upper bound for usernames, shared with username generation.
pub const USERNAME_MAX_CHARS: usize = 50;
const USERNAME_LENGTH: RangeInclusive<usize> = 3..=USERNAME_MAX_CHARS;
const SKU_CODE_LENGTH: RangeInclusive<usize> = 3..=32;

struct FormatRule {
    pattern: Lazy<Regex>,
    length: Option<RangeInclusive<usize>>,
    code: &'static str,
    message: &'static str,
}

impl FormatRule {
    fn check(&self, value: &str) -> ValidationResult {
        let length_ok = self
            .length
            .as_ref()
            .map_or(true, |bounds| bounds.contains(&value.chars().count()));
        if length_ok && self.pattern.is_match(value) {
            return Ok(());
        }
        Err(ValidationError::invalid_format(self.code, self.message))
    }
}

macro_rules! format_rule {
    ($pattern:expr, $length:expr, $code:expr, $message:expr $(,)?) => {
        FormatRule {
            pattern: Lazy::new(|| Regex::new($pattern).expect("valid regex")),
            length: $length,
            code: $code,
            message: $message,
        }
    };
}

static NUMERIC: FormatRule = format_rule!(
    r"^\d+$",
    None,
    "invalid_numeric",
    "Only numbers are allowed.",
);

static ALPHANUMERIC: FormatRule = format_rule!(
    r"^[a-zA-Z0-9]+$",
    None,
    "invalid_alphanumeric",
    "Only letters and numbers are allowed.",
);

static SLUG: FormatRule = format_rule!(
    r"^[a-z0-9]+(?:-[a-z0-9]+)*$",
    None,
    "invalid_slug",
    "Use lowercase letters, numbers, and single hyphens (-) only.",
);

static HUMAN_NAME: FormatRule = format_rule!(
    r"^[A-Za-zÀ-ÖØ-öø-ÿ' -]+$",
    None,
    "invalid_name",
    "Only letters, spaces, hyphens (-), and apostrophes (') are allowed.",
);

static USERNAME: FormatRule = format_rule!(
    r"^[A-Za-z0-9._-]+$",
    Some(USERNAME_LENGTH),
    "invalid_username",
    "Must be 3 to 50 characters, using only letters, numbers, underscores (_), dots (.), or hyphens (-).",
);

static HEX_COLOR: FormatRule = format_rule!(
    r"^#(?:[0-9a-fA-F]{3}){1,2}$",
    None,
    "invalid_hex_color",
    "Enter a valid hex color (e.g., #fff or #ffffff).",
);

static UUID: FormatRule = format_rule!(
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$",
    None,
    "invalid_uuid",
    "Enter a valid UUID.",
);

static SKU_CODE: FormatRule = format_rule!(
    r"^[A-Z0-9_-]+$",
    Some(SKU_CODE_LENGTH),
    "invalid_sku_code",
    "Must be 3 to 32 characters consisting of uppercase letters, numbers, underscores (_), and hyphens (-).",
);

static EMAIL: FormatRule = format_rule!(
    r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$",
    None,
    "invalid_email",
    "Enter a valid email address.",
);

static PHONE: FormatRule = format_rule!(
    r"^\+?[0-9][0-9 -]{5,18}[0-9]$",
    None,
    "invalid_phone",
    "Use the local format (e.g., 09XX XXX XXXX) or include the country code (e.g., +63 XXX XXX XXXX).",
);

pub fn validate_numeric(value: &str) -> ValidationResult {
    NUMERIC.check(value)
}

pub fn validate_alphanumeric(value: &str) -> ValidationResult {
    ALPHANUMERIC.check(value)
}

/// URL-friendly slugs like `team-alpha-1`.
pub fn validate_slug(value: &str) -> ValidationResult {
    SLUG.check(value)
}

/// Human names: letters (Latin-1 accents included), spaces, hyphens, apostrophes.
pub fn validate_human_name(value: &str) -> ValidationResult {
    HUMAN_NAME.check(value)
}

pub fn validate_username(value: &str) -> ValidationResult {
    USERNAME.check(value)
}

/// `#fff` or `#ffffff`, either case.
pub fn validate_hex_color(value: &str) -> ValidationResult {
    HEX_COLOR.check(value)
}

/// Textual RFC 4122 UUID, versions 1 through 5.
pub fn validate_uuid(value: &str) -> ValidationResult {
    UUID.check(value)
}

pub fn validate_sku_code(value: &str) -> ValidationResult {
    SKU_CODE.check(value)
}

pub fn validate_email(value: &str) -> ValidationResult {
    EMAIL.check(value)
}

pub fn validate_phone(value: &str) -> ValidationResult {
    PHONE.check(value)
}
