//! Runtime settings: defaults, optional JSON file, environment overrides.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.
//! - Environment variables win over file values.
//! - `validate()` runs before settings are handed out.

use crate::logging::normalize_level;
use crate::validation::{ContentTypeAllowList, FileSizeLimit, MinimumAge};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DB_PATH: &str = "ACCOUNTDESK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ACCOUNTDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ACCOUNTDESK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "accountdesk.sqlite3";
const DEFAULT_MAX_UPLOAD_MB: u64 = 5;
const DEFAULT_MINIMUM_AGE: u32 = 18;
const DEFAULT_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreSettings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub uploads: UploadSettings,
    pub accounts: AccountSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadSettings {
    pub max_upload_mb: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            allowed_content_types: DEFAULT_CONTENT_TYPES
                .iter()
                .map(|content_type| content_type.to_string())
                .collect(),
        }
    }
}

impl UploadSettings {
    pub fn size_limit(&self) -> FileSizeLimit {
        FileSizeLimit::new(self.max_upload_mb)
    }

    pub fn content_types(&self) -> ContentTypeAllowList {
        ContentTypeAllowList::new(self.allowed_content_types.iter().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountSettings {
    pub minimum_age: u32,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            minimum_age: DEFAULT_MINIMUM_AGE,
        }
    }
}

impl AccountSettings {
    pub fn minimum_age(&self) -> MinimumAge {
        MinimumAge::new(self.minimum_age)
    }
}

impl CoreSettings {
    /// Loads defaults, then `path` (when given), then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `ACCOUNTDESK_*` overrides resolved through `lookup`.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(SettingsError::Invalid {
                key: "database.path",
                reason: "must not be empty".to_string(),
            });
        }
        normalize_level(&self.logging.level).map_err(|err| SettingsError::Invalid {
            key: "logging.level",
            reason: err.to_string(),
        })?;
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(SettingsError::Invalid {
                    key: "logging.dir",
                    reason: format!("must be absolute, got `{}`", dir.display()),
                });
            }
        }
        if self.uploads.max_upload_mb == 0 {
            return Err(SettingsError::Invalid {
                key: "uploads.max_upload_mb",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.uploads.allowed_content_types.is_empty() {
            return Err(SettingsError::Invalid {
                key: "uploads.allowed_content_types",
                reason: "must list at least one MIME type".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreSettings, SettingsError, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn defaults_are_valid() {
        let settings = CoreSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.uploads.max_upload_mb, 5);
        assert_eq!(settings.accounts.minimum_age, 18);
        assert_eq!(settings.database.path, PathBuf::from("accountdesk.sqlite3"));
    }

    #[test]
    fn file_values_merge_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"uploads": {{"max_upload_mb": 12}}, "accounts": {{"minimum_age": 21}}}}"#
        )
        .unwrap();

        let settings = CoreSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.uploads.max_upload_mb, 12);
        assert_eq!(settings.accounts.minimum_age, 21);
        assert_eq!(settings.uploads.allowed_content_types.len(), 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"uploads": {{"max_size": 12}}}}"#).unwrap();

        let err = CoreSettings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn overrides_replace_file_values_and_skip_blanks() {
        let env: HashMap<&str, &str> = [(ENV_DB_PATH, "/var/lib/accounts.db"), (ENV_LOG_LEVEL, " ")]
            .into_iter()
            .collect();
        let mut settings = CoreSettings::default();
        let level_before = settings.logging.level.clone();

        settings.apply_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(settings.database.path, PathBuf::from("/var/lib/accounts.db"));
        assert_eq!(settings.logging.level, level_before);
    }

    #[test]
    fn validate_rejects_zero_upload_ceiling_and_empty_allow_list() {
        let mut settings = CoreSettings::default();
        settings.uploads.max_upload_mb = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                key: "uploads.max_upload_mb",
                ..
            })
        ));

        let mut settings = CoreSettings::default();
        settings.uploads.allowed_content_types.clear();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                key: "uploads.allowed_content_types",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut settings = CoreSettings::default();
        settings.logging.level = "loud".to_string();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                key: "logging.level",
                ..
            })
        ));
    }
}
