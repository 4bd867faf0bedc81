//! Upload validators: size ceiling and MIME allow-list.

use super::error::{ValidationError, ValidationResult};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Metadata of one uploaded file as reported by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn new(size_bytes: u64, content_type: Option<impl Into<String>>) -> Self {
        Self {
            size_bytes,
            content_type: content_type.map(Into::into),
        }
    }
}

/// Inclusive size ceiling in megabytes (MiB).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSizeLimit {
    pub max_mb: u64,
}

impl FileSizeLimit {
    pub fn new(max_mb: u64) -> Self {
        Self { max_mb }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn validate(&self, file: &UploadedFile) -> ValidationResult {
        if file.size_bytes > self.max_bytes() {
            return Err(ValidationError::out_of_range(
                "file_too_large",
                format!("File too large. Maximum allowed is {} MB.", self.max_mb),
            ));
        }
        Ok(())
    }
}

/// Accepts only files whose declared MIME type is listed exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeAllowList {
    allowed: Vec<String>,
}

impl ContentTypeAllowList {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn validate(&self, file: &UploadedFile) -> ValidationResult {
        let listed = file
            .content_type
            .as_deref()
            .is_some_and(|content_type| self.allowed.iter().any(|item| item == content_type));
        if !listed {
            return Err(ValidationError::invalid_format(
                "invalid_content_type",
                format!("Invalid file type. Allowed: {}", self.allowed.join(", ")),
            ));
        }
        Ok(())
    }
}
