//! Sync/scan option models, status and error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::conf::{
    C_CACHE_DIR_NAME, C_EXTENSIONS_DEFAULT, C_VENDOR_DIR_DEFAULT, C_VERSION_TAG_DEFAULT,
    TUP_TEXT_EXTENSIONS,
};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Overall outcome of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumSyncStatus {
    /// No per-file errors.
    #[default]
    Success,
    /// Per-file errors, but at least one file copied.
    Partial,
    /// Per-file errors and nothing copied.
    Failed,
}

impl EnumSyncStatus {
    /// Classify a finished run from its copy count and error count.
    pub fn classify(cnt_files_copied: u64, n_errors: usize) -> Self {
        match (n_errors, cnt_files_copied) {
            (0, _) => Self::Success,
            (_, 0) => Self::Failed,
            _ => Self::Partial,
        }
    }

    /// Lower-case wire name (`success`, `partial`, `failed`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EnumSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable error code attached to every [`SyncVendorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumErrorCode {
    TypeMismatch,
    InvalidPackage,
    InvalidValue,
    PathNotFound,
    PathValidationFailed,
    PermissionDenied,
    DeletionFailed,
    CopyFailed,
    DiskFull,
    SyncFailed,
}

impl EnumErrorCode {
    /// Kebab-case code, e.g. `permission-denied`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type-mismatch",
            Self::InvalidPackage => "invalid-package",
            Self::InvalidValue => "invalid-value",
            Self::PathNotFound => "path-not-found",
            Self::PathValidationFailed => "path-validation-failed",
            Self::PermissionDenied => "permission-denied",
            Self::DeletionFailed => "deletion-failed",
            Self::CopyFailed => "copy-failed",
            Self::DiskFull => "disk-full",
            Self::SyncFailed => "sync-failed",
        }
    }
}

impl fmt::Display for EnumErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Input options for [`crate::sync::sync_vendor_with_options`].
#[derive(Debug, Clone)]
pub struct SpecSyncOptions {
    /// Vendor directory created under the target path.
    pub vendor_dir: String,
    /// `;`-separated extension list selecting the files to copy.
    pub extensions: String,
    /// Extensions copied through the UTF-8 text path; others are byte copies.
    pub extensions_text: Vec<String>,
    /// Glob patterns on path component names; a match skips the whole branch.
    pub patterns_exclude_dirs: Vec<String>,
}

impl Default for SpecSyncOptions {
    fn default() -> Self {
        Self {
            vendor_dir: C_VENDOR_DIR_DEFAULT.to_string(),
            extensions: C_EXTENSIONS_DEFAULT.to_string(),
            extensions_text: TUP_TEXT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            patterns_exclude_dirs: vec![C_CACHE_DIR_NAME.to_string()],
        }
    }
}

/// Input options for vendor version scans.
#[derive(Debug, Clone)]
pub struct SpecScanOptions {
    /// Vendor directory name, looked up at every nesting level.
    pub vendor_dir: String,
    /// Identifier whose string assignment is reported as the version.
    pub version_tag: String,
}

impl Default for SpecScanOptions {
    fn default() -> Self {
        Self {
            vendor_dir: C_VENDOR_DIR_DEFAULT.to_string(),
            version_tag: C_VERSION_TAG_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// "Top-level call failed" errors. Per-file copy failures never surface here;
/// they are collected in [`crate::report::ReportSync::errors`].
#[derive(Debug, Error)]
pub enum SyncVendorError {
    /// Argument of the wrong kind (raised by language bridges).
    #[error("{message}")]
    TypeMismatch { message: String },
    /// Blank argument, missing path or failed path validation.
    #[error("{message}")]
    InvalidValue {
        code: EnumErrorCode,
        message: String,
    },
    /// Fatal filesystem failure in the clean phase or at the sync root.
    #[error("{message}")]
    Os {
        code: EnumErrorCode,
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Anything the phases did not classify themselves.
    #[error("Sync failed with unexpected error: {message}")]
    SyncFailed { message: String },
}

impl SyncVendorError {
    pub fn type_mismatch(arg_name: &str, expected: &str, got: &str) -> Self {
        Self::TypeMismatch {
            message: format!("{arg_name} must be {expected}, got {got}"),
        }
    }

    pub fn invalid_value(code: EnumErrorCode, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            code,
            message: message.into(),
        }
    }

    /// Error code for display and exit-code mapping.
    pub fn code(&self) -> EnumErrorCode {
        match self {
            Self::TypeMismatch { .. } => EnumErrorCode::TypeMismatch,
            Self::InvalidValue { code, .. } | Self::Os { code, .. } => *code,
            Self::SyncFailed { .. } => EnumErrorCode::SyncFailed,
        }
    }

    /// Whether the caller passed bad input (as opposed to a runtime failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::InvalidValue { .. })
    }

    /// Stable category name shown in user-facing error lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "SyncVendorTypeError",
            Self::InvalidValue { .. } => "SyncVendorValueError",
            Self::Os { .. } => "SyncVendorOSError",
            Self::SyncFailed { .. } => "SyncVendorError",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{EnumErrorCode, EnumSyncStatus, SyncVendorError};

    #[test]
    fn status_classify_follows_copy_and_error_counts() {
        assert_eq!(EnumSyncStatus::classify(0, 0), EnumSyncStatus::Success);
        assert_eq!(EnumSyncStatus::classify(4, 0), EnumSyncStatus::Success);
        assert_eq!(EnumSyncStatus::classify(4, 1), EnumSyncStatus::Partial);
        assert_eq!(EnumSyncStatus::classify(0, 2), EnumSyncStatus::Failed);
        assert_eq!(EnumSyncStatus::Partial.to_string(), "partial");
    }

    #[test]
    fn type_mismatch_is_validation_error() {
        let err = SyncVendorError::type_mismatch("package", "str", "int");
        assert_eq!(err.to_string(), "package must be str, got int");
        assert_eq!(err.code(), EnumErrorCode::TypeMismatch);
        assert!(err.is_validation());

        let err = SyncVendorError::SyncFailed {
            message: "boom".to_string(),
        };
        assert!(!err.is_validation());
        assert_eq!(err.code().as_str(), "sync-failed");
    }
}
