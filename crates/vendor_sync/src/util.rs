use std::fs;
use std::io;
use std::path::Path;

use crate::spec::{EnumErrorCode, SyncVendorError};

////////////////////////////////////////////////////////////////////////////////
// #region BinaryCopy

/// Byte-for-byte copy keeping permissions, timestamps and (Linux) xattrs.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    apply_file_times(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

fn apply_file_times(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    set_file_times(
        path_file_dst,
        FileTime::from_last_access_time(&stat_src),
        FileTime::from_last_modification_time(&stat_src),
    )
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let Ok(iter_xattr_names) = xattr::list(path_file_src) else {
        return;
    };
    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                "Skipped xattr {:?} on {}: {e}",
                name,
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OsErrorClassification

/// Best-effort check for a storage-capacity failure.
///
/// Falls back to the error text, which is platform and locale dependent.
pub(crate) fn is_storage_full(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::StorageFull || e.to_string().to_lowercase().contains("disk")
}

/// Fatal clean-phase failure: `permission-denied` or `deletion-failed`.
pub(crate) fn derive_clean_error(path: &Path, e: io::Error) -> SyncVendorError {
    let (code, message) = if e.kind() == io::ErrorKind::PermissionDenied {
        (
            EnumErrorCode::PermissionDenied,
            format!("Permission denied removing {}: {e}", path.display()),
        )
    } else {
        (
            EnumErrorCode::DeletionFailed,
            format!("Failed to remove vendor directory: {e}"),
        )
    };
    SyncVendorError::Os {
        code,
        message,
        path: path.to_path_buf(),
        source: e,
    }
}

/// Fatal sync-phase failure: `permission-denied`, `disk-full` or `copy-failed`.
pub(crate) fn derive_sync_error(path: &Path, e: io::Error) -> SyncVendorError {
    let (code, message) = if e.kind() == io::ErrorKind::PermissionDenied {
        (
            EnumErrorCode::PermissionDenied,
            format!("Permission denied during sync: {e}"),
        )
    } else if is_storage_full(&e) {
        (
            EnumErrorCode::DiskFull,
            format!("Disk full or I/O error: {e}"),
        )
    } else {
        (
            EnumErrorCode::CopyFailed,
            format!("Failed to copy files: {e}"),
        )
    };
    SyncVendorError::Os {
        code,
        message,
        path: path.to_path_buf(),
        source: e,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
