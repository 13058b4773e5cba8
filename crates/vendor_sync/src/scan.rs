//! Vendor tree scanning: one version per vendored package, optionally
//! descending into each package's own vendor directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::conf::{C_ENTRY_FILE_INIT, C_ENTRY_FILE_MAIN};
use crate::spec::{EnumErrorCode, SpecScanOptions, SyncVendorError};
use crate::version::VersionExtractor;

/// Version of one vendored package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub package_name: String,
    /// `None` when neither entry file declares the tag as a string.
    pub version: Option<String>,
}

/// Node of the nested vendor forest. Children are owned exclusively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedVersionEntry {
    pub package_name: String,
    pub version: Option<String>,
    /// 0 for packages directly under the scanned vendor directory.
    pub depth: usize,
    /// Package whose vendor directory holds this one; `None` at depth 0.
    pub parent_package: Option<String>,
    pub children: Vec<NestedVersionEntry>,
}

////////////////////////////////////////////////////////////////////////////////
// #region FlatScan

/// List the packages under `target_path/vendor_dir` with their versions.
///
/// Fails with a value error when `target_path` or the vendor directory is
/// missing. Packages come back sorted by name; entries starting with `_` and
/// non-directories are ignored.
pub fn scan_vendor_packages(
    target_path: &Path,
    vendor_dir: &str,
    version_tag: &str,
) -> Result<Vec<VersionEntry>, SyncVendorError> {
    let path_dir_vendor = validate_scan_root(target_path, vendor_dir)?;
    let extractor = VersionExtractor::new(version_tag);

    let l_entries = list_package_dirs(&path_dir_vendor)?
        .into_iter()
        .map(|(name, path_dir_package)| VersionEntry {
            version: extract_package_version(&extractor, &path_dir_package),
            package_name: name,
        })
        .collect::<Vec<_>>();
    debug!(
        "Scanned {} package(s) in {}",
        l_entries.len(),
        path_dir_vendor.display()
    );
    Ok(l_entries)
}

pub fn scan_vendor_packages_with_options(
    target_path: &Path,
    spec_scan_options: &SpecScanOptions,
) -> Result<Vec<VersionEntry>, SyncVendorError> {
    scan_vendor_packages(
        target_path,
        &spec_scan_options.vendor_dir,
        &spec_scan_options.version_tag,
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NestedScan

/// Scan like [`scan_vendor_packages`] and recurse into every package that has
/// its own `vendor_dir`.
///
/// `depth` and `parent_package` label the returned entries. Existence checks
/// run only at depth 0; recursion happens only into directories that exist.
pub fn scan_vendor_packages_nested(
    target_path: &Path,
    vendor_dir: &str,
    version_tag: &str,
    depth: usize,
    parent_package: Option<&str>,
) -> Result<Vec<NestedVersionEntry>, SyncVendorError> {
    let path_dir_vendor = if depth == 0 {
        validate_scan_root(target_path, vendor_dir)?
    } else {
        target_path.join(vendor_dir)
    };
    let extractor = VersionExtractor::new(version_tag);
    scan_nested_level(&extractor, &path_dir_vendor, vendor_dir, depth, parent_package)
}

pub fn scan_vendor_packages_nested_with_options(
    target_path: &Path,
    spec_scan_options: &SpecScanOptions,
) -> Result<Vec<NestedVersionEntry>, SyncVendorError> {
    scan_vendor_packages_nested(
        target_path,
        &spec_scan_options.vendor_dir,
        &spec_scan_options.version_tag,
        0,
        None,
    )
}

fn scan_nested_level(
    extractor: &VersionExtractor,
    path_dir_vendor: &Path,
    vendor_dir: &str,
    depth: usize,
    parent_package: Option<&str>,
) -> Result<Vec<NestedVersionEntry>, SyncVendorError> {
    let mut l_entries = Vec::new();
    for (name, path_dir_package) in list_package_dirs(path_dir_vendor)? {
        let version = extract_package_version(extractor, &path_dir_package);

        let path_dir_nested = path_dir_package.join(vendor_dir);
        let children = if path_dir_nested.is_dir() {
            scan_nested_level(
                extractor,
                &path_dir_nested,
                vendor_dir,
                depth + 1,
                Some(name.as_str()),
            )?
        } else {
            Vec::new()
        };

        l_entries.push(NestedVersionEntry {
            package_name: name,
            version,
            depth,
            parent_package: parent_package.map(str::to_string),
            children,
        });
    }
    Ok(l_entries)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Helpers

fn validate_scan_root(target_path: &Path, vendor_dir: &str) -> Result<PathBuf, SyncVendorError> {
    if !target_path.exists() {
        return Err(SyncVendorError::invalid_value(
            EnumErrorCode::PathNotFound,
            format!("Target path does not exist: {}", target_path.display()),
        ));
    }
    let path_dir_vendor = target_path.join(vendor_dir);
    if !path_dir_vendor.exists() {
        return Err(SyncVendorError::invalid_value(
            EnumErrorCode::PathNotFound,
            format!("Vendor directory does not exist: {}", path_dir_vendor.display()),
        ));
    }
    Ok(path_dir_vendor)
}

/// Sorted `(name, path)` pairs of candidate package directories.
fn list_package_dirs(path_dir_vendor: &Path) -> Result<Vec<(String, PathBuf)>, SyncVendorError> {
    let iter_entries =
        fs::read_dir(path_dir_vendor).map_err(|e| derive_list_error(path_dir_vendor, e))?;

    let mut l_dirs = Vec::new();
    for entry in iter_entries {
        let entry = entry.map_err(|e| derive_list_error(path_dir_vendor, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path_entry = entry.path();
        if name.starts_with('_') || !path_entry.is_dir() {
            continue;
        }
        l_dirs.push((name, path_entry));
    }
    l_dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(l_dirs)
}

/// `__init__.py` first, then `__main__.py`.
fn extract_package_version(
    extractor: &VersionExtractor,
    path_dir_package: &Path,
) -> Option<String> {
    [C_ENTRY_FILE_INIT, C_ENTRY_FILE_MAIN]
        .iter()
        .map(|name| path_dir_package.join(name))
        .filter(|path_file| path_file.is_file())
        .find_map(|path_file| extractor.extract_from_file(&path_file))
}

fn derive_list_error(path_dir: &Path, e: io::Error) -> SyncVendorError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        return SyncVendorError::Os {
            code: EnumErrorCode::PermissionDenied,
            message: format!("Permission denied listing {}: {e}", path_dir.display()),
            path: path_dir.to_path_buf(),
            source: e,
        };
    }
    SyncVendorError::SyncFailed {
        message: format!("Failed to list {}: {e}", path_dir.display()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
