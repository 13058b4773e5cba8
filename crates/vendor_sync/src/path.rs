//! Path resolution and validation for sync requests.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::spec::{EnumErrorCode, SyncVendorError};

/// Source and destination locations of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Canonical `source_path/package`; always an existing directory.
    pub source_package_path: PathBuf,
    /// `target_path/vendor/package`; canonical when it exists, normalized otherwise.
    pub vendor_target_path: PathBuf,
}

////////////////////////////////////////////////////////////////////////////////
// #region PathValidator

/// Rejects paths with control characters and paths escaping a base directory.
#[derive(Debug, Clone)]
pub struct PathValidator {
    re_unsafe_chars: Regex,
}

impl PathValidator {
    pub fn new() -> Result<Self, SyncVendorError> {
        let re_unsafe_chars = Regex::new(r"[\x00-\x1f\x7f]").map_err(|e| {
            SyncVendorError::SyncFailed {
                message: format!("Failed to compile path validation pattern: {e}"),
            }
        })?;
        Ok(Self { re_unsafe_chars })
    }

    /// Check `path` for unsafe characters and, when `path_base` is given,
    /// that its resolved form stays under `path_base`.
    ///
    /// Returns the resolved path on success.
    pub fn get_validated_path(
        &self,
        path: &Path,
        path_base: Option<&Path>,
    ) -> Result<PathBuf, SyncVendorError> {
        let c_path = path.to_string_lossy();
        if self.re_unsafe_chars.is_match(&c_path) {
            return Err(path_validation_error(format!(
                "Path contains control characters: {c_path:?}"
            )));
        }

        let path_resolved = resolve_lenient(path);
        if let Some(path_base) = path_base {
            let path_base_resolved = resolve_lenient(path_base);
            if !path_resolved.starts_with(&path_base_resolved) {
                return Err(path_validation_error(format!(
                    "Path escapes base directory: {} (base={})",
                    path_resolved.display(),
                    path_base_resolved.display()
                )));
            }
        }
        Ok(path_resolved)
    }
}

fn path_validation_error(message: String) -> SyncVendorError {
    SyncVendorError::invalid_value(
        EnumErrorCode::PathValidationFailed,
        format!("Path validation failed: {message}"),
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathResolver

/// Reject empty or whitespace-only package and vendor names.
pub fn validate_names(package: &str, vendor: &str) -> Result<(), SyncVendorError> {
    if package.trim().is_empty() {
        return Err(SyncVendorError::invalid_value(
            EnumErrorCode::InvalidPackage,
            "package must be non-empty",
        ));
    }
    if vendor.trim().is_empty() {
        return Err(SyncVendorError::invalid_value(
            EnumErrorCode::InvalidValue,
            "vendor must be non-empty",
        ));
    }
    Ok(())
}

/// Resolve and validate the locations of one sync request.
///
/// The source root, the package directory and the target root must exist.
/// The package directory must stay inside the source root and the vendor
/// destination inside the target root.
pub fn resolve_paths(
    source_path: &Path,
    target_path: &Path,
    package: &str,
    vendor: &str,
) -> Result<ResolvedPaths, SyncVendorError> {
    validate_names(package, vendor)?;

    let path_src_root = absolutize_path(source_path);
    let path_dst_root = absolutize_path(target_path);

    if !path_src_root.exists() {
        return Err(path_not_found(format!(
            "source_path does not exist: {}",
            path_src_root.display()
        )));
    }
    let path_src_root = canonicalize_existing(&path_src_root)?;

    let path_src_package = path_src_root.join(package);
    if !path_src_package.is_dir() {
        return Err(path_not_found(format!(
            "package directory not found: {}",
            path_src_package.display()
        )));
    }

    if !path_dst_root.exists() {
        return Err(path_not_found(format!(
            "target_path does not exist: {}",
            path_dst_root.display()
        )));
    }
    let path_dst_root = canonicalize_existing(&path_dst_root)?;

    let validator = PathValidator::new()?;
    let source_package_path =
        validator.get_validated_path(&path_src_package, Some(&path_src_root))?;
    validator.get_validated_path(&path_dst_root, None)?;
    let vendor_target_path = validator.get_validated_path(
        &path_dst_root.join(vendor).join(package),
        Some(&path_dst_root),
    )?;

    Ok(ResolvedPaths {
        source_package_path,
        vendor_target_path,
    })
}

fn path_not_found(message: String) -> SyncVendorError {
    SyncVendorError::invalid_value(EnumErrorCode::PathNotFound, message)
}

fn canonicalize_existing(path: &Path) -> Result<PathBuf, SyncVendorError> {
    dunce::canonicalize(path).map_err(|e| SyncVendorError::SyncFailed {
        message: format!("Failed to resolve {}: {e}", path.display()),
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Join relative paths onto the current directory.
pub(crate) fn absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Drop `.` and fold `..` components without touching the filesystem.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut path_out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !path_out.pop() {
                    path_out.push(component.as_os_str());
                }
            }
            other => path_out.push(other.as_os_str()),
        }
    }
    path_out
}

/// Canonical form when the path exists, lexical normalization otherwise.
fn resolve_lenient(path: &Path) -> PathBuf {
    let path_abs = absolutize_path(path);
    dunce::canonicalize(&path_abs).unwrap_or_else(|_| normalize_lexically(&path_abs))
}

/// Check that a destination item stays under the vendor package root and does
/// not pass through a symlink on its way there.
pub(crate) fn validate_destination_path_safety(
    path_dst_item: &Path,
    path_dir_dst_root: &Path,
) -> Result<(), String> {
    let path_dir_dst_root_abs = normalize_lexically(&absolutize_path(path_dir_dst_root));
    let path_dst_item_abs = normalize_lexically(&absolutize_path(path_dst_item));

    let path_rel = path_dst_item_abs
        .strip_prefix(&path_dir_dst_root_abs)
        .map_err(|_| {
            format!(
                "Unsafe destination path escapes vendor root: {} (root={})",
                path_dst_item.display(),
                path_dir_dst_root.display()
            )
        })?;

    let mut path_cursor = path_dir_dst_root_abs.clone();
    for part_rel in path_rel.components() {
        path_cursor.push(part_rel.as_os_str());
        match fs::symlink_metadata(&path_cursor) {
            Ok(meta_cursor) if meta_cursor.file_type().is_symlink() => {
                return Err(format!(
                    "Unsafe destination path traverses symlink component: {}",
                    path_cursor.display()
                ));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => {
                return Err(format!(
                    "Failed to inspect destination path component {} ({e})",
                    path_cursor.display()
                ));
            }
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{
        PathValidator, normalize_lexically, resolve_paths, validate_destination_path_safety,
    };
    use crate::spec::{EnumErrorCode, SyncVendorError};

    fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("source");
        let dst = tmp.path().join("target");
        fs::create_dir_all(src.join("mylib")).expect("mkdir src");
        fs::create_dir_all(&dst).expect("mkdir dst");
        (tmp, src, dst)
    }

    fn assert_code(err: SyncVendorError, code: EnumErrorCode) {
        assert_eq!(err.code(), code, "unexpected error: {err}");
    }

    #[test]
    fn resolve_paths_builds_package_and_vendor_locations() {
        let (_tmp, src, dst) = setup();
        let resolved = resolve_paths(&src, &dst, "mylib", "_vendor").expect("resolve");

        let src_canonical = dunce::canonicalize(&src).expect("canonical src");
        let dst_canonical = dunce::canonicalize(&dst).expect("canonical dst");
        assert_eq!(resolved.source_package_path, src_canonical.join("mylib"));
        assert_eq!(
            resolved.vendor_target_path,
            dst_canonical.join("_vendor").join("mylib")
        );
    }

    #[test]
    fn resolve_paths_rejects_missing_locations() {
        let (tmp, src, dst) = setup();

        let err = resolve_paths(&tmp.path().join("nope"), &dst, "mylib", "_vendor")
            .expect_err("missing source");
        assert_code(err, EnumErrorCode::PathNotFound);

        let err = resolve_paths(&src, &dst, "other", "_vendor").expect_err("missing package");
        assert_code(err, EnumErrorCode::PathNotFound);

        let err = resolve_paths(&src, &tmp.path().join("nope"), "mylib", "_vendor")
            .expect_err("missing target");
        assert_code(err, EnumErrorCode::PathNotFound);
    }

    #[test]
    fn resolve_paths_rejects_blank_names() {
        let (_tmp, src, dst) = setup();
        let err = resolve_paths(&src, &dst, "  ", "_vendor").expect_err("blank package");
        assert_code(err, EnumErrorCode::InvalidPackage);

        let err = resolve_paths(&src, &dst, "mylib", "").expect_err("blank vendor");
        assert_code(err, EnumErrorCode::InvalidValue);
    }

    #[test]
    fn resolve_paths_rejects_traversal_escape() {
        let (tmp, src, dst) = setup();
        fs::create_dir_all(tmp.path().join("outside")).expect("mkdir outside");

        let err = resolve_paths(&src, &dst, "../outside", "_vendor").expect_err("escape");
        assert_code(err, EnumErrorCode::PathValidationFailed);

        let err = resolve_paths(&src, &dst, "mylib", "../..").expect_err("vendor escape");
        assert_code(err, EnumErrorCode::PathValidationFailed);
    }

    #[cfg(unix)]
    #[test]
    fn resolve_paths_checks_symlinked_package_by_its_target() {
        use std::os::unix::fs::symlink;

        let (tmp, src, dst) = setup();
        fs::create_dir_all(tmp.path().join("outside")).expect("mkdir outside");
        symlink(tmp.path().join("outside"), src.join("escaped")).expect("symlink out");
        symlink(src.join("mylib"), src.join("alias")).expect("symlink in");

        let err = resolve_paths(&src, &dst, "escaped", "_vendor").expect_err("outside root");
        assert_code(err, EnumErrorCode::PathValidationFailed);

        let resolved = resolve_paths(&src, &dst, "alias", "_vendor").expect("inside root");
        assert_eq!(
            resolved.source_package_path,
            dunce::canonicalize(src.join("mylib")).expect("canonical mylib")
        );
    }

    #[test]
    fn validator_rejects_control_characters() {
        let validator = PathValidator::new().expect("validator");
        let err = validator
            .get_validated_path(Path::new("bad\u{1}name"), None)
            .expect_err("control char");
        assert_code(err, EnumErrorCode::PathValidationFailed);
    }

    #[test]
    fn normalize_lexically_folds_parent_components() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/./c/../d")),
            Path::new("/a/b/d")
        );
    }

    #[test]
    fn destination_safety_blocks_escape() {
        let (_tmp, _src, dst) = setup();
        let root = dst.join("_vendor/mylib");
        assert!(validate_destination_path_safety(&root.join("a/b.py"), &root).is_ok());
        assert!(validate_destination_path_safety(&root.join("../other.py"), &root).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn destination_safety_blocks_symlink_component() {
        use std::os::unix::fs::symlink;

        let (tmp, _src, dst) = setup();
        let root = dst.join("_vendor/mylib");
        fs::create_dir_all(&root).expect("mkdir root");
        symlink(tmp.path(), root.join("link")).expect("symlink");

        let err = validate_destination_path_safety(&root.join("link/x.py"), &root)
            .expect_err("symlink component");
        assert!(err.contains("symlink"));
    }
}
