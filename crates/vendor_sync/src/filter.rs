//! Extension and directory filters applied during the sync phase.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::conf::C_EXTENSION_DELIMITER;
use crate::spec::{EnumErrorCode, SyncVendorError};

////////////////////////////////////////////////////////////////////////////////
// #region ExtensionFilter

/// Case-insensitive set of file extensions eligible for copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    set_extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Parse a `;`-separated list such as `"py; JSON;.yml"`.
    ///
    /// Tokens are trimmed, lower-cased and stripped of leading dots. Empty
    /// tokens are dropped; an input without any token is rejected.
    pub fn parse(raw_extensions: &str) -> Result<Self, SyncVendorError> {
        let set_extensions = raw_extensions
            .split(C_EXTENSION_DELIMITER)
            .map(normalize_extension)
            .filter(|ext| !ext.is_empty())
            .collect::<BTreeSet<_>>();

        if set_extensions.is_empty() {
            return Err(SyncVendorError::invalid_value(
                EnumErrorCode::InvalidValue,
                "extensions must be non-empty",
            ));
        }
        Ok(Self { set_extensions })
    }

    /// Whether `ext` (any case, with or without dot) is in the set.
    pub fn contains(&self, ext: &str) -> bool {
        self.set_extensions.contains(&normalize_extension(ext))
    }

    /// Whether the file at `path` should be copied.
    pub fn matches(&self, path: &Path) -> bool {
        self.contains(&extension_of(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.set_extensions.iter().map(String::as_str)
    }
}

fn normalize_extension(token: &str) -> String {
    token.trim().trim_start_matches('.').to_lowercase()
}

/// Lower-cased extension of `path`, empty when there is none.
///
/// Dot-files such as `.gitignore` have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DirectoryExclusion

/// Matches path components that exclude a whole branch (e.g. `__pycache__`).
#[derive(Debug, Clone)]
pub struct DirExcludeMatcher {
    glob_set: GlobSet,
}

impl DirExcludeMatcher {
    pub fn new(patterns: &[String]) -> Result<Self, SyncVendorError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                SyncVendorError::invalid_value(
                    EnumErrorCode::InvalidValue,
                    format!("Invalid directory exclude pattern `{pattern}`: {e}"),
                )
            })?;
            builder.add(glob);
        }
        let glob_set = builder.build().map_err(|e| {
            SyncVendorError::invalid_value(
                EnumErrorCode::InvalidValue,
                format!("Invalid directory exclude patterns: {e}"),
            )
        })?;
        Ok(Self { glob_set })
    }

    /// Whether any normal component of `path_rel` matches an exclude pattern.
    pub fn is_excluded(&self, path_rel: &Path) -> bool {
        path_rel.components().any(|component| match component {
            Component::Normal(name) => self.glob_set.is_match(Path::new(name)),
            _ => false,
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{DirExcludeMatcher, ExtensionFilter, extension_of};
    use crate::spec::{EnumErrorCode, SyncVendorError};

    #[test]
    fn parse_normalizes_tokens() {
        let filter = ExtensionFilter::parse(" PY ;json;.Yml;; ").expect("parse");
        assert_eq!(filter.iter().collect::<Vec<_>>(), vec!["json", "py", "yml"]);
        assert!(filter.contains("YML"));
        assert!(filter.contains(".json"));
        assert!(!filter.contains("md"));
    }

    #[test]
    fn parse_rejects_blank_input() {
        for raw in ["", "   ", ";;", " ; "] {
            let err = ExtensionFilter::parse(raw).expect_err("blank must fail");
            assert!(matches!(
                err,
                SyncVendorError::InvalidValue {
                    code: EnumErrorCode::InvalidValue,
                    ..
                }
            ));
        }
    }

    #[test]
    fn matches_is_case_insensitive() {
        let filter = ExtensionFilter::parse("py;json").expect("parse");
        assert!(filter.matches(Path::new("pkg/Core.PY")));
        assert!(filter.matches(Path::new("data.Json")));
        assert!(!filter.matches(Path::new("readme.md")));
        assert!(!filter.matches(Path::new("Makefile")));
    }

    #[test]
    fn extension_of_uses_last_suffix() {
        assert_eq!(extension_of(Path::new("a/b/archive.tar.GZ")), "gz");
        assert_eq!(extension_of(Path::new("LICENSE")), "");
        assert_eq!(extension_of(Path::new(".gitignore")), "");
    }

    #[test]
    fn dir_exclude_matches_any_component() {
        let matcher = DirExcludeMatcher::new(&["__pycache__".to_string()]).expect("matcher");
        assert!(matcher.is_excluded(Path::new("__pycache__")));
        assert!(matcher.is_excluded(Path::new("sub/__pycache__/mod.cpython-312.pyc")));
        assert!(!matcher.is_excluded(Path::new("sub/pycache/mod.py")));
    }

    #[test]
    fn dir_exclude_rejects_invalid_glob() {
        let err = DirExcludeMatcher::new(&["[".to_string()]).expect_err("invalid glob");
        assert!(err.is_validation());
    }
}
