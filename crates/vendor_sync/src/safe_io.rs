//! Whole-file UTF-8 text reader/writer with distinct encoding failures.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafeIoError {
    /// Content is not valid UTF-8.
    #[error("invalid UTF-8 in {}: {message}", path.display())]
    Unicode { path: PathBuf, message: String },
    /// Open/read/write failure.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SafeIoError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read the complete file at `path` as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, SafeIoError> {
    let raw_bytes = fs::read(path).map_err(|e| SafeIoError::io(path, e))?;
    String::from_utf8(raw_bytes).map_err(|e| SafeIoError::Unicode {
        path: path.to_path_buf(),
        message: e.utf8_error().to_string(),
    })
}

/// Create or truncate `path` and write `content` as UTF-8.
pub fn write_text(path: &Path, content: &str, if_create_parents: bool) -> Result<(), SafeIoError> {
    if if_create_parents && let Some(path_parent) = path.parent() {
        fs::create_dir_all(path_parent).map_err(|e| SafeIoError::io(path_parent, e))?;
    }
    let mut file = File::create(path).map_err(|e| SafeIoError::io(path, e))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| SafeIoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{SafeIoError, read_text, write_text};

    #[test]
    fn write_then_read_keeps_content() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("nested/dir/mod.py");

        write_text(&path, "__version__ = \"1.0\"\n# ünïcode\n", true).expect("write");
        assert_eq!(
            read_text(&path).expect("read"),
            "__version__ = \"1.0\"\n# ünïcode\n"
        );
    }

    #[test]
    fn read_reports_invalid_utf8_as_unicode_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("latin1.py");
        std::fs::write(&path, [0x63, 0x61, 0x66, 0xe9, 0x0a]).expect("write bytes");

        let err = read_text(&path).expect_err("invalid utf-8");
        assert!(matches!(err, SafeIoError::Unicode { .. }));
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let tmp = TempDir::new().expect("tempdir");
        let err = read_text(&tmp.path().join("missing.py")).expect_err("missing");
        assert!(matches!(err, SafeIoError::Io { .. }));
    }

    #[test]
    fn write_without_parents_fails_on_missing_dir() {
        let tmp = TempDir::new().expect("tempdir");
        let err = write_text(&tmp.path().join("no/such/dir.py"), "x", false)
            .expect_err("no parent");
        assert!(matches!(err, SafeIoError::Io { .. }));
    }
}
