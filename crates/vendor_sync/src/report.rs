//! Sync report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::spec::EnumSyncStatus;

/// Aggregate counters and diagnostics for one `sync_vendor` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSync {
    /// Regular files deleted by the clean phase.
    pub cnt_files_removed: u64,
    /// Files whose extension matched and were written to the vendor tree.
    pub cnt_files_copied: u64,
    /// Directories created, including the vendor package root.
    pub cnt_dirs_created: u64,
    /// Final run status derived from copies and errors.
    pub status: EnumSyncStatus,
    /// Per-file failures in traversal order.
    pub errors: Vec<String>,
}

impl ReportSync {
    /// Number of collected per-file errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("files_removed".to_string(), self.cnt_files_removed);
        dict_counts.insert("files_copied".to_string(), self.cnt_files_copied);
        dict_counts.insert("directories_created".to_string(), self.cnt_dirs_created);
        dict_counts.insert("errors".to_string(), self.error_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} status={} removed={} copied={} dirs={} errors={}",
            self.status,
            self.cnt_files_removed,
            self.cnt_files_copied,
            self.cnt_dirs_created,
            self.error_count()
        )
    }
}

impl fmt::Display for ReportSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SYNC]"))
    }
}

/// Mutable accumulator for one sync run.
#[derive(Debug, Default, Clone)]
pub struct ReportSyncBuilder {
    /// See [`ReportSync::cnt_files_removed`].
    pub cnt_files_removed: u64,
    /// See [`ReportSync::cnt_files_copied`].
    pub cnt_files_copied: u64,
    /// See [`ReportSync::cnt_dirs_created`].
    pub cnt_dirs_created: u64,
    /// See [`ReportSync::errors`].
    pub errors: Vec<String>,
}

impl ReportSyncBuilder {
    pub fn add_copied(&mut self) {
        self.cnt_files_copied += 1;
    }

    pub fn add_dir_created(&mut self) {
        self.cnt_dirs_created += 1;
    }

    /// Encoding failure while copying a text file.
    pub fn add_unicode_error(&mut self, path_src: &Path, message: &str) {
        self.errors.push(format!(
            "Unicode error copying {}: {message}",
            path_src.display()
        ));
    }

    /// Any other failure of the safe text reader/writer.
    pub fn add_copy_error(&mut self, path_src: &Path, message: &str) {
        self.errors
            .push(format!("Error copying {}: {message}", path_src.display()));
    }

    /// Failure outside the text path (mkdir, byte copy, unsafe destination).
    pub fn add_processing_error(&mut self, path_src: &Path, message: &str) {
        self.errors
            .push(format!("Error processing {}: {message}", path_src.display()));
    }

    /// Finalize builder into immutable report; status is derived here.
    pub fn build(self) -> ReportSync {
        let status = EnumSyncStatus::classify(self.cnt_files_copied, self.errors.len());
        ReportSync {
            cnt_files_removed: self.cnt_files_removed,
            cnt_files_copied: self.cnt_files_copied,
            cnt_dirs_created: self.cnt_dirs_created,
            status,
            errors: self.errors,
        }
    }
}
