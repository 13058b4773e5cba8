//! `vendor_sync` v1:
//! Vendor package synchronization and vendored version scanning.
//!
//! Module layout:
//! - `conf`    : constants and defaults
//! - `spec`    : enums/options/errors
//! - `report`  : sync report model and builder
//! - `filter`  : extension filter and excluded-directory matcher
//! - `path`    : path resolution and traversal validation
//! - `safe_io` : UTF-8 text reader/writer
//! - `sync`    : clean phase, sync phase and orchestration
//! - `version` : version tag extraction from Python sources
//! - `scan`    : flat and nested vendor scans
//! - `format`  : text rendering for scans, reports and errors
//! - `util`    : shared helper functions

pub mod conf;
pub mod filter;
pub mod format;
pub mod path;
pub mod report;
pub mod safe_io;
pub mod scan;
pub mod spec;
pub mod sync;
mod util;
pub mod version;

pub use filter::ExtensionFilter;
pub use format::{
    format_error, format_nested_version_output, format_sync_report, format_version_output,
};
pub use path::{PathValidator, ResolvedPaths, resolve_paths};
pub use report::{ReportSync, ReportSyncBuilder};
pub use scan::{
    NestedVersionEntry, VersionEntry, scan_vendor_packages, scan_vendor_packages_nested,
    scan_vendor_packages_nested_with_options, scan_vendor_packages_with_options,
};
pub use spec::{
    EnumErrorCode, EnumSyncStatus, SpecScanOptions, SpecSyncOptions, SyncVendorError,
};
pub use sync::{clean_phase, sync_phase, sync_vendor, sync_vendor_with_options};
pub use version::{VersionExtractor, extract_version_from_file};
