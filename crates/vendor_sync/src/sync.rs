//! Two-phase vendor synchronization: clean the destination, then copy the
//! filtered source package tree into it.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::filter::{DirExcludeMatcher, ExtensionFilter, extension_of};
use crate::path::{resolve_paths, validate_destination_path_safety, validate_names};
use crate::report::{ReportSync, ReportSyncBuilder};
use crate::safe_io::{SafeIoError, read_text, write_text};
use crate::spec::{SpecSyncOptions, SyncVendorError};
use crate::util::{
    copy_file_with_metadata, derive_clean_error, derive_sync_error, is_storage_full,
};

#[derive(Debug)]
struct SpecSyncContext<'a> {
    path_dir_src: &'a Path,
    path_dir_dst: &'a Path,
    filter_ext: &'a ExtensionFilter,
    matcher_exclude_dirs: &'a DirExcludeMatcher,
    set_text_exts: HashSet<String>,
    builder_sync_report: ReportSyncBuilder,
    set_visited_dirs: HashSet<(u64, u64)>,
}

#[derive(Debug)]
struct SpecSrcEntry {
    path_src: PathBuf,
    name: String,
}

////////////////////////////////////////////////////////////////////////////////
// #region Orchestrator

/// Synchronize `source_path/package` into `target_path/vendor/package`.
///
/// `extensions` is a `;`-separated list (e.g. `"py;json;yml;yaml;ini"`).
/// See [`sync_vendor_with_options`] for the full contract.
pub fn sync_vendor<P, Q>(
    source_path: P,
    target_path: Q,
    package: &str,
    vendor: &str,
    extensions: &str,
) -> Result<ReportSync, SyncVendorError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let spec_sync_options = SpecSyncOptions {
        vendor_dir: vendor.to_string(),
        extensions: extensions.to_string(),
        ..SpecSyncOptions::default()
    };
    sync_vendor_with_options(source_path, target_path, package, &spec_sync_options)
}

/// Synchronize one package into a vendor directory.
///
/// Steps run strictly in order:
/// 1. Validate names, extension list and exclude patterns.
/// 2. Resolve and validate source/target locations.
/// 3. Clean phase: delete the existing vendor package subtree.
/// 4. Sync phase: recreate the tree and copy files with matching extensions.
/// 5. Derive the run status from copies and per-file errors.
///
/// Returns [`ReportSync`] when the run completes, possibly with per-file
/// errors. Any failure in steps 1-4 that is not per-file aborts the run and
/// is returned as [`SyncVendorError`]; no partial report is produced then.
pub fn sync_vendor_with_options<P, Q>(
    source_path: P,
    target_path: Q,
    package: &str,
    spec_sync_options: &SpecSyncOptions,
) -> Result<ReportSync, SyncVendorError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let vendor = spec_sync_options.vendor_dir.as_str();
    validate_names(package, vendor)?;
    let filter_ext = ExtensionFilter::parse(&spec_sync_options.extensions)?;
    let matcher_exclude_dirs = DirExcludeMatcher::new(&spec_sync_options.patterns_exclude_dirs)?;
    debug!(
        "Copying extensions: {}",
        filter_ext.iter().collect::<Vec<_>>().join(";")
    );

    let resolved = resolve_paths(source_path.as_ref(), target_path.as_ref(), package, vendor)?;

    let cnt_files_removed = clean_phase(&resolved.vendor_target_path)?;
    let mut builder_sync_report = sync_phase(
        &resolved.source_package_path,
        &resolved.vendor_target_path,
        &filter_ext,
        &matcher_exclude_dirs,
        &spec_sync_options.extensions_text,
    )?;
    builder_sync_report.cnt_files_removed = cnt_files_removed;

    let report = builder_sync_report.build();
    info!(
        "Sync completed with status '{}': removed {} files, copied {} files, \
         created {} directories",
        report.status,
        report.cnt_files_removed,
        report.cnt_files_copied,
        report.cnt_dirs_created
    );
    Ok(report)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CleanPhase

/// Remove `vendor_target_path` entirely and return how many regular files it held.
///
/// A missing path is a no-op returning 0. Any other failure, including one
/// while checking for the path, is fatal.
pub fn clean_phase(vendor_target_path: &Path) -> Result<u64, SyncVendorError> {
    match fs::symlink_metadata(vendor_target_path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(derive_clean_error(vendor_target_path, e)),
    }

    let cnt_files_removed = count_files(vendor_target_path)
        .map_err(|e| derive_clean_error(vendor_target_path, e))?;
    fs::remove_dir_all(vendor_target_path)
        .map_err(|e| derive_clean_error(vendor_target_path, e))?;

    info!(
        "Removed {cnt_files_removed} files from {}",
        vendor_target_path.display()
    );
    Ok(cnt_files_removed)
}

fn count_files(path_root: &Path) -> Result<u64, io::Error> {
    let mut cnt_files = 0;
    let mut l_pending = vec![path_root.to_path_buf()];
    while let Some(path_dir) = l_pending.pop() {
        for entry in fs::read_dir(&path_dir)? {
            let entry = entry?;
            let cfg_file_type = entry.file_type()?;
            if cfg_file_type.is_dir() {
                l_pending.push(entry.path());
            } else if cfg_file_type.is_file() || entry.path().is_file() {
                cnt_files += 1;
            }
        }
    }
    Ok(cnt_files)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SyncPhase

/// Mirror `source_package_path` into `vendor_target_path`, copying files
/// accepted by `filter_ext` and skipping branches matched by `matcher_exclude_dirs`.
///
/// The destination root always counts as one created directory. Per-entry
/// failures, including unreadable nested directories, are recorded in the
/// returned builder. Failures creating the root, listing the package root or
/// running out of storage abort the phase.
pub fn sync_phase(
    source_package_path: &Path,
    vendor_target_path: &Path,
    filter_ext: &ExtensionFilter,
    matcher_exclude_dirs: &DirExcludeMatcher,
    extensions_text: &[String],
) -> Result<ReportSyncBuilder, SyncVendorError> {
    fs::create_dir_all(vendor_target_path)
        .map_err(|e| derive_sync_error(vendor_target_path, e))?;

    let mut spec_sync_ctx = SpecSyncContext {
        path_dir_src: source_package_path,
        path_dir_dst: vendor_target_path,
        filter_ext,
        matcher_exclude_dirs,
        set_text_exts: extensions_text
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .collect(),
        builder_sync_report: ReportSyncBuilder::default(),
        set_visited_dirs: HashSet::new(),
    };
    spec_sync_ctx.builder_sync_report.add_dir_created();

    walk_directory(source_package_path, true, &mut spec_sync_ctx)?;

    let builder_sync_report = spec_sync_ctx.builder_sync_report;
    info!(
        "Sync phase completed: copied {} files, created {} directories",
        builder_sync_report.cnt_files_copied, builder_sync_report.cnt_dirs_created
    );
    Ok(builder_sync_report)
}

/// Whether `path_dir` was already walked (symlink loop). Unix only.
fn is_revisited_dir(path_dir: &Path, spec_sync_ctx: &mut SpecSyncContext<'_>) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        if let Ok(stat_dir) = fs::metadata(path_dir) {
            return !spec_sync_ctx
                .set_visited_dirs
                .insert((stat_dir.dev(), stat_dir.ino()));
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (path_dir, &spec_sync_ctx.set_visited_dirs);
    }
    false
}

/// Failure listing `path_dir`: fatal at the package root or when storage is
/// full, otherwise recorded and the branch is skipped.
fn handle_listing_error(
    path_dir: &Path,
    e: io::Error,
    if_is_root: bool,
    spec_sync_ctx: &mut SpecSyncContext<'_>,
) -> Result<(), SyncVendorError> {
    if if_is_root || is_storage_full(&e) {
        return Err(derive_sync_error(path_dir, e));
    }
    warn!("Error processing {}: {e}", path_dir.display());
    spec_sync_ctx
        .builder_sync_report
        .add_processing_error(path_dir, &e.to_string());
    Ok(())
}

fn walk_directory(
    path_root: &Path,
    if_is_root: bool,
    spec_sync_ctx: &mut SpecSyncContext<'_>,
) -> Result<(), SyncVendorError> {
    if is_revisited_dir(path_root, spec_sync_ctx) {
        warn!("Symlink loop detected, skipping: {}", path_root.display());
        return Ok(());
    }

    let mut l_dirs: Vec<SpecSrcEntry> = Vec::new();
    let mut l_files: Vec<SpecSrcEntry> = Vec::new();

    let iter_entries = match fs::read_dir(path_root) {
        Ok(v) => v,
        Err(e) => return handle_listing_error(path_root, e, if_is_root, spec_sync_ctx),
    };
    for entry_res in iter_entries {
        let entry = match entry_res {
            Ok(v) => v,
            Err(e) => {
                handle_listing_error(path_root, e, if_is_root, spec_sync_ctx)?;
                continue;
            }
        };
        let path_src = entry.path();
        let path_rel = path_src
            .strip_prefix(spec_sync_ctx.path_dir_src)
            .unwrap_or(path_src.as_path());
        if spec_sync_ctx.matcher_exclude_dirs.is_excluded(path_rel) {
            debug!("Skipping excluded path {}", path_src.display());
            continue;
        }

        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_sync_ctx
                    .builder_sync_report
                    .add_processing_error(&path_src, &e.to_string());
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();
        let b_is_dir =
            cfg_file_type.is_dir() || (cfg_file_type.is_symlink() && path_src.is_dir());
        if b_is_dir {
            l_dirs.push(SpecSrcEntry { path_src, name });
        } else if cfg_file_type.is_file() || path_src.is_file() {
            l_files.push(SpecSrcEntry { path_src, name });
        }
    }

    l_dirs.sort_by(|a, b| a.name.cmp(&b.name));
    l_files.sort_by(|a, b| a.name.cmp(&b.name));

    for spec_dir_entry in l_dirs {
        if handle_dir_entry(&spec_dir_entry, spec_sync_ctx) {
            walk_directory(&spec_dir_entry.path_src, false, spec_sync_ctx)?;
        }
    }
    for spec_file_entry in l_files {
        handle_file_entry(&spec_file_entry, spec_sync_ctx);
    }
    Ok(())
}

fn derive_destination_path(path_src: &Path, spec_sync_ctx: &SpecSyncContext<'_>) -> PathBuf {
    match path_src.strip_prefix(spec_sync_ctx.path_dir_src) {
        Ok(path_rel) => spec_sync_ctx.path_dir_dst.join(path_rel),
        Err(_) => spec_sync_ctx.path_dir_dst.join(path_src.file_name().unwrap_or_default()),
    }
}

/// Create the mirrored directory; returns whether to descend into it.
fn handle_dir_entry(
    spec_dir_entry: &SpecSrcEntry,
    spec_sync_ctx: &mut SpecSyncContext<'_>,
) -> bool {
    let path_dir_dst = derive_destination_path(&spec_dir_entry.path_src, spec_sync_ctx);
    let res_mkdir = validate_destination_path_safety(&path_dir_dst, spec_sync_ctx.path_dir_dst)
        .and_then(|_| fs::create_dir_all(&path_dir_dst).map_err(|e| e.to_string()));

    match res_mkdir {
        Ok(_) => {
            spec_sync_ctx.builder_sync_report.add_dir_created();
            true
        }
        Err(msg) => {
            warn!("Error processing {}: {msg}", spec_dir_entry.path_src.display());
            spec_sync_ctx
                .builder_sync_report
                .add_processing_error(&spec_dir_entry.path_src, &msg);
            false
        }
    }
}

fn handle_file_entry(spec_file_entry: &SpecSrcEntry, spec_sync_ctx: &mut SpecSyncContext<'_>) {
    let path_file_src = &spec_file_entry.path_src;
    if !spec_sync_ctx.filter_ext.matches(path_file_src) {
        return;
    }

    let path_file_dst = derive_destination_path(path_file_src, spec_sync_ctx);
    let res_prepare = validate_destination_path_safety(&path_file_dst, spec_sync_ctx.path_dir_dst)
        .and_then(|_| match path_file_dst.parent() {
            Some(path_parent_dst) => {
                fs::create_dir_all(path_parent_dst).map_err(|e| e.to_string())
            }
            None => Ok(()),
        });
    if let Err(msg) = res_prepare {
        warn!("Error processing {}: {msg}", path_file_src.display());
        spec_sync_ctx
            .builder_sync_report
            .add_processing_error(path_file_src, &msg);
        return;
    }

    let ext = extension_of(path_file_src);
    if spec_sync_ctx.set_text_exts.contains(&ext) {
        let res_copy = read_text(path_file_src)
            .and_then(|content| write_text(&path_file_dst, &content, true));
        match res_copy {
            Ok(_) => {}
            Err(e @ SafeIoError::Unicode { .. }) => {
                warn!("Unicode error: {e}");
                spec_sync_ctx
                    .builder_sync_report
                    .add_unicode_error(path_file_src, &e.to_string());
                return;
            }
            Err(e @ SafeIoError::Io { .. }) => {
                warn!("Safe IO error: {e}");
                spec_sync_ctx
                    .builder_sync_report
                    .add_copy_error(path_file_src, &e.to_string());
                return;
            }
        }
    } else if let Err(e) = copy_file_with_metadata(path_file_src, &path_file_dst) {
        warn!("Error processing {}: {e}", path_file_src.display());
        spec_sync_ctx
            .builder_sync_report
            .add_processing_error(path_file_src, &e.to_string());
        return;
    }

    spec_sync_ctx.builder_sync_report.add_copied();
    debug!(
        "Copied {} to {}",
        path_file_src.display(),
        path_file_dst.display()
    );
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
