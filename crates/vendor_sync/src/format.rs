//! Text rendering of scan results, sync reports and errors.

use crate::conf::{C_NESTED_INDENT, C_VERSION_MISSING};
use crate::report::ReportSync;
use crate::scan::{NestedVersionEntry, VersionEntry};
use crate::spec::SyncVendorError;

/// One `"{package} {version}"` line per entry; `?` marks a missing version.
pub fn format_version_output(entries: &[VersionEntry]) -> String {
    entries
        .iter()
        .map(|entry| render_line(0, &entry.package_name, entry.version.as_deref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pre-order rendering of the nested forest, indented two spaces per depth.
pub fn format_nested_version_output(entries: &[NestedVersionEntry]) -> String {
    let mut l_lines = Vec::new();
    collect_nested_lines(entries, &mut l_lines);
    l_lines.join("\n")
}

fn collect_nested_lines(entries: &[NestedVersionEntry], l_lines: &mut Vec<String>) {
    for entry in entries {
        l_lines.push(render_line(
            entry.depth,
            &entry.package_name,
            entry.version.as_deref(),
        ));
        collect_nested_lines(&entry.children, l_lines);
    }
}

fn render_line(depth: usize, package_name: &str, version: Option<&str>) -> String {
    format!(
        "{}{package_name} {}",
        C_NESTED_INDENT.repeat(depth),
        version.unwrap_or(C_VERSION_MISSING)
    )
}

/// Multi-line summary printed after a sync run.
pub fn format_sync_report(report: &ReportSync) -> String {
    let mut l_lines = vec![
        format!("Status: {}", report.status.as_str().to_uppercase()),
        format!("Files removed: {}", report.cnt_files_removed),
        format!("Files copied: {}", report.cnt_files_copied),
        format!("Directories created: {}", report.cnt_dirs_created),
    ];
    if !report.errors.is_empty() {
        l_lines.push(String::new());
        l_lines.push(format!("Errors ({}):", report.error_count()));
        l_lines.extend(report.errors.iter().map(|e| format!("  - {e}")));
    }
    l_lines.join("\n")
}

/// `"{TypeName} ({code}): {message}"`.
pub fn format_error(error: &SyncVendorError) -> String {
    format!("{} ({}): {error}", error.type_name(), error.code())
}
