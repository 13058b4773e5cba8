use std::path::PathBuf;

use pyo3::exceptions::{PyKeyError, PyOSError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};

use vendor_sync::conf::{C_EXTENSIONS_DEFAULT, C_VENDOR_DIR_DEFAULT, C_VERSION_TAG_DEFAULT};
use vendor_sync::{
    NestedVersionEntry, ReportSync, SpecSyncOptions, SyncVendorError, VersionEntry,
    extract_version_from_file, format_nested_version_output, format_version_output,
    scan_vendor_packages, scan_vendor_packages_nested, sync_vendor_with_options,
};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "vendor_sync.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

////////////////////////////////////////////////////////////////////////////////
// #region PyClasses

#[pyclass(name = "SyncResult")]
#[derive(Debug, Clone)]
struct PySyncResult {
    #[pyo3(get)]
    files_removed: u64,
    #[pyo3(get)]
    files_copied: u64,
    #[pyo3(get)]
    directories_created: u64,
    #[pyo3(get)]
    status: String,
    #[pyo3(get)]
    errors: Vec<String>,
}

impl From<ReportSync> for PySyncResult {
    fn from(report_sync: ReportSync) -> Self {
        Self {
            files_removed: report_sync.cnt_files_removed,
            files_copied: report_sync.cnt_files_copied,
            directories_created: report_sync.cnt_dirs_created,
            status: report_sync.status.as_str().to_string(),
            errors: report_sync.errors,
        }
    }
}

#[pymethods]
impl PySyncResult {
    #[getter]
    fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict_result = PyDict::new(py);
        dict_result.set_item("files_removed", self.files_removed)?;
        dict_result.set_item("files_copied", self.files_copied)?;
        dict_result.set_item("directories_created", self.directories_created)?;
        dict_result.set_item("status", &self.status)?;
        dict_result.set_item("errors", self.errors.clone())?;
        Ok(dict_result)
    }

    fn __getitem__<'py>(&self, py: Python<'py>, key: &str) -> PyResult<Bound<'py, PyAny>> {
        match self.to_dict(py)?.get_item(key)? {
            Some(value) => Ok(value),
            None => Err(PyKeyError::new_err(key.to_string())),
        }
    }

    #[pyo3(signature = (prefix = "[SYNC]"))]
    fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} status={} removed={} copied={} dirs={} errors={}",
            self.status,
            self.files_removed,
            self.files_copied,
            self.directories_created,
            self.error_count()
        )
    }

    fn __str__(&self) -> String {
        self.format("[SYNC]")
    }
}

#[pyclass(name = "VersionInfo")]
#[derive(Debug, Clone)]
struct PyVersionInfo {
    #[pyo3(get)]
    package_name: String,
    #[pyo3(get)]
    version: Option<String>,
}

#[pymethods]
impl PyVersionInfo {
    #[new]
    #[pyo3(signature = (package_name, version = None))]
    fn new(package_name: String, version: Option<String>) -> Self {
        Self {
            package_name,
            version,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "VersionInfo(package_name={:?}, version={:?})",
            self.package_name, self.version
        )
    }
}

impl From<VersionEntry> for PyVersionInfo {
    fn from(entry: VersionEntry) -> Self {
        Self {
            package_name: entry.package_name,
            version: entry.version,
        }
    }
}

impl From<PyVersionInfo> for VersionEntry {
    fn from(info: PyVersionInfo) -> Self {
        Self {
            package_name: info.package_name,
            version: info.version,
        }
    }
}

#[pyclass(name = "NestedVersionInfo")]
#[derive(Debug, Clone)]
struct PyNestedVersionInfo {
    #[pyo3(get)]
    package_name: String,
    #[pyo3(get)]
    version: Option<String>,
    #[pyo3(get)]
    depth: usize,
    #[pyo3(get)]
    parent_package: Option<String>,
    #[pyo3(get)]
    children: Vec<PyNestedVersionInfo>,
}

#[pymethods]
impl PyNestedVersionInfo {
    #[new]
    #[pyo3(signature = (
        package_name,
        version = None,
        depth = 0,
        parent_package = None,
        children = None,
    ))]
    fn new(
        package_name: String,
        version: Option<String>,
        depth: usize,
        parent_package: Option<String>,
        children: Option<Vec<PyNestedVersionInfo>>,
    ) -> Self {
        Self {
            package_name,
            version,
            depth,
            parent_package,
            children: children.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "NestedVersionInfo(package_name={:?}, version={:?}, depth={}, children={})",
            self.package_name,
            self.version,
            self.depth,
            self.children.len()
        )
    }
}

impl From<NestedVersionEntry> for PyNestedVersionInfo {
    fn from(entry: NestedVersionEntry) -> Self {
        Self {
            package_name: entry.package_name,
            version: entry.version,
            depth: entry.depth,
            parent_package: entry.parent_package,
            children: entry.children.into_iter().map(Self::from).collect(),
        }
    }
}

impl From<PyNestedVersionInfo> for NestedVersionEntry {
    fn from(info: PyNestedVersionInfo) -> Self {
        Self {
            package_name: info.package_name,
            version: info.version,
            depth: info.depth,
            parent_package: info.parent_package,
            children: info.children.into_iter().map(Self::from).collect(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ArgumentParsing

fn map_sync_vendor_error(exception: SyncVendorError) -> PyErr {
    let message = exception.to_string();
    match exception {
        SyncVendorError::TypeMismatch { .. } => PyTypeError::new_err(message),
        SyncVendorError::InvalidValue { .. } => PyValueError::new_err(message),
        SyncVendorError::Os { .. } => PyOSError::new_err(message),
        SyncVendorError::SyncFailed { .. } => PyRuntimeError::new_err(message),
    }
}

fn derive_type_name(value: &Bound<'_, PyAny>) -> String {
    value
        .get_type()
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "object".to_string())
}

/// `str` or `os.PathLike` resolving to `str`.
fn parse_path_arg(value: &Bound<'_, PyAny>, arg_name: &str) -> PyResult<PathBuf> {
    value.extract::<PathBuf>().map_err(|_| {
        map_sync_vendor_error(SyncVendorError::type_mismatch(
            arg_name,
            "str or Path",
            &derive_type_name(value),
        ))
    })
}

fn parse_str_arg(
    value: Option<&Bound<'_, PyAny>>,
    arg_name: &str,
    default: &str,
) -> PyResult<String> {
    let Some(value) = value.filter(|v| !v.is_none()) else {
        return Ok(default.to_string());
    };
    if !value.is_instance_of::<PyString>() {
        return Err(map_sync_vendor_error(SyncVendorError::type_mismatch(
            arg_name,
            "str",
            &derive_type_name(value),
        )));
    }
    value.extract::<String>()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PyFunctions

#[pyfunction(name = "sync_vendor")]
#[pyo3(signature = (source_path, target_path, package, vendor = None, extensions = None))]
fn sync_vendor_py(
    py: Python<'_>,
    source_path: &Bound<'_, PyAny>,
    target_path: &Bound<'_, PyAny>,
    package: &Bound<'_, PyAny>,
    vendor: Option<&Bound<'_, PyAny>>,
    extensions: Option<&Bound<'_, PyAny>>,
) -> PyResult<PySyncResult> {
    let path_src = parse_path_arg(source_path, "source_path")?;
    let path_dst = parse_path_arg(target_path, "target_path")?;
    let package = parse_str_arg(Some(package), "package", "")?;
    let spec_sync_options = SpecSyncOptions {
        vendor_dir: parse_str_arg(vendor, "vendor", C_VENDOR_DIR_DEFAULT)?,
        extensions: parse_str_arg(extensions, "extensions", C_EXTENSIONS_DEFAULT)?,
        ..SpecSyncOptions::default()
    };

    let report_sync = py.allow_threads(|| {
        sync_vendor_with_options(&path_src, &path_dst, &package, &spec_sync_options)
    });
    let report_sync = report_sync.map_err(map_sync_vendor_error)?;
    Ok(PySyncResult::from(report_sync))
}

#[pyfunction(name = "extract_version_from_file")]
#[pyo3(signature = (file_path, version_tag = C_VERSION_TAG_DEFAULT))]
fn extract_version_from_file_py(
    py: Python<'_>,
    file_path: &Bound<'_, PyAny>,
    version_tag: &str,
) -> PyResult<Option<String>> {
    let path_file = parse_path_arg(file_path, "file_path")?;
    Ok(py.allow_threads(|| extract_version_from_file(&path_file, version_tag)))
}

#[pyfunction(name = "scan_vendor_packages")]
#[pyo3(signature = (
    target_path,
    vendor_dir = C_VENDOR_DIR_DEFAULT,
    version_tag = C_VERSION_TAG_DEFAULT,
))]
fn scan_vendor_packages_py(
    py: Python<'_>,
    target_path: &Bound<'_, PyAny>,
    vendor_dir: &str,
    version_tag: &str,
) -> PyResult<Vec<PyVersionInfo>> {
    let path_dst = parse_path_arg(target_path, "target_path")?;
    let l_entries = py
        .allow_threads(|| scan_vendor_packages(&path_dst, vendor_dir, version_tag))
        .map_err(map_sync_vendor_error)?;
    Ok(l_entries.into_iter().map(PyVersionInfo::from).collect())
}

#[pyfunction(name = "scan_vendor_packages_nested")]
#[pyo3(signature = (
    target_path,
    vendor_dir = C_VENDOR_DIR_DEFAULT,
    version_tag = C_VERSION_TAG_DEFAULT,
    depth = 0,
    parent_package = None
))]
fn scan_vendor_packages_nested_py(
    py: Python<'_>,
    target_path: &Bound<'_, PyAny>,
    vendor_dir: &str,
    version_tag: &str,
    depth: usize,
    parent_package: Option<String>,
) -> PyResult<Vec<PyNestedVersionInfo>> {
    let path_dst = parse_path_arg(target_path, "target_path")?;
    let l_entries = py
        .allow_threads(|| {
            scan_vendor_packages_nested(
                &path_dst,
                vendor_dir,
                version_tag,
                depth,
                parent_package.as_deref(),
            )
        })
        .map_err(map_sync_vendor_error)?;
    Ok(l_entries.into_iter().map(PyNestedVersionInfo::from).collect())
}

#[pyfunction(name = "format_version_output")]
fn format_version_output_py(entries: Vec<PyVersionInfo>) -> String {
    let l_entries = entries.into_iter().map(VersionEntry::from).collect::<Vec<_>>();
    format_version_output(&l_entries)
}

#[pyfunction(name = "format_nested_version_output")]
fn format_nested_version_output_py(entries: Vec<PyNestedVersionInfo>) -> String {
    let l_entries = entries
        .into_iter()
        .map(NestedVersionEntry::from)
        .collect::<Vec<_>>();
    format_nested_version_output(&l_entries)
}

/// Route core log events to stderr. Returns `False` if logging was already set up.
#[pyfunction(name = "init_logging")]
#[pyo3(signature = (verbose = false))]
fn init_logging_py(verbose: bool) -> bool {
    vendor_sync_log::init_logging(verbose)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[pymodule]
fn _vendor_sync_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySyncResult>()?;
    module.add_class::<PyVersionInfo>()?;
    module.add_class::<PyNestedVersionInfo>()?;
    module.add_function(wrap_pyfunction!(sync_vendor_py, module)?)?;
    module.add_function(wrap_pyfunction!(extract_version_from_file_py, module)?)?;
    module.add_function(wrap_pyfunction!(scan_vendor_packages_py, module)?)?;
    module.add_function(wrap_pyfunction!(scan_vendor_packages_nested_py, module)?)?;
    module.add_function(wrap_pyfunction!(format_version_output_py, module)?)?;
    module.add_function(wrap_pyfunction!(format_nested_version_output_py, module)?)?;
    module.add_function(wrap_pyfunction!(init_logging_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
