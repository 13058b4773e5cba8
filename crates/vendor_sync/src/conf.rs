//! Vendor sync constants and default values.

/// Default vendor directory name under a target project.
pub const C_VENDOR_DIR_DEFAULT: &str = "_vendor";
/// Default extension list for `sync_vendor`.
pub const C_EXTENSIONS_DEFAULT: &str = "py;json;yml;yaml;ini";
/// Separator between extension tokens.
pub const C_EXTENSION_DELIMITER: char = ';';
/// Default identifier scanned for a package version.
pub const C_VERSION_TAG_DEFAULT: &str = "__version__";
/// Bytecode cache directory never copied into a vendor tree.
pub const C_CACHE_DIR_NAME: &str = "__pycache__";
/// Package entry file checked first for a version tag.
pub const C_ENTRY_FILE_INIT: &str = "__init__.py";
/// Fallback entry file checked when `__init__.py` yields nothing.
pub const C_ENTRY_FILE_MAIN: &str = "__main__.py";
/// Token rendered for a package without a version.
pub const C_VERSION_MISSING: &str = "?";
/// Indentation unit per nesting level in nested version output.
pub const C_NESTED_INDENT: &str = "  ";

/// Extensions copied through the UTF-8 text path instead of a byte copy.
pub const TUP_TEXT_EXTENSIONS: [&str; 7] = ["py", "json", "yml", "yaml", "ini", "md", "txt"];
