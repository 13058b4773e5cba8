use clap::Parser;
use std::path::PathBuf;

use vendor_sync::conf::{C_EXTENSIONS_DEFAULT, C_VENDOR_DIR_DEFAULT, C_VERSION_TAG_DEFAULT};

#[derive(Parser, Debug)]
#[command(name = "vendor-sync")]
#[command(about = "Synchronize vendor packages into a project's vendor directory")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Path to the source directory containing the package to sync
    #[arg(long, value_name = "PATH", required_unless_present = "scan_versions")]
    pub source_path: Option<PathBuf>,

    /// Path to the target project directory
    #[arg(long, value_name = "PATH")]
    pub target_path: PathBuf,

    /// Name of the package subdirectory to sync (e.g. splurge_exceptions)
    #[arg(long, value_name = "PACKAGE", required_unless_present = "scan_versions")]
    pub package: Option<String>,

    /// Name of the vendor directory
    #[arg(long, value_name = "DIR", default_value = C_VENDOR_DIR_DEFAULT)]
    pub vendor: String,

    /// Semicolon-separated file extensions to include
    #[arg(short, long, value_name = "EXT", default_value = C_EXTENSIONS_DEFAULT)]
    pub extensions: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// List vendored packages and their versions instead of syncing
    #[arg(long, conflicts_with_all = ["source_path", "package"])]
    pub scan_versions: bool,

    /// Also scan vendor directories inside vendored packages
    #[arg(long, requires = "scan_versions")]
    pub nested: bool,

    /// Identifier holding the package version
    #[arg(long, value_name = "NAME", default_value = C_VERSION_TAG_DEFAULT)]
    pub version_tag: String,
}
