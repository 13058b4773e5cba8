mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use vendor_sync::{
    SpecScanOptions, SpecSyncOptions, SyncVendorError, format_error,
    format_nested_version_output, format_sync_report, format_version_output,
    scan_vendor_packages_nested_with_options, scan_vendor_packages_with_options,
    sync_vendor_with_options,
};

use crate::cli::Cli;

const N_EXIT_RUNTIME_ERROR: u8 = 1;
const N_EXIT_VALIDATION_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    vendor_sync_log::init_logging(cli.verbose);

    let result = if cli.scan_versions {
        run_scan(&cli)
    } else {
        run_sync(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_error(&e));
            debug!("Exiting after error: {e:?}");
            if e.is_validation() {
                ExitCode::from(N_EXIT_VALIDATION_ERROR)
            } else {
                ExitCode::from(N_EXIT_RUNTIME_ERROR)
            }
        }
    }
}

fn run_sync(cli: &Cli) -> Result<(), SyncVendorError> {
    let (Some(source_path), Some(package)) = (cli.source_path.as_ref(), cli.package.as_deref())
    else {
        return Err(SyncVendorError::invalid_value(
            vendor_sync::EnumErrorCode::InvalidValue,
            "--source-path and --package are required to sync",
        ));
    };

    let spec_sync_options = SpecSyncOptions {
        vendor_dir: cli.vendor.clone(),
        extensions: cli.extensions.clone(),
        ..SpecSyncOptions::default()
    };
    let report =
        sync_vendor_with_options(source_path, &cli.target_path, package, &spec_sync_options)?;
    println!("{}", format_sync_report(&report));
    Ok(())
}

fn run_scan(cli: &Cli) -> Result<(), SyncVendorError> {
    let spec_scan_options = SpecScanOptions {
        vendor_dir: cli.vendor.clone(),
        version_tag: cli.version_tag.clone(),
    };
    let c_output = if cli.nested {
        let entries =
            scan_vendor_packages_nested_with_options(&cli.target_path, &spec_scan_options)?;
        format_nested_version_output(&entries)
    } else {
        let entries = scan_vendor_packages_with_options(&cli.target_path, &spec_scan_options)?;
        format_version_output(&entries)
    };
    if !c_output.is_empty() {
        println!("{c_output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::Cli;

    #[test]
    fn sync_flags_use_defaults() {
        let cli = Cli::parse_from([
            "vendor-sync",
            "--source-path",
            "src",
            "--target-path",
            "dst",
            "--package",
            "mylib",
        ]);
        assert_eq!(cli.vendor, "_vendor");
        assert_eq!(cli.extensions, "py;json;yml;yaml;ini");
        assert_eq!(cli.version_tag, "__version__");
        assert!(!cli.scan_versions);
        assert!(!cli.verbose);
    }

    #[test]
    fn scan_mode_needs_only_target() {
        let cli = Cli::parse_from([
            "vendor-sync",
            "--target-path",
            "dst",
            "--scan-versions",
            "--nested",
            "-v",
        ]);
        assert!(cli.scan_versions);
        assert!(cli.nested);
        assert!(cli.verbose);
        assert!(cli.source_path.is_none());
    }

    #[test]
    fn sync_mode_requires_package() {
        let err = Cli::try_parse_from(["vendor-sync", "--source-path", "s", "--target-path", "t"])
            .expect_err("missing package");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn short_extension_flag() {
        let cli = Cli::parse_from([
            "vendor-sync",
            "--source-path",
            "s",
            "--target-path",
            "t",
            "--package",
            "p",
            "-e",
            "py;md",
        ]);
        assert_eq!(cli.extensions, "py;md");
    }
}
