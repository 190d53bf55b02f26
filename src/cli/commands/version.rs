//! Version information display
//!
//! Prints version and build metadata in human or JSON format.

use crate::cli::args::{OutputFormat, VersionArgs};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Print version and build information.
pub fn run(args: &VersionArgs) {
    let name = built_info::PKG_NAME;
    let version = built_info::PKG_VERSION;
    let commit = built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version} ({commit})");
            println!("built {} for {}", built_info::BUILT_TIME_UTC, built_info::TARGET);
            println!("{}", built_info::RUSTC_VERSION);
        }
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": name,
                "version": version,
                "commit": commit,
                "built": built_info::BUILT_TIME_UTC,
                "target": built_info::TARGET,
                "rustc": built_info::RUSTC_VERSION,
            });
            println!("{info}");
        }
    }
}
