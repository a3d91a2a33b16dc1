//! Command-line surface.
//!
//! The daemon takes no positional arguments: `--version` and `--help` print
//! and exit 0, anything unrecognized prints usage and exits non-zero, and
//! `--config` points at an alternate configuration file.

use clap::Parser;
use std::path::PathBuf;

/// Version string embedded by `build.rs` (git describe, falling back to the
/// package version).
pub const VERSION: &str = env!("UAMASK_VERSION");

const LONG_VERSION: &str = concat!(
    env!("UAMASK_VERSION"),
    "\ncommit: ",
    env!("UAMASK_GIT_COMMIT"),
);

#[derive(Parser, Debug)]
#[command(
    name = "uamask",
    version = VERSION,
    long_version = LONG_VERSION,
    about = "Rewrites outbound HTTP User-Agent headers at the router"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
