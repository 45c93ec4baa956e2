//! Core library entry for the `buildlist` CLI.
//!
//! Lists stored build artifacts newest first, labels them for developers
//! (short revisions) or QA (sprint numbers with operator overrides), flags
//! the latest build and renders a page of expiring download links.

pub mod adapters;
pub mod build;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod listing;
pub mod ports;
pub mod render;
pub mod sprint;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    init_tracing(&cli.log_level);
    commands::dispatch(&cli).map_err(|err| err.to_string())
}

/// Installs a stderr subscriber; later calls in the same process are no-ops.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
