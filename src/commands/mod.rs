//! Command dispatch and handlers.

pub mod list;
pub mod render;
pub mod snapshot;

use crate::cli::{Cli, Command};
use crate::config::{Config, ConfigOverrides};
use crate::context::ServiceContext;
use crate::error::BuildListError;

/// Dispatch a parsed command to its handler.
///
/// Configuration is loaded once from the environment and the command
/// line, live adapters are wired for it, and the command runs to
/// completion on a single-threaded runtime.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub fn dispatch(cli: &Cli) -> Result<(), BuildListError> {
    let config = Config::from_env(&ConfigOverrides::from(&cli.settings))?;
    let ctx = ServiceContext::from_config(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(BuildListError::Runtime)?;
    runtime.block_on(dispatch_with_context(&cli.command, &ctx, &config))
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error if the selected command handler fails.
pub async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &Config,
) -> Result<(), BuildListError> {
    match command {
        Command::Render { output } => render::run(ctx, config, output.as_deref()).await,
        Command::List => list::run(ctx, config).await,
        Command::Snapshot { output } => snapshot::run(ctx, config, output).await,
    }
}
