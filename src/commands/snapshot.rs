//! `buildlist snapshot` command.

use std::path::Path;

use crate::adapters::snapshot::Snapshot;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::BuildListError;

/// Execute the `snapshot` command.
///
/// Captures every build of the configured store, with annotations, into a
/// YAML file that can later be used as `BUILDS_STORAGE`.
///
/// # Errors
///
/// Returns an error if the store cannot be enumerated or the file cannot be written.
pub async fn run(ctx: &ServiceContext, config: &Config, output: &Path) -> Result<(), BuildListError> {
    let snapshot = Snapshot::capture(
        ctx.store.as_ref(),
        ctx.annotations.as_ref(),
        config.storage.to_string(),
        ctx.clock.now(),
    )
    .await?;
    snapshot.write(output)?;
    eprintln!("Snapshot of {} build(s) saved to: {}", snapshot.entries.len(), output.display());
    Ok(())
}
