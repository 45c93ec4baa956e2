//! `buildlist list` command.

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::BuildListError;
use crate::listing;
use crate::render::table;

/// Execute the `list` command.
///
/// Prints the same rows as the HTML page as a terminal table.
///
/// # Errors
///
/// Returns an error if enumeration or signing fails.
pub async fn run(ctx: &ServiceContext, config: &Config) -> Result<(), BuildListError> {
    let listing = listing::assemble(ctx, config).await?;
    print!("{}", table::render_table(&listing));
    Ok(())
}
