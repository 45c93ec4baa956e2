//! `buildlist render` command.

use std::path::Path;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::BuildListError;
use crate::listing;
use crate::render::html;

/// Execute the `render` command.
///
/// Writes the HTML page to `output`, or to stdout when no path is given.
/// Nothing is written if the listing cannot be assembled.
///
/// # Errors
///
/// Returns an error if enumeration, signing or writing the page fails.
pub async fn run(
    ctx: &ServiceContext,
    config: &Config,
    output: Option<&Path>,
) -> Result<(), BuildListError> {
    let page = render_to_string(ctx, config).await?;
    match output {
        Some(path) => {
            std::fs::write(path, &page)
                .map_err(|source| BuildListError::Output { path: path.to_path_buf(), source })?;
            tracing::info!(path = %path.display(), "wrote listing page");
        }
        None => print!("{page}"),
    }
    Ok(())
}

/// Assembles and renders the page without writing it anywhere.
///
/// # Errors
///
/// Returns an error if enumeration or signing fails.
pub async fn render_to_string(ctx: &ServiceContext, config: &Config) -> Result<String, BuildListError> {
    let listing = listing::assemble(ctx, config).await?;
    Ok(html::render_page(&listing, &config.title))
}
