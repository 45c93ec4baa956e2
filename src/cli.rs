//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigOverrides, ViewMode};
use crate::sprint::ShiftPolicy;

/// Top-level CLI parser for `buildlist`.
#[derive(Debug, Parser)]
#[command(name = "buildlist", version, about = "Render build listings with sprint labels and download links")]
pub struct Cli {
    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Settings that override their environment variables.
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Command-line counterparts of the environment settings.
#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// Storage location: a directory, an http(s) manifest URL, or snapshot:<file> [env: BUILDS_STORAGE]
    #[arg(long, global = true)]
    pub storage: Option<String>,

    /// Audience of the page [env: BUILDS_MODE]
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ViewMode>,

    /// Sprint overrides as index:label,index:label [env: SPRINT_OVERRIDES]
    #[arg(long, global = true)]
    pub overrides: Option<String>,

    /// Base added to every sprint index [env: SPRINT_OFFSET]
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub offset: Option<i64>,

    /// Numbering above overridden sprints [env: SPRINT_SHIFT]
    #[arg(long, global = true, value_enum)]
    pub shift: Option<ShiftPolicy>,
}

impl From<&SettingsArgs> for ConfigOverrides {
    fn from(args: &SettingsArgs) -> Self {
        Self {
            storage: args.storage.clone(),
            mode: args.mode,
            overrides: args.overrides.clone(),
            offset: args.offset,
            shift: args.shift,
        }
    }
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the HTML listing page.
    Render {
        /// Write the page here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the listing as a text table.
    List,
    /// Capture the configured store's listing into a YAML snapshot.
    Snapshot {
        /// Snapshot file to write.
        #[arg(short, long)]
        output: PathBuf,
    },
}
