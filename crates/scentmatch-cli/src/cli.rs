//! CLI argument parsing and command definitions.
//!
//! Provides the `scentmatch` command structure: global configuration and
//! verbosity flags, the query commands (similar, quiz), maintenance
//! commands (build, add, validate), inspection (stats, list), and config
//! management.

use clap::{Args, Parser, Subcommand, ValueEnum};
use scentmatch_core::{Gender, ItemId};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "scentmatch", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "SCENTMATCH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the index and mapping from the item catalog.
    Build {
        /// Rebuild even if the index is fresh.
        #[arg(short, long)]
        force: bool,

        /// Check index freshness without rebuilding.
        #[arg(long)]
        check: bool,
    },

    /// Recommend items similar to a known item.
    Similar {
        /// Id of the source item.
        item_id: ItemId,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Recommend items matching a description of preferences.
    Quiz {
        /// Free-form preferences, e.g. "fresh citrus with a woody base".
        #[arg(required = true, num_args = 1..)]
        preferences: Vec<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Append one catalog item to the existing index.
    Add {
        /// Id of the catalog item to index.
        item_id: ItemId,
    },

    /// Show index statistics.
    Stats,

    /// Check index, mapping, and catalog consistency.
    Validate,

    /// List catalog items.
    List {
        /// Maximum number of items to show.
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Options shared by the query commands.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Number of results (defaults to `recommend.top_k`).
    #[arg(short = 'k', long = "top-k")]
    pub top_k: Option<usize>,

    /// Only return items of this gender.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = GenderFilter::All)]
    pub gender: GenderFilter,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Gender filter as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderFilter {
    /// Male items only.
    Male,
    /// Female items only.
    Female,
    /// Unisex items only.
    Unisex,
    /// No filter.
    All,
}

impl GenderFilter {
    /// The category to filter on, if any.
    pub fn as_gender(self) -> Option<Gender> {
        match self {
            Self::Male => Some(Gender::Male),
            Self::Female => Some(Gender::Female),
            Self::Unisex => Some(Gender::Unisex),
            Self::All => None,
        }
    }
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "embedding.model").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "recommend.top_k").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
