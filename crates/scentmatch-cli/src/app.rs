//! ScentCli application.
//!
//! Owns the loaded configuration, sets up logging, and dispatches parsed
//! commands to their handlers.

use crate::cli::{CliArgs, Command};
use crate::config::ScentConfig;
use crate::{config_handlers, handlers};
use scentmatch_core::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// ScentCli
// ============================================================================

/// The `scentmatch` command-line application.
pub struct ScentCli {
    name: String,
    config: Arc<ScentConfig>,
    version: String,
}

impl ScentCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = ScentConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    /// Create with an already-loaded config.
    pub fn new(name: impl Into<String>, config: ScentConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ScentConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    /// Library crates log through `log`; the subscriber picks those records up.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        tracing::debug!(project = %self.config.project_name, "dispatching command");

        let config = &*self.config;
        match args.command {
            Some(Command::Build { force, check }) => {
                handlers::handle_build(config, force, check).await
            }
            Some(Command::Similar { item_id, query }) => {
                handlers::handle_similar(config, item_id, &query).await
            }
            Some(Command::Quiz { preferences, query }) => {
                handlers::handle_quiz(config, &preferences.join(" "), &query).await
            }
            Some(Command::Add { item_id }) => handlers::handle_add(config, item_id).await,
            Some(Command::Stats) => handlers::handle_stats(config).await,
            Some(Command::Validate) => handlers::handle_validate(config).await,
            Some(Command::List { limit }) => handlers::handle_list(config, limit).await,
            Some(Command::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
