//! Command-line front end for ScentMatch.
//!
//! Wires configuration, logging, and the `scentmatch` subcommands to the
//! recommendation engine.
//!
//! # Modules
//!
//! - [`cli`]: clap argument and subcommand definitions
//! - [`config`]: `ScentConfig`, loaded with confyg
//! - [`app`]: `ScentCli`, logging setup and command dispatch
//! - [`handlers`]: build, query, add, and inspection commands
//! - [`config_handlers`]: `scentmatch config ...`

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod handlers;

pub use app::ScentCli;
pub use cli::{CliArgs, Command, ConfigAction, GenderFilter, QueryArgs};
pub use config::ScentConfig;
