//! askprobe CLI library
//!
//! Argument parsing, logging setup, progress output and the `run`, `list`
//! and `check` subcommands. `main.rs` only dispatches.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    CategoryArg, CheckArgs, Cli, ColorArg, Commands, ListArgs, LogFormat, RunArgs, SelectArgs,
    SourceArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{default_directive, init as init_logging};
pub use output::{summary_line, ProgressReporter};
