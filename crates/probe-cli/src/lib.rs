//! Booker Probe CLI Library
//!
//! Command-line front end for the booker-probe scenario suites: argument
//! parsing, configuration layering, progress output and the subcommand
//! handlers behind the `booker-probe` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ListArgs, RunArgs, SuiteArg, TargetArgs,
};
pub use config::{apply_target, resolve_probe_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
