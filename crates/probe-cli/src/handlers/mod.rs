//! Command handlers
//!
//! Each handler module holds the execution logic for one subcommand plus
//! the pure helpers it is built from.

pub mod config;
pub mod list;
pub mod run;

pub use config::{execute_config, render_config, render_config_json};
pub use list::{execute_list, render_list};
pub use run::{execute_run, resolve_suite, run_options, BROWSER_AVAILABLE};
