//! booker-probe: run the booking API and demo page scenarios
//!
//! ## Usage
//!
//! ```bash
//! booker-probe run                      # Run every scenario
//! booker-probe run --suite api -t smoke # API scenarios tagged @smoke
//! booker-probe run --grep PUT --json    # JSON report on stdout
//! booker-probe list --suite ui          # Show the UI catalogue
//! booker-probe config                   # Resolved settings
//! ```
//!
//! Exit status: 0 when every selected scenario passed, 1 when any failed,
//! 2 when the run could not start.

use booker_probe_cli::{
    handlers::{execute_config, execute_list, execute_run},
    Cli, CliConfig, CliResult, Commands, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Commands::Run(args) => execute_run(&config, &args),
        Commands::List(args) => execute_list(&args).map(|()| true),
        Commands::Config(args) => execute_config(&args).map(|()| true),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}
