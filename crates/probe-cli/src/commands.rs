//! CLI command definitions using clap

use booker_probe::Suite;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// booker-probe: end-to-end probes for the booking API and the demo page
#[derive(Parser, Debug)]
#[command(name = "booker-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios
    Run(RunArgs),

    /// List scenarios
    List(ListArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Which scenarios to consider
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SuiteArg {
    /// Booking API scenarios
    Api,
    /// Demo page scenarios
    Ui,
    /// Both
    #[default]
    All,
}

impl SuiteArg {
    /// The library suite, `None` for both
    #[must_use]
    pub const fn suite(self) -> Option<Suite> {
        match self {
            Self::Api => Some(Suite::Api),
            Self::Ui => Some(Suite::Ui),
            Self::All => None,
        }
    }
}

/// Endpoint overrides shared by `run` and `config`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct TargetArgs {
    /// Booking API base URL
    #[arg(long, env = "BOOKER_BASE_URL")]
    pub base_url: Option<String>,

    /// Demo page URL
    #[arg(long, env = "APP_URL")]
    pub app_url: Option<String>,

    /// HTTP and element wait timeout in milliseconds
    #[arg(long = "request-timeout", env = "PROBE_TIMEOUT_MS")]
    pub request_timeout: Option<u64>,

    /// Directory for attachments and reports
    #[arg(short, long, env = "PROBE_OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// axe-core script injected when the page has none
    #[arg(long, env = "AXE_SOURCE_PATH")]
    pub axe_source: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Suite to run
    #[arg(long, value_enum, default_value = "all")]
    pub suite: SuiteArg,

    /// Only scenarios carrying this tag (repeatable; `@` optional)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Only scenarios whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Number of scenario groups run at once
    #[arg(short = 'j', long, default_value = "4")]
    pub jobs: usize,

    /// Per-scenario timeout in milliseconds
    #[arg(long, default_value = "30000")]
    pub timeout: u64,

    /// Stop starting scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Launch Chromium without its sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium: Option<String>,

    /// Endpoint overrides
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Suite to list
    #[arg(long, value_enum, default_value = "all")]
    pub suite: SuiteArg,

    /// Only scenarios carrying this tag
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,

    /// Endpoint overrides
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}
