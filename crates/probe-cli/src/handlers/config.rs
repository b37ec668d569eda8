//! Config command handler

use crate::commands::ConfigArgs;
use crate::config::resolve_probe_config;
use crate::error::{CliError, CliResult};
use booker_probe::{Credentials, ProbeConfig, ProbeError};
use serde_json::json;

const REDACTED: &str = "<redacted>";

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let config = resolve_probe_config(&args.target)?;
    let credentials = Credentials::from_env();
    if args.json {
        let rendered = serde_json::to_string_pretty(&render_config_json(&config, &credentials))
            .map_err(|e| CliError::config(e.to_string()))?;
        println!("{rendered}");
    } else {
        print!("{}", render_config(&config, &credentials));
    }
    Ok(())
}

fn credentials_line(credentials: &Result<Credentials, ProbeError>) -> String {
    match credentials {
        Ok(c) => format!("{} / {REDACTED}", c.username),
        Err(e) => format!("unavailable ({e})"),
    }
}

/// Human-readable configuration; the password is never printed.
#[must_use]
pub fn render_config(config: &ProbeConfig, credentials: &Result<Credentials, ProbeError>) -> String {
    let axe = config
        .axe_source
        .as_ref()
        .map_or_else(|| "page-provided".to_string(), |p| p.display().to_string());
    format!(
        "Current configuration:\n  \
         Booking API:  {}\n  \
         Demo page:    {}\n  \
         Timeout:      {} ms\n  \
         Log level:    {}\n  \
         Output dir:   {}\n  \
         axe-core:     {}\n  \
         Credentials:  {}\n",
        config.api_base_url,
        config.app_url,
        config.timeout_ms,
        config.log_level,
        config.output_dir.display(),
        axe,
        credentials_line(credentials),
    )
}

/// JSON form of the configuration with the password redacted
#[must_use]
pub fn render_config_json(
    config: &ProbeConfig,
    credentials: &Result<Credentials, ProbeError>,
) -> serde_json::Value {
    let credentials = match credentials {
        Ok(c) => json!({ "username": c.username, "password": REDACTED }),
        Err(e) => json!({ "error": e.to_string() }),
    };
    json!({ "config": config, "credentials": credentials })
}
