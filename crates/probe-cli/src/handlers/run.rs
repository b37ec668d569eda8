//! Run command handler

use crate::commands::{RunArgs, SuiteArg};
use crate::config::{resolve_probe_config, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use booker_probe::runner::select;
use booker_probe::{
    catalogue, init_tracing, LogFormat, ProbeConfig, RunOptions, Suite, SuiteReport, SuiteRunner,
};
use std::path::Path;
use std::time::Duration;

/// Whether this build can drive a real browser
pub const BROWSER_AVAILABLE: bool = cfg!(feature = "browser");

/// File name of the JSON report inside the output directory
pub const JSON_REPORT: &str = "report.json";

/// File name of the JUnit report inside the output directory
pub const JUNIT_REPORT: &str = "junit.xml";

/// Execute the run command.
///
/// Returns whether every selected scenario passed.
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<bool> {
    let probe_config = resolve_probe_config(&args.target)?;
    let level = config
        .verbosity
        .log_level()
        .unwrap_or(probe_config.log_level.as_str());
    init_tracing(level, LogFormat::Pretty);

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let suite = resolve_suite(args.suite, BROWSER_AVAILABLE)?;
    if args.suite == SuiteArg::All && !BROWSER_AVAILABLE {
        reporter.warning("built without the browser feature; running the api suite only");
    }
    let options = run_options(args, suite)?;

    let total = select(catalogue(), &options).len();
    if total == 0 {
        reporter.warning("no scenarios match the given filters");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    reporter.header("booker-probe");
    reporter.start_progress(total as u64, "Running scenarios");
    let report = runtime.block_on(run_report(probe_config.clone(), &options, args, &reporter))?;
    reporter.finish();

    write_reports(&report, &probe_config.output_dir)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::report_generation(e.to_string()))?;
        println!("{json}");
    }
    reporter.summary(
        report.passed,
        report.failed,
        report.skipped,
        Duration::from_millis(report.duration_ms),
    );
    reporter.info(&format!(
        "reports written to {}",
        probe_config.output_dir.display()
    ));

    Ok(report.all_passed())
}

/// The suite to run, given whether a browser is available.
///
/// Without a browser `ui` is rejected and `all` narrows to `api`.
pub fn resolve_suite(requested: SuiteArg, browser_available: bool) -> CliResult<Option<Suite>> {
    if browser_available {
        return Ok(requested.suite());
    }
    match requested {
        SuiteArg::Ui => Err(CliError::invalid_argument(
            "the ui suite needs a browser; rebuild with --features browser",
        )),
        SuiteArg::Api | SuiteArg::All => Ok(Some(Suite::Api)),
    }
}

/// Build run options from the command line.
pub fn run_options(args: &RunArgs, suite: Option<Suite>) -> CliResult<RunOptions> {
    if args.jobs == 0 {
        return Err(CliError::invalid_argument("--jobs must be at least 1"));
    }
    if args.timeout == 0 {
        return Err(CliError::invalid_argument("--timeout must be positive"));
    }

    let mut options = RunOptions::default()
        .with_workers(args.jobs)
        .with_timeout(Duration::from_millis(args.timeout));
    options.suite = suite;
    for tag in &args.tags {
        options = options.with_tag(tag.clone());
    }
    if let Some(pattern) = &args.grep {
        options = options.with_grep(pattern.clone());
    }
    if args.fail_fast {
        options = options.fail_fast();
    }
    Ok(options)
}

fn write_reports(report: &SuiteReport, output_dir: &Path) -> CliResult<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        CliError::report_generation(format!("cannot create {}: {e}", output_dir.display()))
    })?;
    report
        .write_json(&output_dir.join(JSON_REPORT))
        .map_err(|e| CliError::report_generation(e.to_string()))?;
    report
        .write_junit(&output_dir.join(JUNIT_REPORT))
        .map_err(|e| CliError::report_generation(e.to_string()))?;
    Ok(())
}

#[cfg_attr(not(feature = "browser"), allow(unused_variables))]
async fn run_report(
    probe_config: ProbeConfig,
    options: &RunOptions,
    args: &RunArgs,
    reporter: &ProgressReporter,
) -> CliResult<SuiteReport> {
    let runner = SuiteRunner::new(probe_config)?;

    #[cfg(feature = "browser")]
    {
        let needs_pages = select(catalogue(), options)
            .iter()
            .any(|scenario| scenario.suite == Suite::Ui);
        if needs_pages {
            return run_with_browser(runner, options, args, reporter).await;
        }
    }

    Ok(runner
        .run_with(catalogue(), options, |result| reporter.scenario(result))
        .await)
}

#[cfg(feature = "browser")]
async fn run_with_browser(
    runner: SuiteRunner,
    options: &RunOptions,
    args: &RunArgs,
    reporter: &ProgressReporter,
) -> CliResult<SuiteReport> {
    use booker_probe::{BrowserConfig, ChromiumBrowser};
    use std::sync::Arc;

    let mut browser_config = BrowserConfig::default()
        .with_headless(!args.headed)
        .with_timeout(runner.config().timeout());
    if args.no_sandbox {
        browser_config = browser_config.with_no_sandbox();
    }
    if let Some(path) = &args.chromium {
        browser_config = browser_config.with_chromium_path(path.clone());
    }

    let browser = Arc::new(ChromiumBrowser::launch(browser_config).await?);
    let runner = runner.with_pages(Arc::clone(&browser) as Arc<dyn booker_probe::PageFactory>);
    let report = runner
        .run_with(catalogue(), options, |result| reporter.scenario(result))
        .await;
    drop(runner);

    match Arc::try_unwrap(browser) {
        Ok(browser) => {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "browser did not close cleanly");
            }
        }
        Err(_) => tracing::warn!("browser still referenced after the run; leaving it to drop"),
    }
    Ok(report)
}
