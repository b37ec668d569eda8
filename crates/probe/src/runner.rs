//! Suite runner.
//!
//! Selected scenarios are split into units: all members of a serial group
//! form one unit and run in catalogue order, each member of a parallel
//! group is a unit of its own. Units run concurrently on a [`JoinSet`],
//! bounded by a worker semaphore. Every scenario gets a fresh
//! [`ScenarioEnv`] (own fixtures, own page) and its own timeout.

use crate::accessibility::AxeScanner;
use crate::artifact::TestInfo;
use crate::assertion::SoftAssertions;
use crate::client::BookerClient;
use crate::config::{Credentials, ProbeConfig};
use crate::driver::PageFactory;
use crate::fixture::ApiFixtures;
use crate::reporter::{FailureMode, ScenarioResult, SuiteReport};
use crate::result::{ProbeError, ProbeResult};
use crate::scenarios::{GroupMode, Scenario, ScenarioEnv, Suite};
use crate::schema::SchemaSet;
use crate::testdata::TestData;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Default per-scenario timeout
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of concurrently running units
pub const DEFAULT_WORKERS: usize = 4;

/// Scenario selection and scheduling options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Only this suite; both when `None`
    pub suite: Option<Suite>,
    /// Scenario must carry at least one of these tags; any when empty
    pub tags: Vec<String>,
    /// Case-insensitive substring of the scenario name
    pub grep: Option<String>,
    /// Units allowed to run at once (at least 1)
    pub workers: usize,
    /// Timeout of one scenario, page creation included
    pub timeout: Duration,
    /// Whether a failure stops the run
    pub failure_mode: FailureMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            suite: None,
            tags: Vec::new(),
            grep: None,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_SCENARIO_TIMEOUT,
            failure_mode: FailureMode::CollectAll,
        }
    }
}

impl RunOptions {
    /// Restrict to one suite
    #[must_use]
    pub const fn with_suite(mut self, suite: Suite) -> Self {
        self.suite = Some(suite);
        self
    }

    /// Require a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Filter by name
    #[must_use]
    pub fn with_grep(mut self, pattern: impl Into<String>) -> Self {
        self.grep = Some(pattern.into());
        self
    }

    /// Set the worker limit
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the per-scenario timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop after the first failure
    #[must_use]
    pub const fn fail_fast(mut self) -> Self {
        self.failure_mode = FailureMode::AndonCord;
        self
    }

    /// Whether `scenario` passes the suite, tag and name filters
    #[must_use]
    pub fn selects(&self, scenario: &Scenario) -> bool {
        if self.suite.is_some_and(|suite| suite != scenario.suite) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| scenario.has_tag(tag)) {
            return false;
        }
        match &self.grep {
            Some(pattern) => scenario
                .name
                .to_lowercase()
                .contains(&pattern.to_lowercase()),
            None => true,
        }
    }
}

/// Scenarios of `catalogue` selected by `options`, in catalogue order.
#[must_use]
pub fn select(catalogue: Vec<Scenario>, options: &RunOptions) -> Vec<Scenario> {
    catalogue
        .into_iter()
        .filter(|scenario| options.selects(scenario))
        .collect()
}

/// Split scenarios into scheduling units of indices.
///
/// Units appear in order of their first member; indices inside a serial
/// unit keep catalogue order.
#[must_use]
pub fn schedule(scenarios: &[Scenario]) -> Vec<Vec<usize>> {
    let mut units: Vec<(Option<&str>, Vec<usize>)> = Vec::new();
    for (index, scenario) in scenarios.iter().enumerate() {
        if scenario.mode == GroupMode::Parallel {
            units.push((None, vec![index]));
            continue;
        }
        let group = scenario.group.as_str();
        match units.iter_mut().find(|(name, _)| *name == Some(group)) {
            Some((_, members)) => members.push(index),
            None => units.push((Some(group), vec![index])),
        }
    }
    units.into_iter().map(|(_, members)| members).collect()
}

/// Runs scenarios against one configuration
#[derive(Clone)]
pub struct SuiteRunner {
    config: Arc<ProbeConfig>,
    client: BookerClient,
    schemas: Arc<SchemaSet>,
    credentials: Result<Credentials, String>,
    test_data: TestData,
    scanner: Arc<AxeScanner>,
    pages: Option<Arc<dyn PageFactory>>,
}

impl std::fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("has_pages", &self.pages.is_some())
            .finish_non_exhaustive()
    }
}

impl SuiteRunner {
    /// Runner over `config`; credentials come from the environment.
    ///
    /// Missing credentials are not an error here: only scenarios that ask
    /// for a token fail.
    pub fn new(config: ProbeConfig) -> ProbeResult<Self> {
        let client = BookerClient::new(config.api_base_url.clone(), config.timeout())?;
        let scanner = AxeScanner::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            schemas: Arc::new(SchemaSet::bundled()?),
            credentials: Err(String::new()),
            test_data: TestData::bundled(),
            scanner: Arc::new(scanner),
            pages: None,
        }
        .with_credentials(Credentials::from_env()))
    }

    /// Use explicit credentials (or a configuration error).
    #[must_use]
    pub fn with_credentials(mut self, credentials: ProbeResult<Credentials>) -> Self {
        self.credentials = credentials.map_err(|e| match e {
            ProbeError::MissingConfig { key } => key,
            other => other.to_string(),
        });
        self
    }

    /// Use another booking client
    #[must_use]
    pub fn with_client(mut self, client: BookerClient) -> Self {
        self.client = client;
        self
    }

    /// Read literal bodies from another directory
    #[must_use]
    pub fn with_test_data(mut self, test_data: TestData) -> Self {
        self.test_data = test_data;
        self
    }

    /// Use another accessibility scanner
    #[must_use]
    pub fn with_scanner(mut self, scanner: AxeScanner) -> Self {
        self.scanner = Arc::new(scanner);
        self
    }

    /// Open UI pages from `pages`
    #[must_use]
    pub fn with_pages(mut self, pages: Arc<dyn PageFactory>) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Run configuration
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run the selected part of `catalogue`.
    pub async fn run(&self, catalogue: Vec<Scenario>, options: &RunOptions) -> SuiteReport {
        self.run_with(catalogue, options, |_| {}).await
    }

    /// Run the selected part of `catalogue`, calling `on_result` as each
    /// scenario finishes.
    pub async fn run_with<F>(
        &self,
        catalogue: Vec<Scenario>,
        options: &RunOptions,
        mut on_result: F,
    ) -> SuiteReport
    where
        F: FnMut(&ScenarioResult),
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        let scenarios = select(catalogue, options);
        let units = schedule(&scenarios);
        tracing::info!(
            scenarios = scenarios.len(),
            units = units.len(),
            workers = options.workers,
            "starting suite run"
        );

        let workers = Arc::new(Semaphore::new(options.workers.max(1)));
        let stop = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        for unit in units {
            let members: Vec<(usize, Scenario)> = unit
                .into_iter()
                .map(|index| (index, scenarios[index].clone()))
                .collect();
            let runner = self.clone();
            let workers = Arc::clone(&workers);
            let stop = Arc::clone(&stop);
            let timeout = options.timeout;
            let failure_mode = options.failure_mode;
            tasks.spawn(async move {
                let _permit = workers.acquire_owned().await.ok();
                let mut results = Vec::with_capacity(members.len());
                for (index, scenario) in members {
                    if stop.load(Ordering::SeqCst) {
                        let result = ScenarioResult::skipped(&scenario.name, scenario.suite)
                            .in_group(&scenario.group, scenario.tags.clone());
                        results.push((index, result));
                        continue;
                    }
                    let result = runner.run_scenario(&scenario, timeout).await;
                    if result.status.is_failed() && failure_mode == FailureMode::AndonCord {
                        stop.store(true, Ordering::SeqCst);
                    }
                    results.push((index, result));
                }
                results
            });
        }

        let mut slots: Vec<Option<ScenarioResult>> = vec![None; scenarios.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(results) => {
                    for (index, result) in results {
                        on_result(&result);
                        slots[index] = Some(result);
                    }
                }
                Err(e) => tracing::error!(error = %e, "scenario task aborted"),
            }
        }

        // A slot is only empty if its task panicked.
        let results = slots
            .into_iter()
            .zip(&scenarios)
            .map(|(slot, scenario)| {
                slot.unwrap_or_else(|| {
                    ScenarioResult::failed(
                        &scenario.name,
                        scenario.suite,
                        Duration::ZERO,
                        "scenario task panicked",
                    )
                    .in_group(&scenario.group, scenario.tags.clone())
                })
            })
            .collect();

        let report = SuiteReport::new(started_at, clock.elapsed(), results);
        tracing::info!(summary = %report.summary(), "suite run finished");
        report
    }

    /// Run one scenario with a fresh environment under `timeout`.
    pub async fn run_scenario(&self, scenario: &Scenario, timeout: Duration) -> ScenarioResult {
        let span = tracing::info_span!(
            "scenario",
            name = %scenario.name,
            suite = %scenario.suite,
            group = %scenario.group
        );
        let test_info = Arc::new(TestInfo::new(
            scenario.name.clone(),
            self.config.output_dir.clone(),
        ));
        let soft = SoftAssertions::new();
        let clock = Instant::now();

        let body = async {
            let env = self
                .environment(scenario, Arc::clone(&test_info), soft.clone())
                .await?;
            scenario.run(env).await
        };
        let outcome = match tokio::time::timeout(timeout, body.instrument(span.clone())).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout {
                ms: timeout.as_millis() as u64,
            }),
        };

        let elapsed = clock.elapsed();
        let result = match failure_message(outcome, &soft) {
            None => {
                span.in_scope(|| tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "passed"));
                ScenarioResult::passed(&scenario.name, scenario.suite, elapsed)
            }
            Some(message) => {
                span.in_scope(|| tracing::error!(error = %message, "failed"));
                ScenarioResult::failed(&scenario.name, scenario.suite, elapsed, message)
            }
        };
        result
            .in_group(&scenario.group, scenario.tags.clone())
            .with_attachments(test_info.attachments())
    }

    async fn environment(
        &self,
        scenario: &Scenario,
        test_info: Arc<TestInfo>,
        soft: SoftAssertions,
    ) -> ProbeResult<ScenarioEnv> {
        let page = match (scenario.suite, &self.pages) {
            (Suite::Ui, Some(pages)) => Some(pages.new_page().await?),
            _ => None,
        };
        let fixtures = ApiFixtures::new(
            self.client.clone(),
            Arc::clone(&self.schemas),
            self.credentials(),
        );
        Ok(ScenarioEnv::new(
            Arc::clone(&self.config),
            self.client.clone(),
            Arc::clone(&self.schemas),
            fixtures,
            self.test_data.clone(),
            Arc::clone(&self.scanner),
            test_info,
            soft,
            page,
        ))
    }

    fn credentials(&self) -> ProbeResult<Credentials> {
        self.credentials
            .clone()
            .map_err(|key| ProbeError::MissingConfig { key })
    }
}

/// The failure text for a finished scenario, if it failed.
///
/// Soft failures recorded before a hard error or a timeout are reported
/// after it.
fn failure_message(outcome: ProbeResult<()>, soft: &SoftAssertions) -> Option<String> {
    match (outcome, soft.verify().err()) {
        (Ok(()), None) => None,
        (Ok(()), Some(pending)) => Some(ProbeError::from(pending).to_string()),
        (Err(e @ ProbeError::SoftAssertions(_)), _) | (Err(e), None) => Some(e.to_string()),
        (Err(e), Some(pending)) => Some(format!("{e}\n{pending}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reporter::TestStatus;
    use std::sync::atomic::AtomicUsize;

    fn noop(suite: Suite, group: &str, name: &str) -> Scenario {
        Scenario::new(suite, group, name, |_env| Box::pin(async { Ok(()) }))
    }

    fn runner() -> SuiteRunner {
        let dir = std::env::temp_dir().join("booker-probe-runner-tests");
        SuiteRunner::new(ProbeConfig::default().with_output_dir(dir))
            .unwrap()
            .with_credentials(Ok(Credentials::new("admin", "password123")))
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_filters_by_suite_tag_and_name() {
            let catalogue = vec![
                noop(Suite::Api, "a", "Verify POST API Request").tagged(&["api"]),
                noop(Suite::Ui, "b", "Verify Test1").tagged(&["parallel"]),
                noop(Suite::Ui, "c", "seed").tagged(&["seed"]),
            ];
            let names = |options: &RunOptions| -> Vec<String> {
                select(catalogue.clone(), options)
                    .into_iter()
                    .map(|s| s.name)
                    .collect()
            };
            assert_eq!(names(&RunOptions::default()).len(), 3);
            assert_eq!(names(&RunOptions::default().with_suite(Suite::Api)), ["Verify POST API Request"]);
            assert_eq!(names(&RunOptions::default().with_tag("@seed")), ["seed"]);
            assert_eq!(names(&RunOptions::default().with_grep("test1")), ["Verify Test1"]);
            assert!(names(&RunOptions::default().with_suite(Suite::Api).with_tag("seed")).is_empty());
        }

        #[test]
        fn test_schedule_groups_serial_and_splits_parallel() {
            let scenarios = vec![
                noop(Suite::Api, "post", "p1"),
                noop(Suite::Api, "get", "g1"),
                noop(Suite::Api, "post", "p2"),
                noop(Suite::Ui, "par", "t1").parallel(),
                noop(Suite::Ui, "par", "t2").parallel(),
            ];
            assert_eq!(schedule(&scenarios), vec![vec![0, 2], vec![1], vec![3], vec![4]]);
        }

        #[test]
        fn test_workers_at_least_one() {
            assert_eq!(RunOptions::default().with_workers(0).workers, 1);
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_results_keep_catalogue_order() {
            let catalogue = vec![
                Scenario::new(Suite::Api, "slow", "slow", |_env| {
                    Box::pin(async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(())
                    })
                }),
                noop(Suite::Api, "fast", "fast"),
                Scenario::new(Suite::Api, "bad", "bad", |_env| {
                    Box::pin(async { Err(ProbeError::assertion("nope")) })
                }),
            ];
            let mut seen = Vec::new();
            let report = runner()
                .run_with(catalogue, &RunOptions::default(), |r| seen.push(r.name.clone()))
                .await;
            let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, ["slow", "fast", "bad"]);
            assert_eq!(seen.len(), 3);
            assert_eq!(report.passed, 2);
            assert_eq!(report.failed, 1);
            assert!(report.results[2].error.as_deref().unwrap().contains("nope"));
        }

        #[tokio::test]
        async fn test_timeout_fails_scenario() {
            let catalogue = vec![Scenario::new(Suite::Api, "g", "hangs", |_env| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                })
            })];
            let options = RunOptions::default().with_timeout(Duration::from_millis(20));
            let report = runner().run(catalogue, &options).await;
            assert_eq!(report.results[0].status, TestStatus::Failed);
            assert!(report.results[0].error.as_deref().unwrap().contains("timed out"));
        }

        #[tokio::test]
        async fn test_hard_error_keeps_earlier_soft_failures() {
            let catalogue = vec![Scenario::new(Suite::Api, "post", "post", |env| {
                Box::pin(async move {
                    env.soft.assert_eq(&500, &200, "POST /booking status");
                    Err(ProbeError::assertion("create response has no bookingid"))
                })
            })];
            let report = runner().run(catalogue, &RunOptions::default()).await;
            let error = report.results[0].error.as_deref().unwrap();
            assert!(error.contains("create response has no bookingid"));
            assert!(error.contains("POST /booking status"));
        }

        #[tokio::test]
        async fn test_timeout_keeps_earlier_soft_failures() {
            let catalogue = vec![Scenario::new(Suite::Api, "g", "hangs", |env| {
                Box::pin(async move {
                    env.soft.fail("GET /booking/{id} status");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    env.finish()
                })
            })];
            let options = RunOptions::default().with_timeout(Duration::from_millis(20));
            let report = runner().run(catalogue, &options).await;
            let error = report.results[0].error.as_deref().unwrap();
            assert!(error.contains("timed out"));
            assert!(error.contains("1 soft assertion(s) failed"));
        }

        #[tokio::test]
        async fn test_finished_soft_failures_reported_once() {
            let catalogue = vec![Scenario::new(Suite::Api, "g", "soft", |env| {
                Box::pin(async move {
                    env.soft.fail("DELETE /booking/{id} status");
                    env.finish()
                })
            })];
            let report = runner().run(catalogue, &RunOptions::default()).await;
            let error = report.results[0].error.as_deref().unwrap();
            assert_eq!(error.matches("DELETE /booking/{id} status").count(), 1);
        }

        #[tokio::test]
        async fn test_serial_group_runs_one_at_a_time() {
            let running = Arc::new(AtomicUsize::new(0));
            let overlap = Arc::new(AtomicBool::new(false));
            let make = |name: &str, parallel: bool| {
                let running = Arc::clone(&running);
                let overlap = Arc::clone(&overlap);
                let scenario = Scenario::new(Suite::Api, "group", name, move |_env| {
                    let running = Arc::clone(&running);
                    let overlap = Arc::clone(&overlap);
                    Box::pin(async move {
                        if running.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlap.store(true, Ordering::SeqCst);
                        }
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                });
                if parallel {
                    scenario.parallel()
                } else {
                    scenario
                }
            };

            let serial = vec![make("a", false), make("b", false), make("c", false)];
            let report = runner().run(serial, &RunOptions::default()).await;
            assert!(report.all_passed());
            assert!(!overlap.load(Ordering::SeqCst));

            let parallel = vec![make("d", true), make("e", true), make("f", true)];
            let report = runner().run(parallel, &RunOptions::default()).await;
            assert!(report.all_passed());
            assert!(overlap.load(Ordering::SeqCst));
        }

        #[tokio::test]
        async fn test_fail_fast_skips_rest_of_group() {
            let catalogue = vec![
                Scenario::new(Suite::Api, "g", "first", |_env| {
                    Box::pin(async { Err(ProbeError::assertion("boom")) })
                }),
                noop(Suite::Api, "g", "second"),
            ];
            let options = RunOptions::default().fail_fast();
            let report = runner().run(catalogue, &options).await;
            assert_eq!(report.results[0].status, TestStatus::Failed);
            assert_eq!(report.results[1].status, TestStatus::Skipped);
        }

        #[tokio::test]
        async fn test_ui_scenario_without_pages_fails() {
            let catalogue = vec![Scenario::new(Suite::Ui, "g", "needs page", |env| {
                Box::pin(async move {
                    env.page()?;
                    env.finish()
                })
            })];
            let report = runner().run(catalogue, &RunOptions::default()).await;
            assert!(report.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("browser"));
        }

        #[tokio::test]
        async fn test_missing_credentials_surface_in_token() {
            let catalogue = vec![Scenario::new(Suite::Api, "g", "token", |env| {
                Box::pin(async move {
                    env.fixtures.token().await?;
                    env.finish()
                })
            })];
            let runner = runner().with_credentials(Err(ProbeError::MissingConfig {
                key: "AUTH_USERNAME".into(),
            }));
            let report = runner.run(catalogue, &RunOptions::default()).await;
            assert!(report.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("AUTH_USERNAME"));
        }
    }
}
