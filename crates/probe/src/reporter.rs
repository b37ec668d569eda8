//! Reporter - scenario results, suite summary and JUnit output.
//!
//! Results are kept in catalogue order regardless of the order in which
//! concurrent scenarios finish.

use crate::artifact::Attachment;
use crate::result::ProbeResult;
use crate::scenarios::Suite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Failure mode for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailureMode {
    /// Run every selected scenario
    #[default]
    CollectAll,
    /// Stop starting new scenarios after the first failure
    AndonCord,
}

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Scenario passed
    Passed,
    /// Scenario failed
    Failed,
    /// Scenario was not started
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Group the scenario ran in
    pub group: String,
    /// Surface exercised
    pub suite: Suite,
    /// Tags
    pub tags: Vec<String>,
    /// Status
    pub status: TestStatus,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Error message if failed
    pub error: Option<String>,
    /// Files attached while running
    pub attachments: Vec<Attachment>,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn passed(name: impl Into<String>, suite: Suite, duration: Duration) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            suite,
            tags: Vec::new(),
            status: TestStatus::Passed,
            duration_ms: duration.as_millis() as u64,
            error: None,
            attachments: Vec::new(),
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        suite: Suite,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: TestStatus::Failed,
            error: Some(error.into()),
            ..Self::passed(name, suite, duration)
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(name: impl Into<String>, suite: Suite) -> Self {
        Self {
            status: TestStatus::Skipped,
            ..Self::passed(name, suite, Duration::ZERO)
        }
    }

    /// Set group and tags
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>, tags: Vec<String>) -> Self {
        self.group = group.into();
        self.tags = tags;
        self
    }

    /// Set attachments
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Summary of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Unique id of the run
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Number of scenarios selected
    pub total: usize,
    /// Number passed
    pub passed: usize,
    /// Number failed
    pub failed: usize,
    /// Number skipped
    pub skipped: usize,
    /// Wall time of the whole run in milliseconds
    pub duration_ms: u64,
    /// Per-scenario results in catalogue order
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    /// Build a report from results in catalogue order.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, duration: Duration, results: Vec<ScenarioResult>) -> Self {
        let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            total: results.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            skipped: count(TestStatus::Skipped),
            duration_ms: duration.as_millis() as u64,
            results,
        }
    }

    /// True when nothing failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed results
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| r.status.is_failed())
    }

    /// Result for the scenario called `name`
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} scenarios: {} passed, {} failed, {} skipped in {:.2}s",
            self.total,
            self.passed,
            self.failed,
            self.skipped,
            self.duration_ms as f64 / 1000.0
        )
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, output_path: &Path) -> ProbeResult<()> {
        std::fs::write(output_path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Generate JUnit XML for CI integration
    pub fn write_junit(&self, output_path: &Path) -> ProbeResult<()> {
        std::fs::write(output_path, self.render_junit())?;
        Ok(())
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="booker-probe" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            self.total,
            self.failed,
            self.skipped,
            self.duration_ms as f64 / 1000.0
        ));
        xml.push('\n');

        for result in &self.results {
            xml.push_str(&format!(
                r#"  <testcase classname="{}.{}" name="{}" time="{:.3}">"#,
                result.suite,
                escape_xml(&result.group),
                escape_xml(&result.name),
                result.duration_ms as f64 / 1000.0
            ));
            xml.push('\n');

            match (&result.status, &result.error) {
                (TestStatus::Failed, Some(error)) => {
                    let first_line = error.lines().next().unwrap_or_default();
                    xml.push_str(&format!(
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(first_line),
                        escape_xml(error)
                    ));
                    xml.push('\n');
                }
                (TestStatus::Skipped, _) => xml.push_str("    <skipped/>\n"),
                _ => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
