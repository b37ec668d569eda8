//! Accessibility scans with axe-core.
//!
//! [`AxeScanner::scan`] runs axe against the current page, restricted to
//! the WCAG 2.0 and 2.1 A/AA rule tags. Every violation's impact is
//! normalized (a missing impact becomes [`Impact::Unknown`]) and the
//! violations whose impact is in [`ScanOptions::fail_on_impact`] are
//! returned separately as `violations_to_fail`. The scanner never fails a
//! scenario because of violations; the caller decides.

use crate::artifact::TestInfo;
use crate::config::ProbeConfig;
use crate::driver::PageDriver;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Rule tags the scan is restricted to
pub const WCAG_TAGS: [&str; 4] = ["wcag2a", "wcag2aa", "wcag21a", "wcag21aa"];

/// Violation severity as reported by axe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Minor
    Minor,
    /// Moderate
    Moderate,
    /// Serious
    Serious,
    /// Critical
    Critical,
    /// The engine reported no impact
    Unknown,
}

impl Impact {
    /// Map an engine impact value; absent or unrecognised becomes `Unknown`.
    ///
    /// Only used for filtering. The raw engine output keeps unrecognised
    /// strings as reported, see [`normalize_impacts`].
    #[must_use]
    pub fn from_engine(raw: Option<&str>) -> Self {
        match raw {
            Some("minor") => Self::Minor,
            Some("moderate") => Self::Moderate,
            Some("serious") => Self::Serious,
            Some("critical") => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Lowercase name, as axe spells it
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for Impact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_engine(raw.as_deref()))
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One DOM node flagged by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    /// Outer HTML snippet
    #[serde(default)]
    pub html: String,
    /// CSS selector path(s) to the node
    #[serde(default)]
    pub target: Vec<Value>,
    /// What to fix
    #[serde(default)]
    pub failure_summary: Option<String>,
}

/// One failed rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Rule id (e.g. "color-contrast")
    pub id: String,
    /// Normalized impact
    #[serde(default = "unknown_impact")]
    pub impact: Impact,
    /// Rule description
    #[serde(default)]
    pub description: String,
    /// Short help text
    #[serde(default)]
    pub help: String,
    /// Link to the rule documentation
    #[serde(default)]
    pub help_url: Option<String>,
    /// Rule tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Offending nodes
    #[serde(default)]
    pub nodes: Vec<ViolationNode>,
}

const fn unknown_impact() -> Impact {
    Impact::Unknown
}

/// Caller-suppliable scan behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Attach the results only when there is at least one violation
    pub attach_only_on_violation: bool,
    /// Impacts that end up in `violations_to_fail`
    pub fail_on_impact: Vec<Impact>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            attach_only_on_violation: true,
            fail_on_impact: vec![Impact::Critical, Impact::Serious],
        }
    }
}

impl ScanOptions {
    /// Always attach the results
    #[must_use]
    pub const fn always_attach(mut self) -> Self {
        self.attach_only_on_violation = false;
        self
    }

    /// Replace the failing impacts
    #[must_use]
    pub fn fail_on(mut self, impacts: impl IntoIterator<Item = Impact>) -> Self {
        self.fail_on_impact = impacts.into_iter().collect();
        self
    }
}

/// Normalized scan results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Every violation, impacts normalized
    pub violations: Vec<Violation>,
    /// Number of rules that passed
    pub passes: usize,
    /// Number of rules axe could not decide
    pub incomplete: usize,
    /// Violations whose impact is in `fail_on_impact`
    pub violations_to_fail: Vec<Violation>,
    /// Full engine output with impacts normalized
    #[serde(skip)]
    pub raw: Value,
}

impl ScanResult {
    /// Build from raw axe output, normalizing impacts and filtering by `fail_on`.
    pub fn from_axe(mut raw: Value, fail_on: &[Impact]) -> ProbeResult<Self> {
        normalize_impacts(&mut raw);
        let violations: Vec<Violation> = match raw.get("violations") {
            Some(list) => serde_json::from_value(list.clone())?,
            None => {
                return Err(ProbeError::AccessibilityError {
                    message: format!("axe results have no violations list: {raw}"),
                })
            }
        };
        let count = |key: &str| raw.get(key).and_then(Value::as_array).map_or(0, Vec::len);
        let violations_to_fail = filter_by_impact(&violations, fail_on);
        Ok(Self {
            passes: count("passes"),
            incomplete: count("incomplete"),
            violations,
            violations_to_fail,
            raw,
        })
    }

    /// Whether no violation matched the failing impacts
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations_to_fail.is_empty()
    }

    /// Rule ids of the failing violations
    #[must_use]
    pub fn failing_rule_ids(&self) -> Vec<&str> {
        self.violations_to_fail.iter().map(|v| v.id.as_str()).collect()
    }
}

/// Replace a null or missing `impact` on each violation with `"unknown"`.
///
/// Strings are left as the engine reported them, including values outside
/// the known severities.
pub fn normalize_impacts(raw: &mut Value) {
    if let Some(list) = raw.get_mut("violations").and_then(Value::as_array_mut) {
        for violation in list {
            let Some(obj) = violation.as_object_mut() else {
                continue;
            };
            match obj.get("impact").and_then(Value::as_str) {
                Some(impact) => {
                    if Impact::from_engine(Some(impact)) == Impact::Unknown {
                        tracing::warn!(%impact, "unrecognised axe impact, filtered as unknown");
                    }
                }
                None => {
                    let _ = obj.insert(
                        "impact".to_string(),
                        Value::from(Impact::Unknown.as_str()),
                    );
                }
            }
        }
    }
}

/// Violations whose impact is in `fail_on`, in original order.
#[must_use]
pub fn filter_by_impact(violations: &[Violation], fail_on: &[Impact]) -> Vec<Violation> {
    violations
        .iter()
        .filter(|v| fail_on.contains(&v.impact))
        .cloned()
        .collect()
}

/// Runs axe-core against a page
#[derive(Debug, Clone, Default)]
pub struct AxeScanner {
    source: Option<String>,
}

impl AxeScanner {
    /// Scanner that relies on axe already being present on the page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner that injects `source` when the page has no axe
    #[must_use]
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }

    /// Load the axe script named by `config.axe_source`, if any.
    pub fn from_config(config: &ProbeConfig) -> ProbeResult<Self> {
        match &config.axe_source {
            Some(path) => Ok(Self::with_source(std::fs::read_to_string(path)?)),
            None => Ok(Self::new()),
        }
    }

    /// Script that runs axe with the WCAG tag restriction
    #[must_use]
    pub fn run_script() -> String {
        let tags = WCAG_TAGS
            .iter()
            .map(|t| format!("'{t}'"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "axe.run(document, {{ runOnly: {{ type: 'tag', values: [{tags}] }} }})\
             .then(r => JSON.parse(JSON.stringify(r)))"
        )
    }

    async fn ensure_loaded(&self, driver: &dyn PageDriver) -> ProbeResult<()> {
        let present = driver
            .evaluate("typeof window.axe !== 'undefined'")
            .await?
            .as_bool()
            .unwrap_or(false);
        if present {
            return Ok(());
        }
        match &self.source {
            Some(source) => {
                tracing::debug!("injecting axe-core into page");
                let _ = driver.evaluate(source).await?;
                Ok(())
            }
            None => Err(ProbeError::AccessibilityError {
                message: "axe-core is not loaded on the page and no AXE_SOURCE_PATH is configured"
                    .to_string(),
            }),
        }
    }

    /// Scan the current page.
    ///
    /// Results are attached to `test_info` as `AxeCore-<title>` when there
    /// are violations, or always when `attach_only_on_violation` is false.
    pub async fn scan(
        &self,
        driver: &dyn PageDriver,
        test_info: &TestInfo,
        options: &ScanOptions,
    ) -> ProbeResult<ScanResult> {
        self.ensure_loaded(driver).await?;
        let raw = driver.evaluate(&Self::run_script()).await?;
        let result = ScanResult::from_axe(raw, &options.fail_on_impact)?;

        tracing::info!(
            violations = result.violations.len(),
            to_fail = result.violations_to_fail.len(),
            "accessibility scan finished"
        );
        for violation in &result.violations {
            tracing::debug!(rule = %violation.id, impact = %violation.impact, "{}", violation.help);
        }

        if !options.attach_only_on_violation || !result.violations.is_empty() {
            let body = serde_json::to_string_pretty(&result.raw)?;
            let name = format!("AxeCore-{}", test_info.title());
            let _ = test_info.attach(&name, body, "application/json").await?;
        }

        Ok(result)
    }
}
