//! Declarative scenarios.
//!
//! A [`Scenario`] is a named async body over a [`ScenarioEnv`]. Scenarios
//! are grouped the way they are written: members of a group run one after
//! another unless the group is marked [`GroupMode::Parallel`], while
//! different groups always run concurrently.

pub mod api;
pub mod ui;

use crate::accessibility::AxeScanner;
use crate::artifact::TestInfo;
use crate::assertion::SoftAssertions;
use crate::client::BookerClient;
use crate::config::ProbeConfig;
use crate::driver::PageDriver;
use crate::fixture::ApiFixtures;
use crate::page_object::FormPage;
use crate::result::{ProbeError, ProbeResult};
use crate::schema::SchemaSet;
use crate::testdata::TestData;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which surface a scenario exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// Booking API over HTTP
    Api,
    /// Demo page through a page driver
    Ui,
}

impl Suite {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Ui => "ui",
        }
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How members of one group are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// One after another, in catalogue order
    #[default]
    Serial,
    /// Each member independently
    Parallel,
}

/// Scenario body
pub type ScenarioFn = Arc<dyn Fn(ScenarioEnv) -> BoxFuture<'static, ProbeResult<()>> + Send + Sync>;

/// One declarative scenario
#[derive(Clone)]
pub struct Scenario {
    /// Title, unique within the catalogue
    pub name: String,
    /// Group the scenario belongs to
    pub group: String,
    /// Surface exercised
    pub suite: Suite,
    /// Tags for filtering (without `@`)
    pub tags: Vec<String>,
    /// Scheduling of the group
    pub mode: GroupMode,
    body: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("suite", &self.suite)
            .field("tags", &self.tags)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a serial scenario.
    pub fn new<F>(suite: Suite, group: &str, name: &str, body: F) -> Self
    where
        F: Fn(ScenarioEnv) -> BoxFuture<'static, ProbeResult<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            suite,
            tags: Vec::new(),
            mode: GroupMode::Serial,
            body: Arc::new(body),
        }
    }

    /// Add tags
    #[must_use]
    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.trim_start_matches('@').to_string()));
        self
    }

    /// Mark the group parallel
    #[must_use]
    pub const fn parallel(mut self) -> Self {
        self.mode = GroupMode::Parallel;
        self
    }

    /// Whether the scenario carries `tag` (with or without `@`)
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim_start_matches('@');
        self.tags.iter().any(|t| t == tag)
    }

    /// Run the body.
    pub fn run(&self, env: ScenarioEnv) -> BoxFuture<'static, ProbeResult<()>> {
        (self.body)(env)
    }
}

/// Everything a scenario body may use; built fresh per scenario
pub struct ScenarioEnv {
    /// Run configuration
    pub config: Arc<ProbeConfig>,
    /// Booking API client
    pub client: BookerClient,
    /// Compiled response schemas
    pub schemas: Arc<SchemaSet>,
    /// Lazily resolved API fixtures, private to this scenario
    pub fixtures: ApiFixtures,
    /// Literal request bodies
    pub test_data: TestData,
    /// Accessibility scanner
    pub scanner: Arc<AxeScanner>,
    /// Title and attachment sink
    pub test_info: Arc<TestInfo>,
    /// Soft assertions, verified by [`ScenarioEnv::finish`] and again by the
    /// runner when the scenario stops early
    pub soft: SoftAssertions,
    page: Option<Arc<dyn PageDriver>>,
}

impl std::fmt::Debug for ScenarioEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioEnv")
            .field("title", &self.test_info.title())
            .field("has_page", &self.page.is_some())
            .finish_non_exhaustive()
    }
}

impl ScenarioEnv {
    /// Assemble an environment.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<ProbeConfig>,
        client: BookerClient,
        schemas: Arc<SchemaSet>,
        fixtures: ApiFixtures,
        test_data: TestData,
        scanner: Arc<AxeScanner>,
        test_info: Arc<TestInfo>,
        soft: SoftAssertions,
        page: Option<Arc<dyn PageDriver>>,
    ) -> Self {
        Self {
            config,
            client,
            schemas,
            fixtures,
            test_data,
            scanner,
            test_info,
            soft,
            page,
        }
    }

    /// The page opened for this scenario.
    pub fn page(&self) -> ProbeResult<Arc<dyn PageDriver>> {
        self.page.clone().ok_or_else(|| ProbeError::BrowserLaunchError {
            message: "no page available; UI scenarios need a browser".to_string(),
        })
    }

    /// The form page object bound to this scenario's page and `app_url`.
    pub fn form_page(&self) -> ProbeResult<FormPage> {
        Ok(FormPage::new(self.page()?, self.config.app_url.clone()))
    }

    /// Verify the soft assertions recorded so far.
    pub fn finish(self) -> ProbeResult<()> {
        self.soft.verify()?;
        Ok(())
    }
}

/// Every scenario, API first, in catalogue order.
#[must_use]
pub fn catalogue() -> Vec<Scenario> {
    let mut all = api::scenarios();
    all.extend(ui::scenarios());
    all
}
