//! Booker Probe: end-to-end probes for a REST booking API and a demo form page
//!
//! The library holds the pieces the scenarios are built from and the
//! scenarios themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    BOOKER PROBE Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ Fixtures   │    │ Booking    │            │
//! │   │ (catalogue)│───►│ + Schemas  │───►│ API (HTTP) │            │
//! │   └─────┬──────┘    └────────────┘    └────────────┘            │
//! │         │           ┌────────────┐    ┌────────────┐            │
//! │         └──────────►│ Page object│───►│ PageDriver │            │
//! │                     │ + axe scan │    │ (mock/CDP) │            │
//! │                     └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use booker_probe::{catalogue, ProbeConfig, RunOptions, Suite, SuiteRunner};
//!
//! # async fn demo() -> booker_probe::ProbeResult<()> {
//! let runner = SuiteRunner::new(ProbeConfig::from_env()?)?;
//! let options = RunOptions::default().with_suite(Suite::Api);
//! let report = runner.run(catalogue(), &options).await;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod accessibility;
mod artifact;
mod assertion;
mod browser;
mod client;
mod config;
mod data;
#[allow(clippy::missing_errors_doc)]
mod driver;
mod fixture;
mod locator;
mod logging;
mod page_object;
mod reporter;
mod result;
mod schema;
mod testdata;

/// Suite runner: selection, scheduling and per-scenario timeouts
pub mod runner;

/// Declarative API and UI scenarios
pub mod scenarios;

pub use accessibility::{
    filter_by_impact, normalize_impacts, AxeScanner, Impact, ScanOptions, ScanResult, Violation,
    ViolationNode, WCAG_TAGS,
};
pub use artifact::{sanitize, Attachment, TestInfo};
pub use assertion::{
    ensure, ensure_eq, has_property, json_path, AssertionFailure, AssertionSummary,
    SoftAssertionError, SoftAssertions,
};
#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumPage};
pub use browser::{BrowserConfig, POLL_INTERVAL};
pub use client::{extract_booking_id, extract_token, ApiResponse, BookerClient};
pub use config::{
    Credentials, ProbeConfig, DEFAULT_API_BASE_URL, DEFAULT_APP_URL, DEFAULT_LOG_LEVEL,
    DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_MS, ENV_AUTH_PASSWORD, ENV_AUTH_USERNAME,
};
pub use data::{
    generate_booking_data, AdditionalNeeds, BookingData, BookingDates, CHECKIN_OFFSET_DAYS,
    CHECKOUT_OFFSET_DAYS, MAX_TOTAL_PRICE, MIN_TOTAL_PRICE,
};
pub use driver::{MockBrowser, MockDriver, MockElement, PageDriver, PageFactory};
pub use fixture::{ApiFixtures, FixtureContext, BOOKING_DATA, BOOKING_ID, TOKEN};
pub use locator::{SelectOption, Selector};
pub use logging::{init_tracing, LogFormat};
pub use page_object::{dedupe_info, sorted_copy, DropdownInfo, DropdownValues, FormPage, PageObject};
pub use reporter::{FailureMode, ScenarioResult, SuiteReport, TestStatus};
pub use result::{ProbeError, ProbeResult, SchemaViolation};
pub use runner::{RunOptions, SuiteRunner};
pub use scenarios::{catalogue, GroupMode, Scenario, ScenarioEnv, Suite};
pub use schema::{SchemaKind, SchemaReport, SchemaSet, SchemaValidator};
pub use testdata::{load_json_file, TestData, POST_REQUEST_BODY, PUT_REQUEST_BODY};
