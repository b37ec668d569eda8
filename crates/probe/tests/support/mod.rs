//! Shared helpers for the integration tests.
#![allow(dead_code)]

pub mod demo_page;
pub mod mock_booker;

use booker_probe::{Credentials, ProbeConfig, SuiteRunner};
use std::path::Path;

/// Runner against `api_base_url` with valid mock credentials.
pub fn runner(api_base_url: &str, output_dir: &Path) -> SuiteRunner {
    let config = ProbeConfig::default()
        .with_api_base_url(api_base_url)
        .with_app_url(demo_page::APP_URL)
        .with_output_dir(output_dir);
    SuiteRunner::new(config)
        .unwrap()
        .with_credentials(Ok(Credentials::new(
            mock_booker::USERNAME,
            mock_booker::PASSWORD,
        )))
}
