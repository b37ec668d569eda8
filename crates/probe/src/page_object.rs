//! Page Object Model Support
//!
//! [`FormPage`] wraps the demo page with the text box, radio buttons,
//! weekday checkboxes, the static country dropdown and the animals
//! multi-select. It only talks to the DOM through a [`PageDriver`].

use crate::driver::PageDriver;
use crate::locator::{SelectOption, Selector};
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Trait for page objects representing a page or component in the UI.
pub trait PageObject {
    /// URL pattern that matches this page
    fn url_pattern(&self) -> &str;

    /// Check if the page is ready for interaction
    fn is_loaded(&self) -> bool {
        true
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Dropdown option texts in page order and sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownValues {
    /// Trimmed option texts in page order
    pub original: Vec<String>,
    /// Same texts, sorted by code point
    pub sorted: Vec<String>,
}

/// Dropdown option texts with duplicate analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownInfo {
    /// Trimmed option texts in page order
    pub original: Vec<String>,
    /// First occurrence of each text, in page order
    pub unique: Vec<String>,
    /// Each text that occurs more than once, listed once, in order of its
    /// first repeat
    pub duplicates: Vec<String>,
}

/// Sorted copy, case-sensitive by code point.
#[must_use]
pub fn sorted_copy(values: &[String]) -> Vec<String> {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted
}

/// Order-preserving de-duplication of `values`.
#[must_use]
pub fn dedupe_info(values: Vec<String>) -> DropdownInfo {
    let mut seen = HashSet::new();
    let mut repeated = HashSet::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();
    for value in &values {
        if seen.insert(value.as_str()) {
            unique.push(value.clone());
        } else if repeated.insert(value.as_str()) {
            duplicates.push(value.clone());
        }
    }
    DropdownInfo {
        original: values,
        unique,
        duplicates,
    }
}

/// Page object for the demo form/table page
#[derive(Clone)]
pub struct FormPage {
    driver: Arc<dyn PageDriver>,
    url: String,
    visited: Option<String>,
    /// `#name`
    pub name_text_box: Selector,
    /// `#male`
    pub male_radio: Selector,
    /// Checkbox labelled "Sunday"
    pub sunday_checkbox: Selector,
    /// `#country`
    pub static_dropdown: Selector,
    /// `#country option`
    pub static_dropdown_options: Selector,
    /// `#animals`
    pub multi_select_dropdown: Selector,
    /// `#animals option`
    pub multi_select_dropdown_options: Selector,
}

impl std::fmt::Debug for FormPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormPage")
            .field("url", &self.url)
            .field("visited", &self.visited)
            .finish_non_exhaustive()
    }
}

impl PageObject for FormPage {
    fn url_pattern(&self) -> &str {
        &self.url
    }

    fn is_loaded(&self) -> bool {
        self.visited.is_some()
    }

    fn page_name(&self) -> &str {
        "FormPage"
    }
}

impl FormPage {
    /// Bind the page object to a driver; `url` is where [`FormPage::open`] goes.
    pub fn new(driver: Arc<dyn PageDriver>, url: impl Into<String>) -> Self {
        Self {
            driver,
            url: url.into(),
            visited: None,
            name_text_box: Selector::css("#name"),
            male_radio: Selector::css("#male"),
            sunday_checkbox: Selector::label("Sunday"),
            static_dropdown: Selector::css("#country"),
            static_dropdown_options: Selector::css("#country option"),
            multi_select_dropdown: Selector::css("#animals"),
            multi_select_dropdown_options: Selector::css("#animals option"),
        }
    }

    /// The driver behind this page
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// URL recorded by the last navigation
    #[must_use]
    pub fn visited_url(&self) -> Option<&str> {
        self.visited.as_deref()
    }

    /// Navigate to `url` and record where the page ended up.
    pub async fn navigate(&mut self, url: &str) -> ProbeResult<String> {
        self.driver.goto(url).await?;
        let landed = self.driver.url().await?;
        tracing::info!(url = %landed, "navigated to form page");
        self.visited = Some(landed.clone());
        Ok(landed)
    }

    /// Navigate to the page's own URL.
    pub async fn open(&mut self) -> ProbeResult<String> {
        let url = self.url.clone();
        self.navigate(&url).await
    }

    /// `maxlength` of the name text box
    pub async fn name_max_length(&self) -> ProbeResult<Option<String>> {
        let max = self.driver.attribute(&self.name_text_box, "maxlength").await?;
        tracing::info!(max_length = ?max, "name text box max length");
        Ok(max)
    }

    /// Fill the name text box.
    pub async fn fill_name(&self, name: &str) -> ProbeResult<()> {
        self.driver.fill(&self.name_text_box, name).await?;
        let value = self.name_value().await?;
        tracing::info!(%value, "name text box filled");
        Ok(())
    }

    /// Current value of the name text box
    pub async fn name_value(&self) -> ProbeResult<String> {
        self.driver.input_value(&self.name_text_box).await
    }

    /// Check the male radio button.
    pub async fn select_male_radio(&self) -> ProbeResult<()> {
        self.driver.check(&self.male_radio).await?;
        tracing::info!("male radio button selected");
        Ok(())
    }

    /// Selector of the checkbox with the given label
    #[must_use]
    pub fn checkbox(&self, label: &str) -> Selector {
        Selector::label(label)
    }

    /// Check the checkbox with the given label.
    pub async fn select_checkbox(&self, label: &str) -> ProbeResult<()> {
        self.driver.check(&self.checkbox(label)).await?;
        tracing::info!(label, "checkbox selected");
        Ok(())
    }

    /// Select one option of the country dropdown.
    pub async fn select_country(&self, option: impl Into<SelectOption>) -> ProbeResult<()> {
        let option = option.into();
        self.driver
            .select_option(&self.static_dropdown, &option)
            .await?;
        tracing::info!(%option, "selected option in static dropdown");
        Ok(())
    }

    /// Value of the country dropdown
    pub async fn country_value(&self) -> ProbeResult<String> {
        self.driver.input_value(&self.static_dropdown).await
    }

    /// Number of country options
    pub async fn country_option_count(&self) -> ProbeResult<usize> {
        self.driver.count(&self.static_dropdown_options).await
    }

    /// Trimmed texts of the country options
    pub async fn country_values(&self) -> ProbeResult<Vec<String>> {
        self.trimmed_texts(&self.static_dropdown_options).await
    }

    /// Number of animal options
    pub async fn animal_option_count(&self) -> ProbeResult<usize> {
        self.driver.count(&self.multi_select_dropdown_options).await
    }

    /// Animal option texts in page order and sorted.
    pub async fn animal_values(&self) -> ProbeResult<DropdownValues> {
        let original = self
            .trimmed_texts(&self.multi_select_dropdown_options)
            .await?;
        let sorted = sorted_copy(&original);
        Ok(DropdownValues { original, sorted })
    }

    /// Animal option texts with duplicate analysis.
    pub async fn animal_values_info(&self) -> ProbeResult<DropdownInfo> {
        let original = self
            .trimmed_texts(&self.multi_select_dropdown_options)
            .await?;
        Ok(dedupe_info(original))
    }

    async fn trimmed_texts(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        Ok(self
            .driver
            .all_text_contents(selector)
            .await?
            .into_iter()
            .map(|text| text.trim().to_string())
            .collect())
    }
}
