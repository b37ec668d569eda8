//! PageDriver - Abstract Page Automation Trait
//!
//! Scenarios and page objects talk to a page only through [`PageDriver`],
//! so the same scenario runs against a real Chromium page (feature
//! `browser`) or against the in-memory [`MockDriver`].
//!
//! Lookups are not strict: operations act on the first match. A missing
//! element is [`ProbeError::ElementNotFound`], except for `is_visible`,
//! which reports `false`.

use crate::locator::{SelectOption, Selector};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Abstract driver for one page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load to finish
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Current URL
    async fn url(&self) -> ProbeResult<String>;

    /// Replace the value of an input
    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Current value of an input or select
    async fn input_value(&self, selector: &Selector) -> ProbeResult<String>;

    /// Attribute value, `None` when absent
    async fn attribute(&self, selector: &Selector, name: &str) -> ProbeResult<Option<String>>;

    /// Check a checkbox or radio button
    async fn check(&self, selector: &Selector) -> ProbeResult<()>;

    /// Uncheck a checkbox
    async fn uncheck(&self, selector: &Selector) -> ProbeResult<()>;

    /// Whether a checkbox or radio button is checked
    async fn is_checked(&self, selector: &Selector) -> ProbeResult<bool>;

    /// Whether the first match exists and is rendered
    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool>;

    /// Whether the first match is enabled
    async fn is_enabled(&self, selector: &Selector) -> ProbeResult<bool>;

    /// Click the first match
    async fn click(&self, selector: &Selector) -> ProbeResult<()>;

    /// Select one option of a `<select>`, returning the selected values
    async fn select_option(
        &self,
        selector: &Selector,
        option: &SelectOption,
    ) -> ProbeResult<Vec<String>>;

    /// Number of matches
    async fn count(&self, selector: &Selector) -> ProbeResult<usize>;

    /// Text content of every match, untrimmed
    async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>>;

    /// Evaluate a JavaScript expression, awaiting promises
    async fn evaluate(&self, script: &str) -> ProbeResult<Value>;
}

/// Opens a fresh page per scenario
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Open a new, isolated page
    async fn new_page(&self) -> ProbeResult<Arc<dyn PageDriver>>;
}

/// One element in the mock page model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Text content
    pub text: String,
    /// Input value
    pub value: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Checked state
    pub checked: bool,
    /// Rendered
    pub visible: bool,
    /// Enabled
    pub enabled: bool,
    /// `(value, label)` pairs for a `<select>`
    pub options: Vec<(String, String)>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            checked: false,
            visible: true,
            enabled: true,
            options: Vec::new(),
        }
    }
}

impl MockElement {
    /// Visible, enabled, empty element
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element with text content
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the input value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the options of a `<select>`; the first becomes the value
    #[must_use]
    pub fn options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(v, l)| (v.into(), l.into()))
            .collect();
        if let Some((first, _)) = self.options.first() {
            self.value = first.clone();
        }
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark checked
    #[must_use]
    pub const fn checked(mut self) -> Self {
        self.checked = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct MockPage {
    url: String,
    redirects: HashMap<String, String>,
    elements: HashMap<String, Vec<MockElement>>,
    scripts: Vec<(String, Value)>,
    history: Vec<String>,
}

/// Mock driver for unit testing
///
/// Elements are registered per [`Selector::key`]; `evaluate` answers with
/// the first canned value whose needle occurs in the script, else `null`.
#[derive(Debug, Default)]
pub struct MockDriver {
    page: Mutex<MockPage>,
}

impl Clone for MockDriver {
    fn clone(&self) -> Self {
        Self {
            page: Mutex::new(self.lock().clone()),
        }
    }
}

impl MockDriver {
    /// Create new mock driver on `about:blank`
    #[must_use]
    pub fn new() -> Self {
        let driver = Self::default();
        driver.lock().url = "about:blank".to_string();
        driver
    }

    fn lock(&self) -> MutexGuard<'_, MockPage> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register one element under `selector`
    #[must_use]
    pub fn with_element(self, selector: &Selector, element: MockElement) -> Self {
        self.lock()
            .elements
            .entry(selector.key())
            .or_default()
            .push(element);
        self
    }

    /// Register several elements under `selector`
    #[must_use]
    pub fn with_elements(self, selector: &Selector, elements: Vec<MockElement>) -> Self {
        self.lock()
            .elements
            .entry(selector.key())
            .or_default()
            .extend(elements);
        self
    }

    /// Make `goto(from)` land on `to`
    #[must_use]
    pub fn with_redirect(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let _ = self.lock().redirects.insert(from.into(), to.into());
        self
    }

    /// Answer scripts containing `needle` with `value`
    #[must_use]
    pub fn on_script(self, needle: impl Into<String>, value: Value) -> Self {
        self.lock().scripts.push((needle.into(), value));
        self
    }

    /// Call history for verification
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Snapshot of the first element under `selector`
    #[must_use]
    pub fn element(&self, selector: &Selector) -> Option<MockElement> {
        self.lock()
            .elements
            .get(&selector.key())
            .and_then(|all| all.first().cloned())
    }

    fn read<T>(&self, selector: &Selector, f: impl FnOnce(&MockElement) -> T) -> ProbeResult<T> {
        let page = self.lock();
        page.elements
            .get(&selector.key())
            .and_then(|all| all.first())
            .map(f)
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: selector.key(),
            })
    }

    fn act<T>(
        &self,
        call: &str,
        selector: &Selector,
        f: impl FnOnce(&mut MockElement) -> ProbeResult<T>,
    ) -> ProbeResult<T> {
        let mut page = self.lock();
        page.history.push(format!("{call}:{}", selector.key()));
        let element = page
            .elements
            .get_mut(&selector.key())
            .and_then(|all| all.first_mut())
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: selector.key(),
            })?;
        if !element.enabled {
            return Err(ProbeError::page(format!(
                "{call} on disabled element {selector}"
            )));
        }
        f(element)
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut page = self.lock();
        page.history.push(format!("goto:{url}"));
        let landed = page
            .redirects
            .get(url)
            .cloned()
            .unwrap_or_else(|| url.to_string());
        page.url = landed;
        Ok(())
    }

    async fn url(&self) -> ProbeResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
        self.act("fill", selector, |el| {
            el.value = value.to_string();
            Ok(())
        })
    }

    async fn input_value(&self, selector: &Selector) -> ProbeResult<String> {
        self.read(selector, |el| el.value.clone())
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> ProbeResult<Option<String>> {
        self.read(selector, |el| el.attributes.get(name).cloned())
    }

    async fn check(&self, selector: &Selector) -> ProbeResult<()> {
        self.act("check", selector, |el| {
            el.checked = true;
            Ok(())
        })
    }

    async fn uncheck(&self, selector: &Selector) -> ProbeResult<()> {
        self.act("uncheck", selector, |el| {
            el.checked = false;
            Ok(())
        })
    }

    async fn is_checked(&self, selector: &Selector) -> ProbeResult<bool> {
        self.read(selector, |el| el.checked)
    }

    async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool> {
        Ok(self.read(selector, |el| el.visible).unwrap_or(false))
    }

    async fn is_enabled(&self, selector: &Selector) -> ProbeResult<bool> {
        self.read(selector, |el| el.enabled)
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        self.act("click", selector, |_| Ok(()))
    }

    async fn select_option(
        &self,
        selector: &Selector,
        option: &SelectOption,
    ) -> ProbeResult<Vec<String>> {
        self.act("select_option", selector, |el| {
            let chosen = el
                .options
                .iter()
                .enumerate()
                .find(|(i, (value, label))| option.matches(value, label, *i))
                .map(|(_, (value, _))| value.clone())
                .ok_or_else(|| ProbeError::page(format!("no option matching '{option}'")))?;
            el.value = chosen.clone();
            Ok(vec![chosen])
        })
    }

    async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        Ok(self.lock().elements.get(&selector.key()).map_or(0, Vec::len))
    }

    async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        Ok(self
            .lock()
            .elements
            .get(&selector.key())
            .map(|all| all.iter().map(|el| el.text.clone()).collect())
            .unwrap_or_default())
    }

    async fn evaluate(&self, script: &str) -> ProbeResult<Value> {
        let mut page = self.lock();
        page.history.push(format!("evaluate:{script}"));
        Ok(page
            .scripts
            .iter()
            .find(|(needle, _)| script.contains(needle.as_str()))
            .map_or(Value::Null, |(_, value)| value.clone()))
    }
}

/// Hands out independent copies of a template [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockBrowser {
    template: Arc<MockDriver>,
}

impl MockBrowser {
    /// Every page opened starts as a copy of `template`
    #[must_use]
    pub fn new(template: MockDriver) -> Self {
        Self {
            template: Arc::new(template),
        }
    }
}

#[async_trait]
impl PageFactory for MockBrowser {
    async fn new_page(&self) -> ProbeResult<Arc<dyn PageDriver>> {
        Ok(Arc::new(self.template.as_ref().clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn country() -> Selector {
        Selector::css("#country")
    }

    fn driver() -> MockDriver {
        MockDriver::new()
            .with_element(&Selector::css("#name"), MockElement::new().attr("maxlength", "15"))
            .with_element(&Selector::label("Sunday"), MockElement::new())
            .with_element(
                &country(),
                MockElement::new().options([("usa", "United States"), ("india", "India")]),
            )
            .with_element(&Selector::css("#submit"), MockElement::new().disabled())
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_goto_sets_url() {
            let d = driver();
            assert_eq!(d.url().await.unwrap(), "about:blank");
            d.goto("https://example.test/").await.unwrap();
            assert_eq!(d.url().await.unwrap(), "https://example.test/");
            assert!(d.was_called("goto:https://example.test/"));
        }

        #[tokio::test]
        async fn test_redirect() {
            let d = MockDriver::new().with_redirect("http://a.test", "http://a.test/");
            d.goto("http://a.test").await.unwrap();
            assert_eq!(d.url().await.unwrap(), "http://a.test/");
        }
    }

    mod element_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_and_read() {
            let d = driver();
            let name = Selector::css("#name");
            d.fill(&name, "TestUser12345").await.unwrap();
            assert_eq!(d.input_value(&name).await.unwrap(), "TestUser12345");
            assert_eq!(
                d.attribute(&name, "maxlength").await.unwrap().as_deref(),
                Some("15")
            );
            assert_eq!(d.attribute(&name, "placeholder").await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_check_uncheck() {
            let d = driver();
            let sunday = Selector::label("Sunday");
            assert!(!d.is_checked(&sunday).await.unwrap());
            d.check(&sunday).await.unwrap();
            assert!(d.is_checked(&sunday).await.unwrap());
            d.uncheck(&sunday).await.unwrap();
            assert!(!d.is_checked(&sunday).await.unwrap());
        }

        #[tokio::test]
        async fn test_missing_element() {
            let d = driver();
            let ghost = Selector::css("#ghost");
            assert!(!d.is_visible(&ghost).await.unwrap());
            assert_eq!(d.count(&ghost).await.unwrap(), 0);
            let err = d.click(&ghost).await.unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { ref selector } if selector == "css=#ghost"));
        }

        #[tokio::test]
        async fn test_disabled_element_rejects_actions() {
            let d = driver();
            let submit = Selector::css("#submit");
            assert!(!d.is_enabled(&submit).await.unwrap());
            assert!(d.click(&submit).await.is_err());
        }
    }

    mod select_tests {
        use super::*;

        #[tokio::test]
        async fn test_select_by_value_or_label() {
            let d = driver();
            assert_eq!(d.input_value(&country()).await.unwrap(), "usa");
            let selected = d.select_option(&country(), &"India".into()).await.unwrap();
            assert_eq!(selected, vec!["india".to_string()]);
            assert_eq!(d.input_value(&country()).await.unwrap(), "india");
            d.select_option(&country(), &SelectOption::Index(0)).await.unwrap();
            assert_eq!(d.input_value(&country()).await.unwrap(), "usa");
        }

        #[tokio::test]
        async fn test_select_unknown_option() {
            let d = driver();
            let err = d
                .select_option(&country(), &SelectOption::Value("mars".into()))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("mars"));
        }
    }

    mod script_tests {
        use super::*;

        #[tokio::test]
        async fn test_evaluate_canned_values() {
            let d = MockDriver::new().on_script("typeof window.axe", json!(true));
            assert_eq!(
                d.evaluate("typeof window.axe !== 'undefined'").await.unwrap(),
                json!(true)
            );
            assert_eq!(d.evaluate("1 + 1").await.unwrap(), Value::Null);
            assert_eq!(d.history().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_browser_pages_are_isolated() {
            let browser = MockBrowser::new(driver());
            let first = browser.new_page().await.unwrap();
            let second = browser.new_page().await.unwrap();
            first.fill(&Selector::css("#name"), "changed").await.unwrap();
            assert_eq!(second.input_value(&Selector::css("#name")).await.unwrap(), "");
        }
    }
}
