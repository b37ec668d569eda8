//! Browser control for the UI suite.
//!
//! With the `browser` feature, [`ChromiumBrowser`] launches Chromium over
//! the Chrome `DevTools` Protocol and hands out one [`ChromiumPage`] per
//! scenario. Every page operation is a JavaScript expression built from a
//! [`Selector`](crate::locator::Selector); element operations first wait
//! for the element to exist, bounded by the configured timeout.

use std::time::Duration;

/// Polling interval while waiting for an element
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Bound on navigation and element waits
    pub timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        }
    }
}

impl BrowserConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the wait bound
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// JSON string literal, which is also a valid JavaScript string literal
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening)]
mod cdp {
    use super::{js_string, BrowserConfig, POLL_INTERVAL};
    use crate::driver::{PageDriver, PageFactory};
    use crate::locator::{SelectOption, Selector};
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::Mutex;

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch a new browser instance
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height)
                .request_timeout(config.timeout);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "launched chromium");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            self.handle.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for ChromiumBrowser {
        async fn new_page(&self) -> ProbeResult<Arc<dyn PageDriver>> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(Arc::new(ChromiumPage {
                page,
                timeout: self.config.timeout,
            }))
        }
    }

    /// A browser page with real CDP connection
    #[derive(Debug)]
    pub struct ChromiumPage {
        page: CdpPage,
        timeout: Duration,
    }

    impl ChromiumPage {
        fn timeout_ms(&self) -> u64 {
            u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
        }

        async fn eval(&self, script: &str) -> ProbeResult<Value> {
            let params = EvaluateParams::builder()
                .expression(script)
                .await_promise(true)
                .return_by_value(true)
                .build()
                .map_err(ProbeError::page)?;
            let result = tokio::time::timeout(self.timeout, self.page.evaluate_expression(params))
                .await
                .map_err(|_| ProbeError::Timeout {
                    ms: self.timeout_ms(),
                })?
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(result.value().cloned().unwrap_or(Value::Null))
        }

        async fn poll(&self, probe: &str) -> ProbeResult<bool> {
            let deadline = Instant::now() + self.timeout;
            loop {
                if self.eval(probe).await?.as_bool() == Some(true) {
                    return Ok(true);
                }
                if Instant::now() >= deadline {
                    return Ok(false);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        async fn wait_for(&self, selector: &Selector) -> ProbeResult<()> {
            if self.poll(&format!("!!({})", selector.to_query())).await? {
                Ok(())
            } else {
                Err(ProbeError::ElementNotFound {
                    selector: selector.key(),
                })
            }
        }

        // Run `body` as `(el) => body` against the first match.
        async fn on_element(&self, selector: &Selector, body: &str) -> ProbeResult<Value> {
            self.wait_for(selector).await?;
            self.eval(&format!("(el => {body})({})", selector.to_query()))
                .await
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&self, url: &str) -> ProbeResult<()> {
            tokio::time::timeout(self.timeout, self.page.goto(url))
                .await
                .map_err(|_| ProbeError::Timeout {
                    ms: self.timeout_ms(),
                })?
                .map_err(|e| ProbeError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn url(&self) -> ProbeResult<String> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(url.unwrap_or_default())
        }

        async fn fill(&self, selector: &Selector, value: &str) -> ProbeResult<()> {
            let body = format!(
                "{{ el.focus(); el.value = {}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }}",
                js_string(value)
            );
            self.on_element(selector, &body).await?;
            Ok(())
        }

        async fn input_value(&self, selector: &Selector) -> ProbeResult<String> {
            let value = self.on_element(selector, "el.value").await?;
            Ok(value.as_str().unwrap_or_default().to_string())
        }

        async fn attribute(&self, selector: &Selector, name: &str) -> ProbeResult<Option<String>> {
            let body = format!("el.getAttribute({})", js_string(name));
            let value = self.on_element(selector, &body).await?;
            Ok(value.as_str().map(str::to_string))
        }

        async fn check(&self, selector: &Selector) -> ProbeResult<()> {
            let checked = self
                .on_element(selector, "{ if (!el.checked) el.click(); return el.checked; }")
                .await?;
            if checked.as_bool() == Some(true) {
                Ok(())
            } else {
                Err(ProbeError::page(format!("{selector} did not become checked")))
            }
        }

        async fn uncheck(&self, selector: &Selector) -> ProbeResult<()> {
            let checked = self
                .on_element(selector, "{ if (el.checked) el.click(); return el.checked; }")
                .await?;
            if checked.as_bool() == Some(false) {
                Ok(())
            } else {
                Err(ProbeError::page(format!("{selector} did not become unchecked")))
            }
        }

        async fn is_checked(&self, selector: &Selector) -> ProbeResult<bool> {
            let value = self.on_element(selector, "!!el.checked").await?;
            Ok(value.as_bool().unwrap_or(false))
        }

        async fn is_visible(&self, selector: &Selector) -> ProbeResult<bool> {
            let probe = format!(
                "(el => !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) \
                 && getComputedStyle(el).visibility !== 'hidden')({})",
                selector.to_query()
            );
            self.poll(&probe).await
        }

        async fn is_enabled(&self, selector: &Selector) -> ProbeResult<bool> {
            let value = self.on_element(selector, "!el.disabled").await?;
            Ok(value.as_bool().unwrap_or(false))
        }

        async fn click(&self, selector: &Selector) -> ProbeResult<()> {
            self.on_element(selector, "{ el.scrollIntoView(); el.click(); return true; }")
                .await?;
            Ok(())
        }

        async fn select_option(
            &self,
            selector: &Selector,
            option: &SelectOption,
        ) -> ProbeResult<Vec<String>> {
            let body = format!(
                "{{ const hit = Array.from(el.options).find((o, i) => {}); \
                 if (!hit) return null; el.value = hit.value; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); return [hit.value]; }}",
                option.to_predicate()
            );
            let selected = self.on_element(selector, &body).await?;
            if selected.is_null() {
                return Err(ProbeError::page(format!("no option matching '{option}'")));
            }
            Ok(serde_json::from_value(selected)?)
        }

        async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
            let value = self.eval(&selector.to_count_query()).await?;
            Ok(value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0))
        }

        async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
            let value = self
                .eval(&format!(
                    "({}).map(el => el.textContent || '')",
                    selector.to_all_query()
                ))
                .await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn evaluate(&self, script: &str) -> ProbeResult<Value> {
            self.eval(script).await
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumBrowser, ChromiumPage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!(config.timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_builder() {
        let config = BrowserConfig::default()
            .with_headless(false)
            .with_no_sandbox()
            .with_chromium_path("/usr/bin/chromium")
            .with_timeout(Duration::from_secs(2));
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("India"), r#""India""#);
        assert_eq!(js_string("a\"b"), r#""a\"b""#);
    }
}
