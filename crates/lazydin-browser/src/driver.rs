use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Plain CSS selector
    Css(String),
    /// CSS selector narrowed to elements whose trimmed text equals `text`
    CssWithText { css: String, text: String },
}

impl Locator {
    pub fn css(css: impl Into<String>) -> Self {
        Locator::Css(css.into())
    }

    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    pub fn css_selector(&self) -> &str {
        match self {
            Locator::Css(css) => css,
            Locator::CssWithText { css, .. } => css,
        }
    }

    /// JS expression evaluating to the first matching element, or null
    fn js_lookup(&self) -> String {
        let css = js_string(self.css_selector());
        match self {
            Locator::Css(_) => format!("document.querySelector({})", css),
            Locator::CssWithText { text, .. } => format!(
                "Array.from(document.querySelectorAll({})).find(el => (el.innerText || '').trim() === {})",
                css,
                js_string(text)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "'{}'", css),
            Locator::CssWithText { css, text } => write!(f, "'{}' with text '{}'", css, text),
        }
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// The browser capabilities the workflow is written against.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Handle to a node found with [`BrowserDriver::query_nodes`]
    type Node: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    /// Block until the element is rendered and visible, or the wait times out
    async fn wait_visible(&self, locator: &Locator) -> Result<()>;

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Press a key (e.g. "Enter") on the focused element
    async fn key_event(&self, key: &str) -> Result<()>;

    async fn query_nodes(&self, locator: &Locator) -> Result<Vec<Self::Node>>;

    async fn outer_html(&self, node: &Self::Node) -> Result<String>;

    /// Trimmed visible text of a node
    async fn text(&self, node: &Self::Node) -> Result<String>;
}

/// [`BrowserDriver`] over a Chrome DevTools Protocol page
pub struct CdpDriver {
    page: Page,
    wait_timeout: Duration,
}

impl CdpDriver {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    async fn is_visible(&self, locator: &Locator) -> bool {
        let js = format!(
            "(() => {{ const el = {}; return !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length); }})()",
            locator.js_lookup()
        );

        // Evaluation fails while a navigation swaps the document out; keep polling
        match self.page.evaluate(js).await {
            Ok(result) => result.into_value::<bool>().unwrap_or(false),
            Err(e) => {
                tracing::debug!("Visibility check for {} failed: {}", locator, e);
                false
            }
        }
    }

    async fn find(&self, locator: &Locator) -> Result<Element> {
        self.query_nodes(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ElementNotFound(locator.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    type Node = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_visible(&self, locator: &Locator) -> Result<()> {
        tracing::debug!("Waiting for {} to become visible", locator);
        let started = Instant::now();

        loop {
            if self.is_visible(locator).await {
                return Ok(());
            }
            if started.elapsed() >= self.wait_timeout {
                return Err(Error::Timeout {
                    locator: locator.to_string(),
                    waited: self.wait_timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find(locator).await?;
        element.click().await?.type_str(text).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        tracing::debug!("Clicking {}", locator);
        self.find(locator).await?.click().await?;
        Ok(())
    }

    async fn key_event(&self, key: &str) -> Result<()> {
        let focused = self
            .page
            .find_element(":focus")
            .await
            .map_err(|_| Error::ElementNotFound("focused element".to_string()))?;
        focused.press_key(key).await?;
        Ok(())
    }

    async fn query_nodes(&self, locator: &Locator) -> Result<Vec<Element>> {
        let elements = self.page.find_elements(locator.css_selector()).await?;

        match locator {
            Locator::Css(_) => Ok(elements),
            Locator::CssWithText { text, .. } => {
                let mut matching = Vec::new();
                for element in elements {
                    let inner = element.inner_text().await?.unwrap_or_default();
                    if inner.trim() == text {
                        matching.push(element);
                    }
                }
                Ok(matching)
            }
        }
    }

    async fn outer_html(&self, node: &Element) -> Result<String> {
        Ok(node.outer_html().await?.unwrap_or_default())
    }

    async fn text(&self, node: &Element) -> Result<String> {
        Ok(node
            .inner_text()
            .await?
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::css("input#username").to_string(), "'input#username'");
        assert_eq!(
            Locator::css_with_text("nav button", "Posts").to_string(),
            "'nav button' with text 'Posts'"
        );
    }

    #[test]
    fn test_js_lookup_escapes_selector() {
        let locator = Locator::css(r#"input[placeholder="Search"]"#);
        assert_eq!(
            locator.js_lookup(),
            r#"document.querySelector("input[placeholder=\"Search\"]")"#
        );
    }

    #[test]
    fn test_js_lookup_with_text_filters_on_inner_text() {
        let locator = Locator::css_with_text("nav button", "Posts");
        let js = locator.js_lookup();
        assert!(js.starts_with("Array.from(document.querySelectorAll(\"nav button\"))"));
        assert!(js.ends_with("=== \"Posts\")"));
    }
}
