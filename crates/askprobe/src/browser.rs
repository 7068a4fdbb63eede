//! Chromium over CDP.
//!
//! chromiumoxide is async; the suite is not. Each [`CdpPage`] owns a small
//! tokio runtime, runs the CDP handler on it and blocks on every call, so the
//! driver above it stays a plain sequential loop.

use crate::config::{SuiteConfig, Viewport};
use crate::error::{ProbeError, ProbeResult};
use crate::page::{ChatPage, ElementHandle, PageFactory};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EmulateNetworkConditionsParams, EnableParams};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::js::EvaluationResult;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Element snapshot taken in the page; `null` when nothing matches
const SNAPSHOT_JS: &str = r"(sel) => {
    const el = document.querySelector(sel);
    if (!el) { return null; }
    const style = window.getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    const attributes = {};
    for (const attr of el.attributes) { attributes[attr.name] = attr.value; }
    return {
        tag_name: el.tagName.toLowerCase(),
        text: el.innerText || '',
        inner_html: el.innerHTML,
        value: ('value' in el && typeof el.value === 'string') ? el.value : null,
        attributes,
        direction: style.direction || null,
        displayed: style.display !== 'none' && style.visibility !== 'hidden'
            && (rect.width > 0 || rect.height > 0),
        enabled: !el.disabled,
        scroll_top: Math.round(el.scrollTop),
    };
}";

const CLEAR_JS: &str = r"(sel) => {
    const el = document.querySelector(sel);
    if (!el) { return false; }
    el.value = '';
    el.dispatchEvent(new Event('input', { bubbles: true }));
    return true;
}";

const SCROLL_JS: &str = r"(sel, top) => {
    const el = document.querySelector(sel);
    if (!el) { return null; }
    el.scrollTop = top;
    return Math.round(el.scrollTop);
}";

/// Script result as `T`; `None` when the script returned `null` or nothing
///
/// CDP drops the `value` of a `null` result, which `into_value` reports as an
/// error rather than an absent element.
fn optional_value<T: DeserializeOwned>(result: &EvaluationResult) -> ProbeResult<Option<T>> {
    match result.value() {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ProbeError::browser(format!("unexpected script result: {e}"))),
    }
}

/// Launch settings for a browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// Run without a window
    pub headless: bool,
    /// Window size
    pub viewport: Viewport,
    /// Chromium binary override
    pub chromium_path: Option<PathBuf>,
    /// Keep the Chromium sandbox on
    pub sandbox: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: Viewport::default(),
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserOptions {
    /// Browser settings from a suite configuration
    #[must_use]
    pub fn from_config(config: &SuiteConfig) -> Self {
        Self {
            headless: config.headless,
            viewport: config.viewport,
            chromium_path: config.chromium_path.clone(),
            sandbox: true,
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable the sandbox (needed when running as root in containers)
    #[must_use]
    pub const fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

/// A single Chromium tab driven over CDP
#[derive(Debug)]
pub struct CdpPage {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

impl CdpPage {
    /// Launch Chromium and open a blank tab
    pub fn launch(options: &BrowserOptions) -> ProbeResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let mut builder = BrowserConfig::builder()
            .window_size(options.viewport.width, options.viewport.height)
            .viewport(None);
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|e| ProbeError::BrowserLaunch { message: e })?;

        let (browser, mut handler) = runtime
            .block_on(Browser::launch(config))
            .map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("CDP handler event loop ended");
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| ProbeError::browser(e.to_string()))?;

        info!(
            headless = options.headless,
            width = options.viewport.width,
            height = options.viewport.height,
            "browser launched"
        );
        Ok(Self {
            runtime,
            browser,
            page,
            handler,
            closed: false,
        })
    }

    fn evaluate(&self, function: &str, args: &[serde_json::Value]) -> ProbeResult<EvaluationResult> {
        let args = args
            .iter()
            .map(serde_json::Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let expression = format!("({function})({args})");
        self.runtime
            .block_on(self.page.evaluate(expression))
            .map_err(|e| ProbeError::browser(e.to_string()))
    }

    fn call_function<T>(&self, function: &str, args: &[serde_json::Value]) -> ProbeResult<T>
    where
        T: DeserializeOwned,
    {
        optional_value(&self.evaluate(function, args)?)?
            .ok_or_else(|| ProbeError::browser(format!("script returned no value: {function}")))
    }

    fn call_optional<T>(&self, function: &str, args: &[serde_json::Value]) -> ProbeResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        optional_value(&self.evaluate(function, args)?)
    }

    fn element(&self, selector: &str) -> ProbeResult<chromiumoxide::element::Element> {
        self.runtime
            .block_on(self.page.find_element(selector))
            .map_err(|e| ProbeError::interaction(format!("no element matches {selector}: {e}")))
    }
}

impl ChatPage for CdpPage {
    fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        debug!(url, "navigate");
        self.runtime
            .block_on(self.page.goto(url))
            .map_err(|e| ProbeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn current_url(&mut self) -> ProbeResult<String> {
        let url = self
            .runtime
            .block_on(self.page.url())
            .map_err(|e| ProbeError::browser(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    fn query(&mut self, selector: &str) -> ProbeResult<Option<ElementHandle>> {
        let snapshot: Option<ElementHandle> =
            self.call_optional(SNAPSHOT_JS, &[serde_json::Value::from(selector)])?;
        Ok(snapshot.map(|mut elem| {
            elem.selector = selector.to_string();
            elem
        }))
    }

    fn click(&mut self, selector: &str) -> ProbeResult<()> {
        let element = self.element(selector)?;
        self.runtime
            .block_on(element.click())
            .map_err(|e| ProbeError::interaction(format!("click on {selector} failed: {e}")))?;
        Ok(())
    }

    fn type_text(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
        let element = self.element(selector)?;
        self.runtime
            .block_on(async {
                element.click().await?;
                element.type_str(text).await
            })
            .map_err(|e| ProbeError::interaction(format!("typing into {selector} failed: {e}")))?;
        Ok(())
    }

    fn type_keys(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
        let element = self.element(selector)?;
        self.runtime
            .block_on(element.type_str(text))
            .map_err(|e| ProbeError::interaction(format!("typing into {selector} failed: {e}")))?;
        Ok(())
    }

    fn press_enter(&mut self, selector: &str) -> ProbeResult<()> {
        let element = self.element(selector)?;
        self.runtime
            .block_on(element.press_key("Enter"))
            .map_err(|e| ProbeError::interaction(format!("Enter in {selector} failed: {e}")))?;
        Ok(())
    }

    fn clear(&mut self, selector: &str) -> ProbeResult<()> {
        let found: bool = self.call_function(CLEAR_JS, &[serde_json::Value::from(selector)])?;
        if found {
            Ok(())
        } else {
            Err(ProbeError::interaction(format!("no element matches {selector}")))
        }
    }

    fn set_scroll_top(&mut self, selector: &str, value: i64) -> ProbeResult<i64> {
        let after: Option<i64> = self.call_optional(
            SCROLL_JS,
            &[serde_json::Value::from(selector), serde_json::Value::from(value)],
        )?;
        after.ok_or_else(|| ProbeError::interaction(format!("no element matches {selector}")))
    }

    fn set_offline(&mut self, offline: bool) -> ProbeResult<()> {
        let conditions = EmulateNetworkConditionsParams::new(offline, 0.0, -1.0, -1.0);
        self.runtime
            .block_on(async {
                self.page.execute(EnableParams::default()).await?;
                self.page.execute(conditions).await
            })
            .map_err(|e| ProbeError::browser(format!("network emulation failed: {e}")))?;
        debug!(offline, "network conditions set");
        Ok(())
    }

    fn screenshot(&mut self) -> ProbeResult<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();
        self.runtime
            .block_on(self.page.screenshot(params))
            .map_err(|e| ProbeError::Screenshot {
                message: e.to_string(),
            })
    }

    fn close(&mut self) -> ProbeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let Self {
            runtime,
            browser,
            handler,
            ..
        } = self;
        let result = runtime.block_on(async {
            browser.close().await?;
            browser.wait().await?;
            Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
        });
        handler.abort();
        result.map_err(|e| ProbeError::browser(format!("browser close failed: {e}")))?;
        debug!("browser closed");
        Ok(())
    }
}

impl Drop for CdpPage {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "browser did not close cleanly");
        }
    }
}

/// Launches a fresh browser for each scenario
#[derive(Debug, Clone, Default)]
pub struct CdpPageFactory {
    options: BrowserOptions,
}

impl CdpPageFactory {
    /// Factory launching browsers with `options`
    #[must_use]
    pub const fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

impl PageFactory for CdpPageFactory {
    fn open_page(&self) -> ProbeResult<Box<dyn ChatPage>> {
        Ok(Box::new(CdpPage::launch(&self.options)?))
    }
}
