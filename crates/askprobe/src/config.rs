//! Run configuration: locator set, test data and suite settings.
//!
//! All three are loaded once at process start and passed by reference for
//! the lifetime of the run. Nothing here is mutated after loading.

use crate::error::{ProbeError, ProbeResult};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// LOCATORS
// =============================================================================

/// Page context holding the disclaimer, language toggle and landing input box
pub const HOME_PAGE: &str = "home_page";

/// Page context holding the chat widget elements
pub const CHAT_WIDGET: &str = "chat_widget";

/// Every selector the scenario catalogue resolves
pub const REQUIRED_LOCATORS: [(&str, &str); 12] = [
    (HOME_PAGE, "accept_button"),
    (HOME_PAGE, "chat_input_box"),
    (HOME_PAGE, "language_button"),
    (CHAT_WIDGET, "input_field"),
    (CHAT_WIDGET, "send_button"),
    (CHAT_WIDGET, "ai_message"),
    (CHAT_WIDGET, "ai_message_rtl"),
    (CHAT_WIDGET, "error_message"),
    (CHAT_WIDGET, "ok_button"),
    (CHAT_WIDGET, "loading_spinner"),
    (CHAT_WIDGET, "widget_container"),
    (CHAT_WIDGET, "message_container"),
];

/// Selector strings keyed by page context, then by element name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locators {
    contexts: BTreeMap<String, BTreeMap<String, String>>,
}

impl Locators {
    /// Parse a locator document
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a locator document from disk
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = read_config_file(path)?;
        Self::from_json(&text)
    }

    /// Insert or replace a selector
    #[must_use]
    pub fn with(
        mut self,
        context: impl Into<String>,
        name: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        self.contexts
            .entry(context.into())
            .or_default()
            .insert(name.into(), selector.into());
        self
    }

    /// Resolve a selector; a missing entry cannot be interacted with
    pub fn selector(&self, context: &str, name: &str) -> ProbeResult<&str> {
        self.contexts
            .get(context)
            .and_then(|names| names.get(name))
            .map(String::as_str)
            .ok_or_else(|| ProbeError::interaction(format!("no locator for {context}.{name}")))
    }

    /// Number of selectors across all contexts
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.values().map(BTreeMap::len).sum()
    }

    /// Whether no selectors are defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `context.name` of every required selector that is absent or blank
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_LOCATORS
            .iter()
            .filter(|(context, name)| {
                self.selector(context, name)
                    .map_or(true, |selector| selector.trim().is_empty())
            })
            .map(|(context, name)| format!("{context}.{name}"))
            .collect()
    }
}

// =============================================================================
// TEST DATA
// =============================================================================

/// A query in both languages with the keywords its answer should mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFixture {
    /// English query
    pub en: String,
    /// Arabic query
    pub ar: String,
    /// Expected keywords per language
    pub expected_keywords: ExpectedKeywords,
}

impl QueryFixture {
    /// Query text for `language`
    #[must_use]
    pub fn query(&self, language: Language) -> &str {
        match language {
            Language::English => &self.en,
            Language::Arabic => &self.ar,
        }
    }

    /// Expected keywords for `language`
    #[must_use]
    pub fn keywords(&self, language: Language) -> &[String] {
        match language {
            Language::English => &self.expected_keywords.en,
            Language::Arabic => &self.expected_keywords.ar,
        }
    }
}

/// Keyword lists per language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedKeywords {
    /// English keywords, matched case-insensitively
    #[serde(default)]
    pub en: Vec<String>,
    /// Arabic keywords, matched exactly
    #[serde(default)]
    pub ar: Vec<String>,
}

/// Response validation fixtures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseValidationData {
    /// Queries asked in both languages
    #[serde(default)]
    pub common_queries: Vec<QueryFixture>,
}

/// Security probe fixtures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityData {
    /// Markup injection payloads
    #[serde(default)]
    pub xss_attempts: Vec<String>,
    /// Markers that must not appear in rendered markup
    #[serde(default)]
    pub xss_expected_strings: Vec<String>,
    /// Adversarial prompts
    #[serde(default)]
    pub malicious_prompts: Vec<String>,
    /// Phrases indicating the prompt was refused
    #[serde(default)]
    pub expected_rejection_phrases: Vec<String>,
}

/// Message used by the input field UI scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessage {
    /// Message to send
    pub message: String,
    /// Keyword expected in the rendered answer
    pub expected_keyword: String,
}

impl Default for TestMessage {
    fn default() -> Self {
        Self {
            message: "How to renew Emirates ID?".to_string(),
            expected_keyword: "emirates id".to_string(),
        }
    }
}

/// Named UI test messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessages {
    /// Message for input field scenarios
    #[serde(default)]
    pub input_field_test: TestMessage,
}

/// Expected input direction per language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionExpectation {
    /// Language the widget is switched to
    pub language: Language,
    /// `ltr` or `rtl`
    pub expected_direction: String,
}

/// UI behaviour fixtures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiData {
    /// Named messages
    #[serde(default)]
    pub test_messages: TestMessages,
    /// Direction expectations
    #[serde(default)]
    pub language_direction: Vec<DirectionExpectation>,
}

/// The whole test-data document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestData {
    /// Response validation fixtures
    #[serde(default)]
    pub response_validation: ResponseValidationData,
    /// Security fixtures
    #[serde(default)]
    pub security_tests: SecurityData,
    /// UI fixtures
    #[serde(default)]
    pub ui_tests: UiData,
}

impl TestData {
    /// Parse a test-data document
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a test-data document from disk
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = read_config_file(path)?;
        Self::from_json(&text)
    }
}

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Deadlines used by the interaction driver, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutPolicy {
    /// Disclaimer accept button
    pub disclaimer_ms: u64,
    /// Generic element presence (widget container, spinner, error dialog)
    pub element_ms: u64,
    /// Input control clickable
    pub input_ms: u64,
    /// AI response element
    pub response_ms: u64,
    /// Language toggle and URL change
    pub language_switch_ms: u64,
    /// Window over which the offline spinner must persist
    pub persistence_ms: u64,
    /// Pause after sending before reading back widget state
    pub settle_ms: u64,
    /// Pause after sending to let a full answer render
    pub render_ms: u64,
    /// Delay between characters in per-character typing
    pub keystroke_delay_ms: u64,
    /// Pause around per-character typing, before the first key and before Enter
    pub pre_submit_ms: u64,
    /// Polling interval for every wait
    pub poll_interval_ms: u64,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            disclaimer_ms: 10_000,
            element_ms: 10_000,
            input_ms: 30_000,
            response_ms: 60_000,
            language_switch_ms: 30_000,
            persistence_ms: 10_000,
            settle_ms: 5_000,
            render_ms: 10_000,
            keystroke_delay_ms: 100,
            pre_submit_ms: 500,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TimeoutPolicy {
    /// Policy with every deadline shrunk to `ms`, handy for mocks
    #[must_use]
    pub const fn uniform(ms: u64) -> Self {
        Self {
            disclaimer_ms: ms,
            element_ms: ms,
            input_ms: ms,
            response_ms: ms,
            language_switch_ms: ms,
            persistence_ms: ms,
            settle_ms: 0,
            render_ms: 0,
            keystroke_delay_ms: 0,
            pre_submit_ms: 0,
            poll_interval_ms: 1,
        }
    }

    /// Polling interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Keystroke delay as Duration
    #[must_use]
    pub const fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }

    /// Render pause as Duration
    #[must_use]
    pub const fn render(&self) -> Duration {
        Duration::from_millis(self.render_ms)
    }

    /// Pre-submit pause as Duration
    #[must_use]
    pub const fn pre_submit(&self) -> Duration {
        Duration::from_millis(self.pre_submit_ms)
    }

    /// Settle pause as Duration
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

// =============================================================================
// SUITE CONFIG
// =============================================================================

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Suite-wide settings, usually read from a YAML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Site root; language paths are appended to it
    pub base_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Browser window size
    pub viewport: Viewport,
    /// Chromium binary override
    pub chromium_path: Option<PathBuf>,
    /// Locator document
    pub locators: PathBuf,
    /// Test-data document
    pub test_data: PathBuf,
    /// Directory receiving screenshots
    pub screenshot_dir: PathBuf,
    /// Append-only validation log
    pub validation_log: PathBuf,
    /// Where the JSON suite report is written, if anywhere
    pub report: Option<PathBuf>,
    /// Wait deadlines
    pub timeouts: TimeoutPolicy,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ask.u.ae".to_string(),
            headless: false,
            viewport: Viewport::default(),
            chromium_path: None,
            locators: PathBuf::from("data/locators.json"),
            test_data: PathBuf::from("data/test-data.json"),
            screenshot_dir: PathBuf::from("screenshots"),
            validation_log: PathBuf::from("logs/validation.log"),
            report: None,
            timeouts: TimeoutPolicy::default(),
        }
    }
}

impl SuiteConfig {
    /// Parse a YAML suite configuration
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML suite configuration from disk
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = read_config_file(path)?;
        Self::from_yaml(&text)
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "base_url must be http(s): {}",
                self.base_url
            )));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be positive"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> ProbeResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ProbeError::config(format!("cannot read {}: {e}", path.display())))
}
