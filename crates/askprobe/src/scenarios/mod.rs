//! Scenario catalogue.
//!
//! Each scenario runs against its own [`Session`] and reports a single
//! `ProbeResult`. Parametrized scenarios are expanded from the test-data
//! document, one instance per fixture, named `<scenario>[<param>]`.

mod resilience;
mod response;
mod security;
mod ui;

pub use resilience::OfflineFallback;
pub use response::{ArabicQuery, EnglishQuery};
pub use security::{MaliciousPrompt, XssProbe};
pub use ui::{
    AiResponseRendered, InputAccessibility, InputClearedAfterSend, InputDirection, ScrollToTop,
    UserCanSendMessage, WidgetLoads,
};

use crate::config::{TestData, CHAT_WIDGET};
use crate::error::{ProbeError, ProbeResult};
use crate::language::Language;
use crate::session::Session;
use crate::validation_log::ValidationLog;
use crate::validator::ValidationRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Scenario grouping used for filtering and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioCategory {
    /// AI answer content
    Response,
    /// Widget behaviour
    Ui,
    /// XSS and prompt injection
    Security,
    /// Network failure handling
    Resilience,
}

impl ScenarioCategory {
    /// All categories in catalogue order
    pub const ALL: [Self; 4] = [Self::Response, Self::Ui, Self::Security, Self::Resilience];

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Ui => "ui",
            Self::Security => "security",
            Self::Resilience => "resilience",
        }
    }
}

impl fmt::Display for ScenarioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioCategory {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProbeError::config(format!("unknown scenario category: {s}")))
    }
}

/// One end-to-end check against the live widget
pub trait Scenario: fmt::Debug {
    /// Unique name, e.g. `english_query[0]`
    fn name(&self) -> String;

    /// Grouping
    fn category(&self) -> ScenarioCategory;

    /// Language of the landing page the session opens on
    fn start_language(&self) -> Language {
        Language::English
    }

    /// Run against an open session
    fn run(&self, session: &mut Session<'_>, log: &dyn ValidationLog) -> ProbeResult<()>;
}

/// Every scenario, expanded over the fixtures in `data`
#[must_use]
pub fn catalog(data: &TestData) -> Vec<Box<dyn Scenario>> {
    let mut scenarios: Vec<Box<dyn Scenario>> = Vec::new();

    let queries = &data.response_validation.common_queries;
    for (index, fixture) in queries.iter().enumerate() {
        scenarios.push(Box::new(EnglishQuery::new(index, fixture.clone())));
    }
    for (index, fixture) in queries.iter().enumerate() {
        scenarios.push(Box::new(ArabicQuery::new(index, fixture.clone())));
    }

    let message = &data.ui_tests.test_messages.input_field_test;
    scenarios.push(Box::new(WidgetLoads));
    scenarios.push(Box::new(UserCanSendMessage::new(message.message.clone())));
    scenarios.push(Box::new(AiResponseRendered::new(message.clone())));
    for expectation in &data.ui_tests.language_direction {
        scenarios.push(Box::new(InputDirection::new(expectation.clone())));
    }
    scenarios.push(Box::new(InputClearedAfterSend::new(message.message.clone())));
    scenarios.push(Box::new(ScrollToTop::new(message.message.clone())));
    scenarios.push(Box::new(InputAccessibility));

    let security = &data.security_tests;
    for (index, payload) in security.xss_attempts.iter().enumerate() {
        scenarios.push(Box::new(XssProbe::new(
            index,
            payload.clone(),
            security.xss_expected_strings.clone(),
        )));
    }
    for (index, prompt) in security.malicious_prompts.iter().enumerate() {
        scenarios.push(Box::new(MaliciousPrompt::new(
            index,
            prompt.clone(),
            security.expected_rejection_phrases.clone(),
        )));
    }

    scenarios.push(Box::new(OfflineFallback));
    scenarios
}

/// Log a record, then turn it into the scenario's verdict
fn conclude(log: &dyn ValidationLog, record: ValidationRecord) -> ProbeResult<()> {
    if let Err(e) = log.append(&record) {
        warn!(error = %e, "validation log write failed");
    }
    record.into_result()
}

/// Type a message into the chat input and press Enter
fn send_message(session: &mut Session<'_>, text: &str) -> ProbeResult<()> {
    session.type_text(CHAT_WIDGET, "input_field", text)?;
    session.press_enter(CHAT_WIDGET, "input_field")
}

/// A single failed check as an error
fn check_failed(reason: impl Into<String>) -> ProbeError {
    ProbeError::ValidationFailure {
        reasons: vec![reason.into()],
    }
}
