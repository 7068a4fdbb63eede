//! askprobe: end-to-end probes for a multilingual chatbot widget
//!
//! Drives a real browser against an English/Arabic chat widget, submits
//! queries, waits for the AI answer and checks what came back.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌──────────────────┐    ┌────────────┐
//! │ Scenario   │───►│ InteractionDriver│───►│ ChatPage   │
//! │ catalogue  │    │ (bounded waits)  │    │ (CDP/mock) │
//! └─────┬──────┘    └──────────────────┘    └────────────┘
//!       │ response text / markup
//!       ▼
//! ┌────────────┐    ┌──────────────────┐
//! │ Validator  │───►│ ValidationLog    │
//! │ (pure)     │    │ (append-only)    │
//! └────────────┘    └──────────────────┘
//! ```
//!
//! Real browser control lives behind the `browser` feature. Everything else,
//! tests included, runs against the scripted [`MockPage`].

#![warn(missing_docs)]

/// Headless Chromium over CDP
#[cfg(feature = "browser")]
pub mod browser;

/// Locators, test data and suite settings
pub mod config;
mod error;
/// Input actions and bounded polling against the widget
pub mod interaction;
mod language;
/// Scripted in-memory page
pub mod mock_page;
mod page;
/// Sequential suite runner and report
pub mod runner;
pub mod scenarios;
mod session;
mod snapshot;
mod validation_log;
/// Pure response checks
pub mod validator;
/// Polling primitives
pub mod wait;

#[cfg(feature = "browser")]
pub use browser::{BrowserOptions, CdpPage, CdpPageFactory};
pub use config::{
    DirectionExpectation, ExpectedKeywords, Locators, QueryFixture, SecurityData, SuiteConfig,
    TestData, TimeoutPolicy, Viewport, CHAT_WIDGET, HOME_PAGE, REQUIRED_LOCATORS,
};
pub use error::{ProbeError, ProbeResult};
pub use interaction::{InteractionDriver, ResponseHandle};
pub use language::{InputMode, Language};
pub use mock_page::{MockPage, Reaction, Trigger};
pub use page::{ChatPage, ElementHandle, PageFactory};
pub use runner::{
    FailureMode, RunObserver, ScenarioFilter, ScenarioOutcome, SuiteReport, SuiteRunner,
};
pub use scenarios::{catalog, Scenario, ScenarioCategory};
pub use session::{Session, SessionContext};
pub use snapshot::{sanitize_name, DirectorySnapshotSink, MemorySnapshotSink, SnapshotSink};
pub use validation_log::{
    escape_html, format_entry, FileValidationLog, MemoryValidationLog, ValidationLog,
};
pub use validator::ValidationRecord;
pub use wait::{await_condition, await_persistence, await_true, Persistence, WaitOptions};
