//! Interaction driver.
//!
//! Issues input actions against the chat widget and polls for the state
//! changes they cause. Every wait is bounded by the [`TimeoutPolicy`] and goes
//! through [`crate::wait::await_condition`]. Every failure path saves a
//! snapshot before the error is returned; nothing is retried.
//!
//! # Example
//!
//! ```
//! use askprobe::{
//!     ElementHandle, InteractionDriver, Language, Locators, MemorySnapshotSink, MockPage,
//!     Reaction, TimeoutPolicy, Trigger, CHAT_WIDGET,
//! };
//!
//! let locators = Locators::default()
//!     .with(CHAT_WIDGET, "input_field", "#input")
//!     .with(CHAT_WIDGET, "ai_message", ".ai");
//! let page = MockPage::new()
//!     .with_element(ElementHandle::new("#input", "textarea"))
//!     .on(
//!         Trigger::Submit,
//!         Reaction::reveal_after(ElementHandle::new(".ai", "div").with_text("Hello there"), 2),
//!     );
//! let snapshots = MemorySnapshotSink::new();
//! let mut driver = InteractionDriver::new(
//!     Box::new(page),
//!     &locators,
//!     &snapshots,
//!     TimeoutPolicy::uniform(1_000),
//! );
//!
//! let response = driver.submit_query("Hi", Language::English).unwrap();
//! assert_eq!(response.text(), "Hello there");
//! ```

use crate::config::{Locators, TimeoutPolicy, CHAT_WIDGET, HOME_PAGE};
use crate::error::{ProbeError, ProbeResult};
use crate::language::{InputMode, Language};
use crate::page::{ChatPage, ElementHandle};
use crate::snapshot::SnapshotSink;
use crate::wait::{self, Persistence, WaitOptions};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Path fragment the URL gains once the Arabic site is loaded
const ARABIC_PATH_MARKER: &str = "/ar/";

/// The AI answer element observed after a query
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHandle {
    /// Element snapshot taken when the answer appeared
    pub element: ElementHandle,
    /// Language the query was sent in
    pub language: Language,
    /// Time from submission until the element appeared
    pub elapsed: Duration,
}

impl ResponseHandle {
    /// Rendered answer text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.element.text
    }

    /// Answer markup
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.element.inner_html
    }
}

/// Drives one page through the chat widget
pub struct InteractionDriver<'a> {
    page: Box<dyn ChatPage>,
    locators: &'a Locators,
    snapshots: &'a dyn SnapshotSink,
    timeouts: TimeoutPolicy,
}

impl fmt::Debug for InteractionDriver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionDriver")
            .field("page", &self.page)
            .field("locators", &self.locators.len())
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl<'a> InteractionDriver<'a> {
    /// Driver over `page`
    #[must_use]
    pub fn new(
        page: Box<dyn ChatPage>,
        locators: &'a Locators,
        snapshots: &'a dyn SnapshotSink,
        timeouts: TimeoutPolicy,
    ) -> Self {
        Self {
            page,
            locators,
            snapshots,
            timeouts,
        }
    }

    /// Deadlines in use
    #[must_use]
    pub const fn timeouts(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    /// Underlying page
    pub fn page_mut(&mut self) -> &mut dyn ChatPage {
        self.page.as_mut()
    }

    /// Wait options for a deadline under the configured poll interval
    #[must_use]
    pub const fn wait_options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions {
            timeout_ms,
            poll_interval_ms: self.timeouts.poll_interval_ms,
        }
    }

    /// Resolve a selector from the locator set
    pub fn selector(&self, context: &str, name: &str) -> ProbeResult<String> {
        self.locators.selector(context, name).map(str::to_string)
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Save a screenshot under `name`.
    ///
    /// Snapshot problems are logged and swallowed so they never hide the
    /// failure being documented.
    pub fn checkpoint(&mut self, name: &str) -> Option<PathBuf> {
        let saved = self
            .page
            .screenshot()
            .and_then(|png| self.snapshots.save(name, &png));
        match saved {
            Ok(path) => {
                debug!(name, path = %path.display(), "checkpoint");
                Some(path)
            }
            Err(e) => {
                warn!(name, error = %e, "snapshot failed");
                None
            }
        }
    }

    fn fail(&mut self, snapshot: &str, error: ProbeError) -> ProbeError {
        self.checkpoint(snapshot);
        error
    }

    // =========================================================================
    // WAITS
    // =========================================================================

    /// Bounded poll on an arbitrary page predicate
    pub fn await_condition<F>(
        &mut self,
        description: &str,
        timeout_ms: u64,
        mut predicate: F,
    ) -> ProbeResult<Duration>
    where
        F: FnMut(&mut dyn ChatPage) -> ProbeResult<bool>,
    {
        let options = self.wait_options(timeout_ms);
        let page = self.page.as_mut();
        let result = wait::await_true(description, &options, || predicate(&mut *page));
        result.map_err(|e| self.fail(&format!("{description}_timeout"), e))
    }

    /// Check that `predicate` keeps holding for `window_ms`
    pub fn await_persistence<F>(
        &mut self,
        description: &str,
        window_ms: u64,
        mut predicate: F,
    ) -> ProbeResult<Persistence>
    where
        F: FnMut(&mut dyn ChatPage) -> ProbeResult<bool>,
    {
        let options = self.wait_options(window_ms);
        let page = self.page.as_mut();
        wait::await_persistence(description, &options, || predicate(&mut *page))
    }

    fn poll_element<F>(
        &mut self,
        context: &str,
        name: &str,
        timeout_ms: u64,
        accept: F,
    ) -> ProbeResult<ElementHandle>
    where
        F: Fn(&ElementHandle) -> bool,
    {
        let selector = self.selector(context, name)?;
        let options = self.wait_options(timeout_ms);
        let page = self.page.as_mut();
        wait::await_condition(name, &options, || {
            Ok(page.query(&selector)?.filter(|elem| accept(elem)))
        })
        .map(|waited| waited.value)
    }

    fn await_with_snapshot<F>(
        &mut self,
        context: &str,
        name: &str,
        timeout_ms: u64,
        accept: F,
    ) -> ProbeResult<ElementHandle>
    where
        F: Fn(&ElementHandle) -> bool,
    {
        self.poll_element(context, name, timeout_ms, accept)
            .map_err(|e| self.fail(&format!("{name}_timeout"), e))
    }

    /// Wait until the element is present in the DOM
    pub fn await_element(
        &mut self,
        context: &str,
        name: &str,
        timeout_ms: u64,
    ) -> ProbeResult<ElementHandle> {
        self.await_with_snapshot(context, name, timeout_ms, |_| true)
    }

    /// Wait until the element is present and displayed
    pub fn await_visible(
        &mut self,
        context: &str,
        name: &str,
        timeout_ms: u64,
    ) -> ProbeResult<ElementHandle> {
        self.await_with_snapshot(context, name, timeout_ms, |elem| elem.displayed)
    }

    /// Wait until the element is present, displayed and enabled
    pub fn await_clickable(
        &mut self,
        context: &str,
        name: &str,
        timeout_ms: u64,
    ) -> ProbeResult<ElementHandle> {
        self.await_with_snapshot(context, name, timeout_ms, ElementHandle::is_clickable)
    }

    /// Current snapshot of an element, if present
    pub fn find(&mut self, context: &str, name: &str) -> ProbeResult<Option<ElementHandle>> {
        let selector = self.selector(context, name)?;
        self.page.query(&selector)
    }

    /// Fixed wait; prefer a condition where one exists
    pub fn pause(&self, duration: Duration) {
        wait::pause(duration);
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click an element
    pub fn click(&mut self, context: &str, name: &str) -> ProbeResult<()> {
        let selector = self.selector(context, name)?;
        debug!(element = name, "click");
        self.page
            .click(&selector)
            .map_err(|e| self.fail(&format!("{name}_click_error"), e))
    }

    /// Type into an element without submitting
    pub fn type_text(&mut self, context: &str, name: &str, text: &str) -> ProbeResult<()> {
        let selector = self.selector(context, name)?;
        debug!(element = name, chars = text.chars().count(), "type");
        self.page
            .type_text(&selector, text)
            .map_err(|e| self.fail(&format!("{name}_type_error"), e))
    }

    /// Press Enter in an element
    pub fn press_enter(&mut self, context: &str, name: &str) -> ProbeResult<()> {
        let selector = self.selector(context, name)?;
        self.page
            .press_enter(&selector)
            .map_err(|e| self.fail(&format!("{name}_enter_error"), e))
    }

    /// Cut the page off from the network
    pub fn go_offline(&mut self) -> ProbeResult<()> {
        info!("network offline");
        self.page
            .set_offline(true)
            .map_err(|e| self.fail("network_offline_error", e))
    }

    /// Dismiss the disclaimer if it shows up.
    ///
    /// Returns whether a disclaimer was accepted. Its absence is not an error.
    pub fn accept_disclaimer(&mut self) -> ProbeResult<bool> {
        let timeout_ms = self.timeouts.disclaimer_ms;
        match self.poll_element(HOME_PAGE, "accept_button", timeout_ms, ElementHandle::is_clickable) {
            Ok(_) => {
                self.click(HOME_PAGE, "accept_button")?;
                info!("disclaimer accepted");
                Ok(true)
            }
            Err(e) if e.is_timeout() => {
                debug!("no disclaimer shown");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Switch the widget to `target`.
    ///
    /// English is the landing language, so only Arabic needs the toggle.
    pub fn switch_language(&mut self, target: Language) -> ProbeResult<()> {
        if target == Language::English {
            return Ok(());
        }
        let timeout_ms = self.timeouts.language_switch_ms;
        self.await_clickable(HOME_PAGE, "language_button", timeout_ms)?;
        self.click(HOME_PAGE, "language_button")?;

        let options = self.wait_options(timeout_ms);
        let page = self.page.as_mut();
        wait::await_true("URL to contain /ar/", &options, || {
            Ok(page.current_url()?.contains(ARABIC_PATH_MARKER))
        })
        .map_err(|e| self.fail("language_switch_timeout", e))?;
        info!(language = %target, "language switched");
        Ok(())
    }

    /// Switch language, then wait for the chat input field
    pub fn setup_chat(&mut self, language: Language) -> ProbeResult<ElementHandle> {
        self.switch_language(language)?;
        self.await_element(CHAT_WIDGET, "input_field", self.timeouts.input_ms)
    }

    /// Text direction of the chat input: its `dir` attribute, else computed CSS
    pub fn input_direction(&mut self) -> ProbeResult<String> {
        let input = self.await_element(CHAT_WIDGET, "input_field", self.timeouts.language_switch_ms)?;
        Ok(input
            .attribute("dir")
            .filter(|dir| !dir.is_empty())
            .map(str::to_string)
            .or(input.direction)
            .unwrap_or_default())
    }

    /// Scroll the message container to the top; returns the resulting offset
    pub fn scroll_to_top(&mut self) -> ProbeResult<i64> {
        self.await_element(CHAT_WIDGET, "message_container", self.timeouts.language_switch_ms)?;
        let selector = self.selector(CHAT_WIDGET, "message_container")?;
        self.page
            .set_scroll_top(&selector, 0)
            .map_err(|e| self.fail("scroll_error", e))
    }

    /// Type a query, submit it and wait for the AI answer.
    ///
    /// English text is typed in one burst. Arabic text is typed one
    /// character at a time into a cleared field.
    pub fn submit_query(&mut self, text: &str, language: Language) -> ProbeResult<ResponseHandle> {
        if text.trim().is_empty() {
            return Err(ProbeError::interaction("query text is empty"));
        }

        let input_ms = self.timeouts.input_ms;
        if let Err(e) = self.poll_element(CHAT_WIDGET, "input_field", input_ms, ElementHandle::is_clickable) {
            let error = if e.is_timeout() {
                ProbeError::interaction("chat input field not found or clickable")
            } else {
                e
            };
            return Err(self.fail("input_field_timeout", error));
        }

        let selector = self.selector(CHAT_WIDGET, "input_field")?;
        let typed = match language.input_mode() {
            InputMode::Bulk => self.page.type_text(&selector, text),
            InputMode::PerCharacter => self.type_per_character(&selector, text),
        };
        typed
            .and_then(|()| self.page.press_enter(&selector))
            .map_err(|e| self.fail("input_field_error", e))?;
        info!(language = %language, chars = text.chars().count(), "query submitted");

        let options = self.wait_options(self.timeouts.response_ms);
        let response_selector = self.selector(CHAT_WIDGET, language.response_locator())?;
        let page = self.page.as_mut();
        let waited = wait::await_condition("AI response", &options, || page.query(&response_selector))
            .map_err(|e| self.fail("ai_response_timeout", e))?;
        info!(language = %language, elapsed = ?waited.elapsed, "AI response received");

        self.checkpoint(&format!("ai_response_{}_{text}", language.code()));
        Ok(ResponseHandle {
            element: waited.value,
            language,
            elapsed: waited.elapsed,
        })
    }

    fn type_per_character(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
        self.page.clear(selector)?;
        self.page.click(selector)?;
        wait::pause(self.timeouts.pre_submit());
        let mut buf = [0_u8; 4];
        for ch in text.chars() {
            self.page.type_keys(selector, ch.encode_utf8(&mut buf))?;
            wait::pause(self.timeouts.keystroke_delay());
        }
        wait::pause(self.timeouts.pre_submit());
        Ok(())
    }

    /// Close the page
    pub fn close(&mut self) -> ProbeResult<()> {
        self.page.close()
    }
}
