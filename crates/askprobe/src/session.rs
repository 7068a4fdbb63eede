//! Browser session scoped to one scenario.
//!
//! Opening a session loads the localized landing page, dismisses the
//! disclaimer if present and waits for the chat input box. The page is
//! closed when the session is dropped, whatever the scenario's outcome.

use crate::config::{Locators, TimeoutPolicy, HOME_PAGE};
use crate::error::ProbeResult;
use crate::interaction::InteractionDriver;
use crate::language::Language;
use crate::page::ChatPage;
use crate::snapshot::SnapshotSink;
use std::ops::{Deref, DerefMut};
use tracing::{debug, info, warn};

/// Shared, read-only inputs every session is opened with
#[derive(Clone, Copy)]
pub struct SessionContext<'a> {
    /// Site root
    pub base_url: &'a str,
    /// Locator set
    pub locators: &'a Locators,
    /// Screenshot destination
    pub snapshots: &'a dyn SnapshotSink,
    /// Wait deadlines
    pub timeouts: TimeoutPolicy,
}

impl std::fmt::Debug for SessionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

/// An open page on the chat widget
#[derive(Debug)]
pub struct Session<'a> {
    driver: InteractionDriver<'a>,
    language: Language,
}

impl<'a> Session<'a> {
    /// Load the landing page for `language` and wait until the chat is usable
    pub fn open(
        page: Box<dyn ChatPage>,
        context: &SessionContext<'a>,
        language: Language,
    ) -> ProbeResult<Self> {
        let mut session = Self {
            driver: InteractionDriver::new(
                page,
                context.locators,
                context.snapshots,
                context.timeouts,
            ),
            language,
        };

        let url = language.landing_url(context.base_url);
        debug!(url = %url, "opening session");
        session.driver.page_mut().navigate(&url)?;
        session.driver.accept_disclaimer()?;
        let element_ms = session.driver.timeouts().element_ms;
        session
            .driver
            .await_element(HOME_PAGE, "chat_input_box", element_ms)?;
        info!(language = %language, "session ready");
        Ok(session)
    }

    /// Language the session was opened in
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }
}

impl<'a> Deref for Session<'a> {
    type Target = InteractionDriver<'a>;

    fn deref(&self) -> &Self::Target {
        &self.driver
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.driver
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.driver.close() {
            warn!(error = %e, "session teardown failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock_page::{MockPage, Reaction};
    use crate::page::ElementHandle;
    use crate::snapshot::MemorySnapshotSink;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Wraps a mock and reports when it gets closed
    #[derive(Debug)]
    struct Watched {
        inner: MockPage,
        closed: Rc<Cell<bool>>,
    }

    impl ChatPage for Watched {
        fn navigate(&mut self, url: &str) -> ProbeResult<()> {
            self.inner.navigate(url)
        }
        fn current_url(&mut self) -> ProbeResult<String> {
            self.inner.current_url()
        }
        fn query(&mut self, selector: &str) -> ProbeResult<Option<ElementHandle>> {
            self.inner.query(selector)
        }
        fn click(&mut self, selector: &str) -> ProbeResult<()> {
            self.inner.click(selector)
        }
        fn type_text(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
            self.inner.type_text(selector, text)
        }
        fn type_keys(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
            self.inner.type_keys(selector, text)
        }
        fn press_enter(&mut self, selector: &str) -> ProbeResult<()> {
            self.inner.press_enter(selector)
        }
        fn clear(&mut self, selector: &str) -> ProbeResult<()> {
            self.inner.clear(selector)
        }
        fn set_scroll_top(&mut self, selector: &str, value: i64) -> ProbeResult<i64> {
            self.inner.set_scroll_top(selector, value)
        }
        fn set_offline(&mut self, offline: bool) -> ProbeResult<()> {
            self.inner.set_offline(offline)
        }
        fn screenshot(&mut self) -> ProbeResult<Vec<u8>> {
            self.inner.screenshot()
        }
        fn close(&mut self) -> ProbeResult<()> {
            self.closed.set(true);
            self.inner.close()
        }
    }

    fn locators() -> Locators {
        Locators::default()
            .with(HOME_PAGE, "accept_button", "#accept")
            .with(HOME_PAGE, "chat_input_box", "#landing")
    }

    fn context<'a>(locators: &'a Locators, sink: &'a MemorySnapshotSink) -> SessionContext<'a> {
        SessionContext {
            base_url: "https://ask.u.ae/",
            locators,
            snapshots: sink,
            timeouts: TimeoutPolicy::uniform(100),
        }
    }

    fn landing() -> MockPage {
        MockPage::new()
            .with_element(ElementHandle::new("#accept", "button"))
            .with_element(ElementHandle::new("#landing", "input"))
            .on_click("#accept", Reaction::remove("#accept"))
    }

    #[test]
    fn test_open_navigates_and_accepts_disclaimer() {
        let locators = locators();
        let sink = MemorySnapshotSink::new();
        let mut session = Session::open(Box::new(landing()), &context(&locators, &sink), Language::Arabic)
            .unwrap();
        assert_eq!(session.language(), Language::Arabic);
        assert_eq!(session.page_mut().current_url().unwrap(), "https://ask.u.ae/ar/");
        assert!(session.find(HOME_PAGE, "accept_button").unwrap().is_none());
    }

    #[test]
    fn test_open_without_disclaimer() {
        let locators = locators();
        let sink = MemorySnapshotSink::new();
        let page = MockPage::new().with_element(ElementHandle::new("#landing", "input"));
        assert!(Session::open(Box::new(page), &context(&locators, &sink), Language::English).is_ok());
    }

    #[test]
    fn test_open_fails_without_input_box() {
        let locators = locators();
        let sink = MemorySnapshotSink::new();
        let err = Session::open(Box::new(MockPage::new()), &context(&locators, &sink), Language::English)
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(sink.contains("chat_input_box_timeout"));
    }

    #[test]
    fn test_drop_closes_page() {
        let locators = locators();
        let sink = MemorySnapshotSink::new();
        let closed = Rc::new(Cell::new(false));
        let page = Watched {
            inner: landing(),
            closed: Rc::clone(&closed),
        };
        let session = Session::open(Box::new(page), &context(&locators, &sink), Language::English)
            .unwrap();
        assert!(!closed.get());
        drop(session);
        assert!(closed.get());
    }

    #[test]
    fn test_failed_open_still_closes_page() {
        let locators = locators();
        let sink = MemorySnapshotSink::new();
        let closed = Rc::new(Cell::new(false));
        let page = Watched {
            inner: MockPage::new(),
            closed: Rc::clone(&closed),
        };
        assert!(Session::open(Box::new(page), &context(&locators, &sink), Language::English).is_err());
        assert!(closed.get());
    }
}
