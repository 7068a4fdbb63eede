//! The browser surface the interaction driver talks to.
//!
//! ```text
//! ┌──────────────────────────┐
//! │  InteractionDriver       │
//! └────────────┬─────────────┘
//!              │ dyn ChatPage (blocking)
//!    ┌─────────┴──────────┐
//!    ▼                    ▼
//! CdpPage             MockPage
//! (chromiumoxide,     (scripted DOM,
//!  `browser` feature)  unit tests)
//! ```
//!
//! Element lookups return an [`ElementHandle`]: a point-in-time snapshot of
//! the first element matching a CSS selector. Actions address elements by
//! selector, so a stale handle can never be clicked.

use crate::error::ProbeResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Snapshot of a DOM element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementHandle {
    /// Selector the element was found with
    pub selector: String,
    /// Lower-case tag name
    pub tag_name: String,
    /// Rendered text (`innerText`)
    pub text: String,
    /// Inner markup (`innerHTML`)
    pub inner_html: String,
    /// Current value for form controls
    pub value: Option<String>,
    /// DOM attributes
    pub attributes: BTreeMap<String, String>,
    /// Computed CSS `direction`
    pub direction: Option<String>,
    /// Rendered with a non-empty box and not hidden
    pub displayed: bool,
    /// Not disabled
    pub enabled: bool,
    /// Scroll offset of the element's content
    pub scroll_top: i64,
}

impl ElementHandle {
    /// Create a displayed, enabled element
    #[must_use]
    pub fn new(selector: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            tag_name: tag_name.into(),
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Set rendered text; markup defaults to the same text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        if self.inner_html.is_empty() {
            self.inner_html.clone_from(&self.text);
        }
        self
    }

    /// Set inner markup
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = html.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set computed direction
    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Mark as not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attribute value, if present
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Present, displayed and enabled
    #[must_use]
    pub const fn is_clickable(&self) -> bool {
        self.displayed && self.enabled
    }

    /// Text shown in the control: the value for inputs, else rendered text
    #[must_use]
    pub fn visible_text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.text)
    }
}

/// Blocking browser page
pub trait ChatPage: fmt::Debug {
    /// Navigate to a URL and wait for the load to commit
    fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Current page URL
    fn current_url(&mut self) -> ProbeResult<String>;

    /// First element matching `selector`, or `None`
    fn query(&mut self, selector: &str) -> ProbeResult<Option<ElementHandle>>;

    /// Click the first element matching `selector`
    fn click(&mut self, selector: &str) -> ProbeResult<()>;

    /// Focus the element and type `text` into it
    fn type_text(&mut self, selector: &str, text: &str) -> ProbeResult<()>;

    /// Type `text` into the element without clicking it first
    fn type_keys(&mut self, selector: &str, text: &str) -> ProbeResult<()>;

    /// Press Enter in the element
    fn press_enter(&mut self, selector: &str) -> ProbeResult<()>;

    /// Reset a form control's value to empty
    fn clear(&mut self, selector: &str) -> ProbeResult<()>;

    /// Set `scrollTop` and return the value the element reports afterwards
    fn set_scroll_top(&mut self, selector: &str, value: i64) -> ProbeResult<i64>;

    /// Emulate loss (or return) of network connectivity
    fn set_offline(&mut self, offline: bool) -> ProbeResult<()>;

    /// PNG capture of the viewport
    fn screenshot(&mut self) -> ProbeResult<Vec<u8>>;

    /// Release the page and its browser
    fn close(&mut self) -> ProbeResult<()>;
}

/// Produces a fresh page for every scenario
pub trait PageFactory {
    /// Open a new page
    fn open_page(&self) -> ProbeResult<Box<dyn ChatPage>>;
}

impl<F> PageFactory for F
where
    F: Fn() -> ProbeResult<Box<dyn ChatPage>>,
{
    fn open_page(&self) -> ProbeResult<Box<dyn ChatPage>> {
        self()
    }
}
