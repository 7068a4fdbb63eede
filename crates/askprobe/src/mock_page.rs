//! Scripted in-memory page for unit testing.
//!
//! A `MockPage` holds a flat selector → element map. Actions are recorded in
//! a call history and can trigger [`Reaction`]s, which is enough to model
//! the chat widget: a click on the disclaimer removes it, a submit reveals a
//! spinner and, a few polls later, the AI message.

use crate::error::{ProbeError, ProbeResult};
use crate::page::{ChatPage, ElementHandle};
use std::collections::BTreeMap;

/// First eight bytes of every PNG file
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Event that fires a reaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A click on the given selector
    Click(String),
    /// A non-empty message was submitted (Enter or a submit button)
    Submit,
    /// A submit happened with an empty input
    EmptySubmit,
}

/// Change applied to the page when a trigger fires
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Add or replace an element once `after_queries` further queries ran
    Reveal {
        /// Element to show
        element: ElementHandle,
        /// Queries before it appears; zero is immediate
        after_queries: u32,
    },
    /// Remove an element once `after_queries` further queries ran
    Remove {
        /// Selector to remove
        selector: String,
        /// Queries before it disappears; zero is immediate
        after_queries: u32,
    },
    /// Change the current URL
    SetUrl(String),
}

impl Reaction {
    /// Show an element immediately
    #[must_use]
    pub const fn reveal(element: ElementHandle) -> Self {
        Self::Reveal {
            element,
            after_queries: 0,
        }
    }

    /// Show an element after some polls
    #[must_use]
    pub const fn reveal_after(element: ElementHandle, after_queries: u32) -> Self {
        Self::Reveal {
            element,
            after_queries,
        }
    }

    /// Remove an element immediately
    #[must_use]
    pub fn remove(selector: impl Into<String>) -> Self {
        Self::Remove {
            selector: selector.into(),
            after_queries: 0,
        }
    }

    /// Remove an element after some polls
    #[must_use]
    pub fn remove_after(selector: impl Into<String>, after_queries: u32) -> Self {
        Self::Remove {
            selector: selector.into(),
            after_queries,
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    remaining: u32,
    reaction: Reaction,
}

/// Mock page for unit testing
#[derive(Debug)]
pub struct MockPage {
    /// Current URL
    pub current_url: String,
    /// Elements by selector
    pub elements: BTreeMap<String, ElementHandle>,
    /// Typed values of form controls by selector
    pub inputs: BTreeMap<String, String>,
    /// Selectors whose click submits the typed message
    pub submit_buttons: Vec<String>,
    /// Messages that reached the widget
    pub submitted: Vec<String>,
    /// Network emulation state
    pub offline: bool,
    /// Bytes returned by `screenshot`; `None` makes it fail
    pub screenshot_data: Option<Vec<u8>>,
    /// Call history for verification
    pub call_history: Vec<String>,
    /// Whether `close` ran
    pub closed: bool,
    triggers: Vec<(Trigger, Reaction)>,
    pending: Vec<Pending>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            current_url: String::new(),
            elements: BTreeMap::new(),
            inputs: BTreeMap::new(),
            submit_buttons: Vec::new(),
            submitted: Vec::new(),
            offline: false,
            screenshot_data: Some(PNG_SIGNATURE.to_vec()),
            call_history: Vec::new(),
            closed: false,
            triggers: Vec::new(),
            pending: Vec::new(),
        }
    }
}

impl MockPage {
    /// Create new mock page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, keyed by its selector
    #[must_use]
    pub fn with_element(mut self, element: ElementHandle) -> Self {
        self.add_element(element);
        self
    }

    /// Register a selector whose click submits the typed message
    #[must_use]
    pub fn with_submit_button(mut self, selector: impl Into<String>) -> Self {
        self.submit_buttons.push(selector.into());
        self
    }

    /// React to a trigger
    #[must_use]
    pub fn on(mut self, trigger: Trigger, reaction: Reaction) -> Self {
        self.triggers.push((trigger, reaction));
        self
    }

    /// React to a click on `selector`
    #[must_use]
    pub fn on_click(self, selector: impl Into<String>, reaction: Reaction) -> Self {
        self.on(Trigger::Click(selector.into()), reaction)
    }

    /// Make every screenshot fail
    #[must_use]
    pub fn without_screenshots(mut self) -> Self {
        self.screenshot_data = None;
        self
    }

    /// Add an element, keyed by its selector
    pub fn add_element(&mut self, element: ElementHandle) {
        self.elements.insert(element.selector.clone(), element);
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Number of recorded calls starting with `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.call_history
            .iter()
            .filter(|c| c.starts_with(method))
            .count()
    }

    fn require(&self, selector: &str) -> ProbeResult<&ElementHandle> {
        self.elements
            .get(selector)
            .ok_or_else(|| ProbeError::interaction(format!("no element matches {selector}")))
    }

    fn fire(&mut self, trigger: &Trigger) {
        let reactions: Vec<Reaction> = self
            .triggers
            .iter()
            .filter(|(t, _)| t == trigger)
            .map(|(_, r)| r.clone())
            .collect();
        for reaction in reactions {
            self.schedule(reaction);
        }
    }

    fn schedule(&mut self, reaction: Reaction) {
        let remaining = match &reaction {
            Reaction::Reveal { after_queries, .. } | Reaction::Remove { after_queries, .. } => {
                *after_queries
            }
            Reaction::SetUrl(_) => 0,
        };
        if remaining == 0 {
            self.apply(reaction);
        } else {
            self.pending.push(Pending {
                remaining,
                reaction,
            });
        }
    }

    fn apply(&mut self, reaction: Reaction) {
        match reaction {
            Reaction::Reveal { element, .. } => self.add_element(element),
            Reaction::Remove { selector, .. } => {
                self.elements.remove(&selector);
            }
            Reaction::SetUrl(url) => self.current_url = url,
        }
    }

    fn tick(&mut self) {
        let (due, waiting): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.remaining <= 1);
        self.pending = waiting
            .into_iter()
            .map(|mut p| {
                p.remaining -= 1;
                p
            })
            .collect();
        for pending in due {
            self.apply(pending.reaction);
        }
    }

    fn submit(&mut self, selector: Option<&str>) {
        let source = match selector {
            Some(sel) => Some(sel.to_string()),
            None => self
                .inputs
                .iter()
                .find(|(_, value)| !value.is_empty())
                .map(|(sel, _)| sel.clone()),
        };
        let message = source
            .as_ref()
            .and_then(|sel| self.inputs.get(sel))
            .cloned()
            .unwrap_or_default();

        if message.trim().is_empty() {
            self.fire(&Trigger::EmptySubmit);
            return;
        }
        if let Some(sel) = source {
            self.inputs.insert(sel, String::new());
        }
        self.submitted.push(message);
        self.fire(&Trigger::Submit);
    }
}

impl ChatPage for MockPage {
    fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.call_history.push(format!("navigate:{url}"));
        self.current_url = url.to_string();
        Ok(())
    }

    fn current_url(&mut self) -> ProbeResult<String> {
        Ok(self.current_url.clone())
    }

    fn query(&mut self, selector: &str) -> ProbeResult<Option<ElementHandle>> {
        self.tick();
        let typed = self.inputs.get(selector).cloned();
        Ok(self.elements.get(selector).cloned().map(|mut elem| {
            if typed.is_some() {
                elem.value = typed;
            }
            elem
        }))
    }

    fn click(&mut self, selector: &str) -> ProbeResult<()> {
        self.require(selector)?;
        self.call_history.push(format!("click:{selector}"));
        if self.submit_buttons.iter().any(|s| s == selector) {
            self.submit(None);
        }
        self.fire(&Trigger::Click(selector.to_string()));
        Ok(())
    }

    fn type_text(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
        self.require(selector)?;
        self.call_history.push(format!("click:{selector}"));
        self.call_history.push(format!("type:{selector}:{text}"));
        self.inputs
            .entry(selector.to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    fn type_keys(&mut self, selector: &str, text: &str) -> ProbeResult<()> {
        self.require(selector)?;
        self.call_history.push(format!("keys:{selector}:{text}"));
        self.inputs
            .entry(selector.to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    fn press_enter(&mut self, selector: &str) -> ProbeResult<()> {
        self.require(selector)?;
        self.call_history.push(format!("enter:{selector}"));
        self.submit(Some(selector));
        Ok(())
    }

    fn clear(&mut self, selector: &str) -> ProbeResult<()> {
        self.require(selector)?;
        self.call_history.push(format!("clear:{selector}"));
        self.inputs.insert(selector.to_string(), String::new());
        Ok(())
    }

    fn set_scroll_top(&mut self, selector: &str, value: i64) -> ProbeResult<i64> {
        self.require(selector)?;
        self.call_history.push(format!("scroll:{selector}:{value}"));
        let elem = self
            .elements
            .get_mut(selector)
            .ok_or_else(|| ProbeError::interaction(format!("no element matches {selector}")))?;
        elem.scroll_top = value.max(0);
        Ok(elem.scroll_top)
    }

    fn set_offline(&mut self, offline: bool) -> ProbeResult<()> {
        self.call_history.push(format!("offline:{offline}"));
        self.offline = offline;
        Ok(())
    }

    fn screenshot(&mut self) -> ProbeResult<Vec<u8>> {
        self.call_history.push("screenshot".to_string());
        self.screenshot_data
            .clone()
            .ok_or_else(|| ProbeError::Screenshot {
                message: "No mock screenshot set".to_string(),
            })
    }

    fn close(&mut self) -> ProbeResult<()> {
        self.call_history.push("close".to_string());
        self.closed = true;
        Ok(())
    }
}
