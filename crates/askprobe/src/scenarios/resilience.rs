use super::{check_failed, Scenario, ScenarioCategory};
use crate::config::CHAT_WIDGET;
use crate::error::ProbeResult;
use crate::language::Language;
use crate::session::Session;
use crate::validation_log::ValidationLog;
use crate::wait::Persistence;
use tracing::info;

/// Words one of which the empty-input error must mention
const EMPTY_INPUT_HINTS: [&str; 3] = ["message", "cannot", "empty"];

/// Message sent while the network is down
const OFFLINE_MESSAGE: &str = "test network failure";

/// With the network down the widget reports errors instead of hanging silently.
///
/// An empty send must raise an error dialog. A real message must leave the
/// loading spinner up for the whole persistence window: the spinner going
/// away means the widget gave up without showing a fallback. If an answer
/// element does appear, it must apologise and ask to try again.
#[derive(Debug, Clone, Copy)]
pub struct OfflineFallback;

impl Scenario for OfflineFallback {
    fn name(&self) -> String {
        "offline_fallback".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Resilience
    }

    fn run(&self, session: &mut Session<'_>, _log: &dyn ValidationLog) -> ProbeResult<()> {
        session.setup_chat(Language::English)?;
        session.go_offline()?;
        let element_ms = session.timeouts().element_ms;

        session.click(CHAT_WIDGET, "send_button")?;
        let error = session.await_element(CHAT_WIDGET, "error_message", element_ms)?;
        let error_text = error.text.to_lowercase();
        if !EMPTY_INPUT_HINTS.iter().any(|hint| error_text.contains(hint)) {
            return Err(check_failed(
                "Expected fallback message not shown for empty input",
            ));
        }
        session.checkpoint("empty_input_error");
        session.click(CHAT_WIDGET, "ok_button")?;

        session.type_text(CHAT_WIDGET, "input_field", OFFLINE_MESSAGE)?;
        session.click(CHAT_WIDGET, "send_button")?;
        session.await_element(CHAT_WIDGET, "loading_spinner", element_ms)?;

        let spinner = session.selector(CHAT_WIDGET, "loading_spinner")?;
        let window_ms = session.timeouts().persistence_ms;
        let outcome = session.await_persistence("loading spinner", window_ms, |page| {
            Ok(page.query(&spinner)?.is_some())
        })?;
        if let Persistence::Lapsed(after) = outcome {
            info!(?after, "loading spinner disappeared while offline");
            return Err(check_failed(
                "Loading state disappeared; fallback may not have triggered",
            ));
        }
        session.checkpoint("persistent_loading_due_to_network_failure");

        if let Some(fallback) = session.find(CHAT_WIDGET, "ai_message")? {
            let text = fallback.text.to_lowercase();
            if !(text.contains("sorry") && text.contains("try again")) {
                return Err(check_failed(
                    "Expected fallback message not shown after persistent loading",
                ));
            }
        }
        Ok(())
    }
}
