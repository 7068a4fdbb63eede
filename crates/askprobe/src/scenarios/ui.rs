use super::{check_failed, conclude, send_message, Scenario, ScenarioCategory};
use crate::config::{DirectionExpectation, TestMessage, CHAT_WIDGET};
use crate::error::ProbeResult;
use crate::language::Language;
use crate::session::Session;
use crate::validation_log::ValidationLog;
use crate::validator::{validate_accessibility, validate_direction, validate_keyword};

/// The widget container is present and displayed
#[derive(Debug, Clone, Copy)]
pub struct WidgetLoads;

impl Scenario for WidgetLoads {
    fn name(&self) -> String {
        "widget_loads".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, _log: &dyn ValidationLog) -> ProbeResult<()> {
        let element_ms = session.timeouts().element_ms;
        let widget = session.await_element(CHAT_WIDGET, "widget_container", element_ms)?;
        if widget.displayed {
            Ok(())
        } else {
            Err(check_failed("Chat widget did not load correctly"))
        }
    }
}

/// Sending a message shows the loading spinner
#[derive(Debug, Clone)]
pub struct UserCanSendMessage {
    message: String,
}

impl UserCanSendMessage {
    /// Scenario sending `message`
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

impl Scenario for UserCanSendMessage {
    fn name(&self) -> String {
        "user_can_send_message".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, _log: &dyn ValidationLog) -> ProbeResult<()> {
        let element_ms = session.timeouts().element_ms;
        session.await_element(CHAT_WIDGET, "input_field", element_ms)?;
        send_message(session, &self.message)?;
        // A missing spinner usually means a captcha took over the widget
        session.await_visible(CHAT_WIDGET, "loading_spinner", element_ms)?;
        session.checkpoint("user_can_send_message");
        Ok(())
    }
}

/// The AI answer renders and mentions the expected keyword
#[derive(Debug, Clone)]
pub struct AiResponseRendered {
    message: TestMessage,
}

impl AiResponseRendered {
    /// Scenario sending `message`
    #[must_use]
    pub const fn new(message: TestMessage) -> Self {
        Self { message }
    }
}

impl Scenario for AiResponseRendered {
    fn name(&self) -> String {
        "ai_response_rendered".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, _log: &dyn ValidationLog) -> ProbeResult<()> {
        session.setup_chat(Language::English)?;
        send_message(session, &self.message.message)?;
        let response_ms = session.timeouts().response_ms;
        let answer = session.await_element(CHAT_WIDGET, "ai_message", response_ms)?;
        session.checkpoint("ai_response_rendered");
        validate_keyword(
            &self.message.message,
            &answer.text,
            Language::English,
            &self.message.expected_keyword,
        )
        .into_result()
    }
}

/// The chat input reports the text direction of the active language
#[derive(Debug, Clone)]
pub struct InputDirection {
    expectation: DirectionExpectation,
}

impl InputDirection {
    /// Scenario checking one language's direction
    #[must_use]
    pub const fn new(expectation: DirectionExpectation) -> Self {
        Self { expectation }
    }
}

impl Scenario for InputDirection {
    fn name(&self) -> String {
        format!("input_direction[{}]", self.expectation.language)
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, log: &dyn ValidationLog) -> ProbeResult<()> {
        let language = self.expectation.language;
        session.switch_language(language)?;
        let actual = session.input_direction()?;
        session.checkpoint(&format!("multilingual_direction_{language}"));
        conclude(
            log,
            validate_direction(language, &self.expectation.expected_direction, &actual),
        )
    }
}

/// The input field is empty once a message has been sent
#[derive(Debug, Clone)]
pub struct InputClearedAfterSend {
    message: String,
}

impl InputClearedAfterSend {
    /// Scenario sending `message`
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

impl Scenario for InputClearedAfterSend {
    fn name(&self) -> String {
        "input_cleared_after_send".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, _log: &dyn ValidationLog) -> ProbeResult<()> {
        session.setup_chat(Language::English)?;
        send_message(session, &self.message)?;
        session.pause(session.timeouts().settle());
        let input_ms = session.timeouts().input_ms;
        let input = session.await_element(CHAT_WIDGET, "input_field", input_ms)?;
        session.checkpoint("input_is_cleared_after_sending");
        if input.visible_text().trim().is_empty() {
            Ok(())
        } else {
            Err(check_failed("Input field is not cleared after sending"))
        }
    }
}

/// The message list can be scrolled back to the top
#[derive(Debug, Clone)]
pub struct ScrollToTop {
    message: String,
}

impl ScrollToTop {
    /// Scenario sending `message` first
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

impl Scenario for ScrollToTop {
    fn name(&self) -> String {
        "scroll_to_top".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, _log: &dyn ValidationLog) -> ProbeResult<()> {
        session.setup_chat(Language::English)?;
        send_message(session, &self.message)?;
        session.pause(session.timeouts().render());
        let position = session.scroll_to_top()?;
        session.checkpoint("scrolled_to_top");
        if position == 0 {
            Ok(())
        } else {
            Err(check_failed(format!(
                "Scroll to top did not work: scrollTop is {position}"
            )))
        }
    }
}

/// The chat input carries an aria-label
#[derive(Debug, Clone, Copy)]
pub struct InputAccessibility;

impl Scenario for InputAccessibility {
    fn name(&self) -> String {
        "input_accessibility".to_string()
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Ui
    }

    fn run(&self, session: &mut Session<'_>, log: &dyn ValidationLog) -> ProbeResult<()> {
        let element_ms = session.timeouts().element_ms;
        let input = session.await_element(CHAT_WIDGET, "input_field", element_ms)?;
        conclude(log, validate_accessibility(&input.attributes))
    }
}
