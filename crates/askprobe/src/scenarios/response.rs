use super::{conclude, Scenario, ScenarioCategory};
use crate::config::QueryFixture;
use crate::error::ProbeResult;
use crate::language::Language;
use crate::session::Session;
use crate::validation_log::ValidationLog;
use crate::validator::validate_content;

/// Ask a common query in English and validate the answer
#[derive(Debug, Clone)]
pub struct EnglishQuery {
    index: usize,
    fixture: QueryFixture,
}

impl EnglishQuery {
    /// Scenario for the `index`-th common query
    #[must_use]
    pub const fn new(index: usize, fixture: QueryFixture) -> Self {
        Self { index, fixture }
    }
}

impl Scenario for EnglishQuery {
    fn name(&self) -> String {
        format!("english_query[{}]", self.index)
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Response
    }

    fn run(&self, session: &mut Session<'_>, log: &dyn ValidationLog) -> ProbeResult<()> {
        let language = Language::English;
        let query = self.fixture.query(language);
        session.setup_chat(language)?;
        let response = session.submit_query(query, language)?;
        let record = validate_content(query, response.text(), language, self.fixture.keywords(language));
        conclude(log, record)
    }
}

/// Ask a common query on the Arabic site and validate the answer
#[derive(Debug, Clone)]
pub struct ArabicQuery {
    index: usize,
    fixture: QueryFixture,
}

impl ArabicQuery {
    /// Scenario for the `index`-th common query
    #[must_use]
    pub const fn new(index: usize, fixture: QueryFixture) -> Self {
        Self { index, fixture }
    }
}

impl Scenario for ArabicQuery {
    fn name(&self) -> String {
        format!("arabic_query[{}]", self.index)
    }

    fn category(&self) -> ScenarioCategory {
        ScenarioCategory::Response
    }

    fn start_language(&self) -> Language {
        Language::Arabic
    }

    fn run(&self, session: &mut Session<'_>, log: &dyn ValidationLog) -> ProbeResult<()> {
        let language = Language::Arabic;
        let query = self.fixture.query(language);
        let response = session.submit_query(query, language)?;
        let record = validate_content(query, response.text(), language, self.fixture.keywords(language));
        conclude(log, record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::super::fixtures::{self, AI, AI_RTL};
    use super::*;
    use crate::config::ExpectedKeywords;
    use crate::mock_page::{Reaction, Trigger};
    use crate::page::ElementHandle;
    use crate::snapshot::MemorySnapshotSink;
    use crate::validation_log::MemoryValidationLog;

    fn fixture() -> QueryFixture {
        QueryFixture {
            en: "How do I renew my Emirates ID?".into(),
            ar: "كيف أجدد الهوية الإماراتية؟".into(),
            expected_keywords: ExpectedKeywords {
                en: vec!["Emirates ID".into(), "renew".into()],
                ar: vec!["الهوية".into()],
            },
        }
    }

    #[test]
    fn test_english_answer_passes_and_is_logged() {
        let locators = fixtures::locators();
        let sink = MemorySnapshotSink::new();
        let log = MemoryValidationLog::new();
        let page = fixtures::widget().on(
            Trigger::Submit,
            Reaction::reveal_after(
                ElementHandle::new(AI, "div")
                    .with_text("You can renew your Emirates ID through the ICP portal."),
                2,
            ),
        );
        let mut session =
            Session::open(Box::new(page), &fixtures::context(&locators, &sink), Language::English)
                .unwrap();

        EnglishQuery::new(0, fixture()).run(&mut session, &log).unwrap();
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].passed());
        assert_eq!(records[0].query(), "How do I renew my Emirates ID?");
    }

    #[test]
    fn test_truncated_english_answer_fails_with_reasons() {
        let locators = fixtures::locators();
        let sink = MemorySnapshotSink::new();
        let log = MemoryValidationLog::new();
        let page = fixtures::widget().on(
            Trigger::Submit,
            Reaction::reveal(ElementHandle::new(AI, "div").with_text("Renew...")),
        );
        let mut session =
            Session::open(Box::new(page), &fixtures::context(&locators, &sink), Language::English)
                .unwrap();

        let err = EnglishQuery::new(0, fixture()).run(&mut session, &log).unwrap_err();
        assert_eq!(err.kind(), "validation");
        let record = &log.records()[0];
        assert_eq!(
            record.failure_reasons(),
            [
                "Response too short",
                "Incomplete response",
                "Missing English keyword: Emirates ID"
            ]
        );
    }

    #[test]
    fn test_arabic_answer_uses_rtl_element() {
        let locators = fixtures::locators();
        let sink = MemorySnapshotSink::new();
        let log = MemoryValidationLog::new();
        let page = fixtures::widget().on(
            Trigger::Submit,
            Reaction::reveal(
                ElementHandle::new(AI_RTL, "div")
                    .with_text("يمكنك تجديد الهوية الإماراتية عبر تطبيق الهيئة أو موقعها"),
            ),
        );
        let scenario = ArabicQuery::new(0, fixture());
        let mut session = Session::open(
            Box::new(page),
            &fixtures::context(&locators, &sink),
            scenario.start_language(),
        )
        .unwrap();

        scenario.run(&mut session, &log).unwrap();
        assert_eq!(log.records()[0].language(), Language::Arabic);
        assert!(sink.contains("ai_response_ar_"));
    }

    #[test]
    fn test_missing_answer_is_timeout_without_record() {
        let locators = fixtures::locators();
        let sink = MemorySnapshotSink::new();
        let log = MemoryValidationLog::new();
        let mut session = Session::open(
            Box::new(fixtures::widget()),
            &fixtures::context(&locators, &sink),
            Language::English,
        )
        .unwrap();

        let err = EnglishQuery::new(0, fixture()).run(&mut session, &log).unwrap_err();
        assert!(err.is_timeout());
        assert!(log.records().is_empty());
        assert!(sink.contains("ai_response_timeout"));
    }
}
