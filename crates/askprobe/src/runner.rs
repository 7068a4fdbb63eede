//! Sequential suite runner.
//!
//! ```text
//! ┌───────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ PageFactory       │────►│ Session          │────►│ Scenario::run    │
//! │ (fresh page each) │     │ (closed on drop) │     │ → ScenarioOutcome│
//! └───────────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! Scenarios run one after another, never sharing a page. In
//! [`FailureMode::AndonCord`] the run stops at the first failure; in
//! [`FailureMode::CollectAll`] every selected scenario runs.

use crate::error::{ProbeError, ProbeResult};
use crate::page::PageFactory;
use crate::scenarios::{Scenario, ScenarioCategory};
use crate::session::{Session, SessionContext};
use crate::validation_log::ValidationLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// What to do when a scenario fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailureMode {
    /// Stop on first failure
    #[default]
    AndonCord,
    /// Run everything and report all failures
    CollectAll,
}

/// Which scenarios to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    /// Allowed categories; empty allows all
    pub categories: Vec<ScenarioCategory>,
    /// Substring the scenario name must contain
    pub name: Option<String>,
}

impl ScenarioFilter {
    /// Filter that selects everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a category
    #[must_use]
    pub fn with_category(mut self, category: ScenarioCategory) -> Self {
        self.categories.push(category);
        self
    }

    /// Restrict to names containing `pattern`
    #[must_use]
    pub fn with_name(mut self, pattern: impl Into<String>) -> Self {
        self.name = Some(pattern.into());
        self
    }

    /// Whether `scenario` is selected
    #[must_use]
    pub fn matches(&self, scenario: &dyn Scenario) -> bool {
        let category_ok =
            self.categories.is_empty() || self.categories.contains(&scenario.category());
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |pattern| scenario.name().contains(pattern));
        category_ok && name_ok
    }
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Scenario category
    pub category: ScenarioCategory,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Error kind if failed (`timeout`, `validation`, ...)
    pub error_kind: Option<String>,
    /// Scenario duration, session setup included
    pub duration: Duration,
}

impl ScenarioOutcome {
    /// Create a passing outcome
    #[must_use]
    pub fn pass(name: impl Into<String>, category: ScenarioCategory, duration: Duration) -> Self {
        Self {
            name: name.into(),
            category,
            passed: true,
            error: None,
            error_kind: None,
            duration,
        }
    }

    /// Create a failing outcome from the error that ended the scenario
    #[must_use]
    pub fn fail(
        name: impl Into<String>,
        category: ScenarioCategory,
        error: &ProbeError,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            passed: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
            duration,
        }
    }
}

/// Aggregated run results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Local start time, RFC 3339
    pub started_at: String,
    /// Outcomes in run order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Selected scenarios that never ran because the run stopped early
    pub skipped: usize,
    /// Total duration
    pub duration: Duration,
}

impl SuiteReport {
    /// Get number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Get number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Get number of scenarios that ran
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if every scenario ran and passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.skipped == 0 && self.outcomes.iter().all(|o| o.passed)
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }

    /// Pretty JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report, creating parent directories
    pub fn write(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Receives progress while a suite runs
pub trait RunObserver {
    /// A scenario is about to start; `index` is zero-based
    fn scenario_started(&mut self, _name: &str, _index: usize, _total: usize) {}

    /// A scenario finished
    fn scenario_finished(&mut self, _outcome: &ScenarioOutcome) {}
}

impl RunObserver for () {}

/// Runs scenarios one at a time against fresh pages
pub struct SuiteRunner<'a> {
    factory: &'a dyn PageFactory,
    context: SessionContext<'a>,
    log: &'a dyn ValidationLog,
    failure_mode: FailureMode,
}

impl fmt::Debug for SuiteRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("context", &self.context)
            .field("failure_mode", &self.failure_mode)
            .finish_non_exhaustive()
    }
}

impl<'a> SuiteRunner<'a> {
    /// Create runner (AndonCord mode)
    #[must_use]
    pub fn new(
        factory: &'a dyn PageFactory,
        context: SessionContext<'a>,
        log: &'a dyn ValidationLog,
    ) -> Self {
        Self {
            factory,
            context,
            log,
            failure_mode: FailureMode::AndonCord,
        }
    }

    /// Set failure mode
    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Run every scenario `filter` selects
    pub fn run(
        &self,
        scenarios: &[Box<dyn Scenario>],
        filter: &ScenarioFilter,
        observer: &mut dyn RunObserver,
    ) -> SuiteReport {
        let selected: Vec<&dyn Scenario> = scenarios
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| filter.matches(*s))
            .collect();
        let total = selected.len();
        let start = Instant::now();
        let mut report = SuiteReport {
            started_at: chrono::Local::now().to_rfc3339(),
            ..SuiteReport::default()
        };
        info!(total, mode = ?self.failure_mode, "suite started");

        for (index, scenario) in selected.iter().enumerate() {
            observer.scenario_started(&scenario.name(), index, total);
            let outcome = self.run_one(*scenario);
            observer.scenario_finished(&outcome);
            let failed = !outcome.passed;
            report.outcomes.push(outcome);

            if failed && self.failure_mode == FailureMode::AndonCord {
                report.skipped = total - index - 1;
                warn!(skipped = report.skipped, "stopping at first failure");
                break;
            }
        }

        report.duration = start.elapsed();
        info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped,
            "suite finished"
        );
        report
    }

    /// Run a single scenario in its own session
    pub fn run_one(&self, scenario: &dyn Scenario) -> ScenarioOutcome {
        let name = scenario.name();
        let start = Instant::now();
        info!(scenario = %name, "scenario started");

        let result = self.factory.open_page().and_then(|page| {
            let mut session = Session::open(page, &self.context, scenario.start_language())?;
            let result = scenario.run(&mut session, self.log);
            if result.is_err() {
                session.checkpoint(&format!("failure_{name}"));
            }
            result
        });

        let duration = start.elapsed();
        match result {
            Ok(()) => {
                info!(scenario = %name, ?duration, "scenario passed");
                ScenarioOutcome::pass(name, scenario.category(), duration)
            }
            Err(e) => {
                warn!(scenario = %name, error = %e, "scenario failed");
                ScenarioOutcome::fail(name, scenario.category(), &e, duration)
            }
        }
    }
}
