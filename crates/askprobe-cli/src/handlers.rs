//! Subcommand implementations

use crate::commands::{CheckArgs, ListArgs, RunArgs, SelectArgs, SourceArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use askprobe::{
    catalog, DirectorySnapshotSink, FailureMode, FileValidationLog, Locators, PageFactory,
    Scenario, ScenarioCategory, ScenarioFilter, SessionContext, SuiteConfig, SuiteReport,
    SuiteRunner, TestData,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load the suite configuration and apply path overrides.
///
/// Relative document paths inside a config file are resolved against the
/// file's directory; command-line overrides are taken as given.
pub fn load_suite(source: &SourceArgs) -> CliResult<SuiteConfig> {
    let mut suite = match source.config {
        Some(ref path) => {
            let mut suite = SuiteConfig::load(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            suite.locators = rebase(base, &suite.locators);
            suite.test_data = rebase(base, &suite.test_data);
            suite
        }
        None => SuiteConfig::default(),
    };
    if let Some(ref path) = source.locators {
        suite.locators.clone_from(path);
    }
    if let Some(ref path) = source.test_data {
        suite.test_data.clone_from(path);
    }
    debug!(locators = %suite.locators.display(), test_data = %suite.test_data.display(), "configuration resolved");
    Ok(suite)
}

fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load locators and fail if any required selector is missing
pub fn load_locators(suite: &SuiteConfig) -> CliResult<Locators> {
    let locators = Locators::load(&suite.locators)?;
    let missing = locators.missing_required();
    if missing.is_empty() {
        Ok(locators)
    } else {
        Err(CliError::config(format!(
            "{} is missing locators: {}",
            suite.locators.display(),
            missing.join(", ")
        )))
    }
}

/// Build a scenario filter from selection flags
#[must_use]
pub fn filter_from(select: &SelectArgs) -> ScenarioFilter {
    ScenarioFilter {
        categories: select.categories.iter().copied().map(Into::into).collect(),
        name: select.filter.clone(),
    }
}

/// What `check` found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    /// Selectors defined
    pub locators: usize,
    /// Scenarios the test data expands to
    pub scenarios: usize,
}

/// Validate configuration, locators and test data
pub fn check(args: &CheckArgs) -> CliResult<CheckSummary> {
    let suite = load_suite(&args.source)?;
    suite.validate()?;
    let locators = load_locators(&suite)?;
    let data = TestData::load(&suite.test_data)?;

    for (index, fixture) in data.response_validation.common_queries.iter().enumerate() {
        if fixture.en.trim().is_empty() || fixture.ar.trim().is_empty() {
            return Err(CliError::config(format!(
                "common_queries[{index}] needs both an en and an ar query"
            )));
        }
    }
    if data.security_tests.xss_expected_strings.is_empty()
        && !data.security_tests.xss_attempts.is_empty()
    {
        return Err(CliError::config(
            "xss_attempts given without any xss_expected_strings",
        ));
    }
    if data.security_tests.expected_rejection_phrases.is_empty()
        && !data.security_tests.malicious_prompts.is_empty()
    {
        return Err(CliError::config(
            "malicious_prompts given without any expected_rejection_phrases",
        ));
    }

    Ok(CheckSummary {
        locators: locators.len(),
        scenarios: catalog(&data).len(),
    })
}

/// A catalogue entry as printed by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedScenario {
    /// Scenario name
    pub name: String,
    /// Scenario category
    pub category: ScenarioCategory,
}

/// Scenarios the test data expands to, after filtering
pub fn list(args: &ListArgs) -> CliResult<Vec<ListedScenario>> {
    let suite = load_suite(&args.source)?;
    let data = TestData::load(&suite.test_data)?;
    let filter = filter_from(&args.select);
    Ok(catalog(&data)
        .iter()
        .filter(|s| filter.matches(s.as_ref()))
        .map(|s| ListedScenario {
            name: s.name(),
            category: s.category(),
        })
        .collect())
}

#[cfg(feature = "browser")]
fn page_factory(suite: &SuiteConfig, no_sandbox: bool) -> CliResult<Box<dyn PageFactory>> {
    let options = askprobe::BrowserOptions::from_config(suite).with_sandbox(!no_sandbox);
    Ok(Box::new(askprobe::CdpPageFactory::new(options)))
}

#[cfg(not(feature = "browser"))]
fn page_factory(_suite: &SuiteConfig, _no_sandbox: bool) -> CliResult<Box<dyn PageFactory>> {
    Err(CliError::BrowserUnavailable)
}

/// Run the selected scenarios against the live widget
pub fn run(config: &CliConfig, args: &RunArgs) -> CliResult<SuiteReport> {
    let mut suite = load_suite(&args.source)?;
    if args.headless {
        suite.headless = true;
    }
    if let Some(ref url) = args.base_url {
        suite.base_url.clone_from(url);
    }
    if args.report.is_some() {
        suite.report.clone_from(&args.report);
    }
    suite.validate()?;

    let locators = load_locators(&suite)?;
    let data = TestData::load(&suite.test_data)?;
    let scenarios: Vec<Box<dyn Scenario>> = catalog(&data);
    let filter = filter_from(&args.select);
    let factory = page_factory(&suite, args.no_sandbox)?;

    let snapshots = DirectorySnapshotSink::new(suite.screenshot_dir.clone());
    let log = FileValidationLog::new(suite.validation_log.clone());
    let context = SessionContext {
        base_url: &suite.base_url,
        locators: &locators,
        snapshots: &snapshots,
        timeouts: suite.timeouts,
    };
    let mode = if args.fail_fast {
        FailureMode::AndonCord
    } else {
        FailureMode::CollectAll
    };
    let runner = SuiteRunner::new(factory.as_ref(), context, &log).with_failure_mode(mode);

    let selected = scenarios.iter().filter(|s| filter.matches(s.as_ref())).count();
    let mut reporter = ProgressReporter::new(config.use_color(), config.verbosity.is_quiet());
    reporter.header(&format!("askprobe: {} against {}", plural(selected), suite.base_url));
    reporter.start_progress(u64::try_from(selected).unwrap_or(u64::MAX), "starting");
    let report = runner.run(&scenarios, &filter, &mut reporter);
    reporter.finish();
    reporter.summary(&report);

    if let Some(ref path) = suite.report {
        report.write(path)?;
        info!(path = %path.display(), "suite report written");
        reporter.info(&format!("Report written to {}", path.display()));
    }
    Ok(report)
}

fn plural(count: usize) -> String {
    if count == 1 {
        "1 scenario".to_string()
    } else {
        format!("{count} scenarios")
    }
}
