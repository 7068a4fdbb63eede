//! Output formatting and progress reporting

use askprobe::{RunObserver, ScenarioOutcome, SuiteReport};
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for suite execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.suspend(|| {
                let _ = self.term.write_line(text);
            }),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, color: Style, message: &str) -> String {
        let prefix = if self.use_color {
            color.bold().apply_to(symbol).to_string()
        } else {
            plain.to_string()
        };
        format!("{prefix} {message}")
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line(&self.prefixed("✓", "PASS", Style::new().green(), message));
        }
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line(&self.prefixed("✗", "FAIL", Style::new().red(), message));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line(&self.prefixed("⚠", "WARN", Style::new().yellow(), message));
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line(&self.prefixed("ℹ", "INFO", Style::new().blue(), message));
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.line("");
        self.line(&styled);
    }

    /// Print suite summary
    pub fn summary(&self, report: &SuiteReport) {
        let (passed, failed, skipped) = (report.passed(), report.failed(), report.skipped);
        if self.quiet && failed == 0 {
            return;
        }

        self.line("");
        self.line(&summary_line(report, self.use_color));
        if skipped > 0 {
            self.warning(&format!("{skipped} scenario(s) not run after the first failure"));
        }
        for outcome in report.failures() {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            self.line(&format!("  {}: {reason}", outcome.name));
        }
        if passed == 0 && failed == 0 && skipped == 0 {
            self.warning("no scenarios selected");
        }
    }
}

/// One-line verdict for a finished suite
#[must_use]
pub fn summary_line(report: &SuiteReport, use_color: bool) -> String {
    let (passed, failed, skipped) = (report.passed(), report.failed(), report.skipped);
    let total = report.total() + skipped;
    let secs = report.duration.as_secs_f64();

    if use_color {
        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();
        let status = if report.all_passed() {
            passed_style.apply_to("PASSED")
        } else {
            failed_style.apply_to("FAILED")
        };
        format!(
            "{status} {total} scenarios in {secs:.2}s ({} passed, {} failed, {} skipped)",
            passed_style.apply_to(passed),
            failed_style.apply_to(failed),
            Style::new().yellow().apply_to(skipped),
        )
    } else {
        let status = if report.all_passed() { "PASSED" } else { "FAILED" };
        format!(
            "{status} {total} scenarios in {secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
        )
    }
}

impl RunObserver for ProgressReporter {
    fn scenario_started(&mut self, name: &str, _index: usize, _total: usize) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(name.to_string());
        }
    }

    fn scenario_finished(&mut self, outcome: &ScenarioOutcome) {
        let secs = outcome.duration.as_secs_f64();
        if outcome.passed {
            self.success(&format!("{} ({secs:.1}s)", outcome.name));
        } else {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            self.failure(&format!("{} ({secs:.1}s): {reason}", outcome.name));
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }
}
