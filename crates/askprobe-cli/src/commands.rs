//! CLI command definitions using clap

use askprobe::ScenarioCategory;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// askprobe: end-to-end probes for an English/Arabic chatbot widget
#[derive(Parser, Debug)]
#[command(name = "askprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorArg::Auto, global = true)]
    pub color: ColorArg,

    /// Diagnostic log format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the live widget
    Run(RunArgs),

    /// List the scenarios the test data expands to
    List(ListArgs),

    /// Validate configuration, locators and test data without a browser
    Check(CheckArgs),
}

/// Where configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Suite configuration (YAML); defaults apply when omitted
    #[arg(short, long, env = "ASKPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the locator document path
    #[arg(long)]
    pub locators: Option<PathBuf>,

    /// Override the test-data document path
    #[arg(long)]
    pub test_data: Option<PathBuf>,
}

/// Scenario selection
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Only run these categories (repeatable)
    #[arg(long = "category", value_enum)]
    pub categories: Vec<CategoryArg>,

    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration sources
    #[command(flatten)]
    pub source: SourceArgs,

    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Disable the Chromium sandbox (containers running as root)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Override the site root
    #[arg(long)]
    pub base_url: Option<String>,

    /// Write the JSON suite report here
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Configuration sources
    #[command(flatten)]
    pub source: SourceArgs,

    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration sources
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Scenario category argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryArg {
    /// AI answer content
    Response,
    /// Widget behaviour
    Ui,
    /// XSS and prompt injection
    Security,
    /// Network failure handling
    Resilience,
}

impl From<CategoryArg> for ScenarioCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Response => Self::Response,
            CategoryArg::Ui => Self::Ui,
            CategoryArg::Security => Self::Security,
            CategoryArg::Resilience => Self::Resilience,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_flags() {
            let cli = Cli::parse_from([
                "askprobe",
                "run",
                "--config",
                "suite.yaml",
                "--category",
                "security",
                "--category",
                "ui",
                "--filter",
                "xss",
                "--fail-fast",
                "--headless",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected run");
            };
            assert_eq!(args.source.config, Some(PathBuf::from("suite.yaml")));
            assert_eq!(args.select.categories, [CategoryArg::Security, CategoryArg::Ui]);
            assert_eq!(args.select.filter.as_deref(), Some("xss"));
            assert!(args.fail_fast);
            assert!(args.headless);
            assert!(!args.no_sandbox);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::parse_from(["askprobe", "list", "-vv", "--color", "never"]);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.color, ColorArg::Never);
            assert!(matches!(cli.command, Commands::List(_)));
        }

        #[test]
        fn test_unknown_category_rejected() {
            let parsed = Cli::try_parse_from(["askprobe", "run", "--category", "perf"]);
            assert!(parsed.is_err());
        }

        #[test]
        fn test_category_conversion() {
            assert_eq!(
                ScenarioCategory::from(CategoryArg::Resilience),
                ScenarioCategory::Resilience
            );
        }

        #[test]
        fn test_check_and_list_share_source_flags() {
            let cli = Cli::parse_from(["askprobe", "check", "--locators", "loc.json"]);
            let Commands::Check(args) = cli.command else {
                panic!("expected check");
            };
            assert_eq!(args.source.locators, Some(PathBuf::from("loc.json")));

            let cli = Cli::parse_from(["askprobe", "list", "--test-data", "data.json", "-f", "xss"]);
            let Commands::List(args) = cli.command else {
                panic!("expected list");
            };
            assert_eq!(args.source.test_data, Some(PathBuf::from("data.json")));
            assert_eq!(args.select.filter.as_deref(), Some("xss"));
        }

        #[test]
        fn test_flattened_args_keep_their_own_help() {
            use clap::CommandFactory;
            let mut command = Cli::command();
            let check = command.find_subcommand_mut("check").unwrap();
            let help = check.render_help().to_string();
            assert!(help.contains("Override the locator document path"));
            assert!(help.contains("Override the test-data document path"));
        }

        #[test]
        fn test_cli_definition_is_consistent() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }
    }
}
