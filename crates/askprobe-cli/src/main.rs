//! askprobe CLI: run end-to-end probes against the chat widget
//!
//! ## Usage
//!
//! ```bash
//! askprobe check --config suite.yaml          # Validate configuration offline
//! askprobe list --category security           # Show selected scenarios
//! askprobe run --config suite.yaml --headless # Run everything
//! askprobe run --filter xss --fail-fast       # Stop at the first failure
//! ```

use askprobe_cli::{
    handlers, init_logging, CheckArgs, Cli, CliConfig, CliError, CliResult, Commands, ListArgs,
    RunArgs, Verbosity,
};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into());
    console::set_colors_enabled_stderr(config.use_color());
    init_logging(config.verbosity, cli.log_format, config.use_color());

    match cli.command {
        Commands::Run(args) => run_suite(&config, &args),
        Commands::List(args) => run_list(&args),
        Commands::Check(args) => run_check(&args),
    }
}

fn run_suite(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let report = handlers::run(config, args)?;
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::SuiteFailed {
            failed: report.failed(),
            skipped: report.skipped,
        })
    }
}

fn run_list(args: &ListArgs) -> CliResult<()> {
    let scenarios = handlers::list(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&scenarios)?);
    } else {
        for scenario in &scenarios {
            println!("{:<10} {}", scenario.category.as_str(), scenario.name);
        }
    }
    Ok(())
}

fn run_check(args: &CheckArgs) -> CliResult<()> {
    let summary = handlers::check(args)?;
    println!(
        "OK: {} locators, {} scenarios",
        summary.locators, summary.scenarios
    );
    Ok(())
}
