//! Diagnostic logging setup using `tracing-subscriber`.
//!
//! Library events go to stderr so stdout stays clean for `list --json`.
//! `RUST_LOG` wins over the level derived from `-v`/`-q`.

use crate::commands::LogFormat;
use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity level
#[must_use]
pub const fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "askprobe=info,warn",
        Verbosity::Debug => "askprobe=debug,info",
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbosity: Verbosity, format: LogFormat, use_color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_debug());

    let installed = match format {
        LogFormat::Pretty => builder.with_ansi(use_color).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}
