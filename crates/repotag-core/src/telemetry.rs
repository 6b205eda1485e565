//! Tracing setup for the repotag CLI.
//!
//! Logs go to stderr; stdout carries classification JSON, markdown and usage
//! reports. The filter comes from `REPOTAG_LOG`, then `RUST_LOG`, and otherwise
//! shows repotag's own events at the requested level while dependencies stay
//! at `warn`. Closing the `repotag.classification` span logs how long the run
//! took, and JSON lines carry the span's `run_id`.

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "REPOTAG_LOG";

/// Crates whose events follow the requested level.
const REPOTAG_TARGETS: [&str; 2] = ["repotag_core", "repotag"];

/// Filter directives used when neither log variable is set.
pub fn default_directives(level: Level) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        REPOTAG_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.as_str().to_lowercase())),
    );
    directives.join(",")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber. Only the first call in a process takes effect.
///
/// * `json`: newline-delimited JSON instead of plain text.
/// * `level`: verbosity for repotag's own targets when no log variable is set.
pub fn init_tracing(json: bool, level: Level) {
    let registry = tracing_subscriber::registry().with(env_filter(level));
    let layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    if json {
        registry
            .with(layer.json().with_current_span(true).with_span_list(false))
            .try_init()
            .ok();
    } else {
        registry.with(layer).try_init().ok();
    }
}
