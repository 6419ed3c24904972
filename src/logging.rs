//! Tracing subscriber setup.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the log level (`DEBUG`, `INFO`, `WARNING`, ...).
pub const LOG_LEVEL_VAR: &str = "CAO_LOG_LEVEL";
/// Environment variable that turns on debug logging when set to `1`.
pub const DEBUG_MODE_VAR: &str = "CAO_DEBUG_MODE";

/// Map a level name to a filter. `WARNING` and `CRITICAL` are accepted as
/// aliases for `warn` and `error`.
pub fn level_from_name(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Some(LevelFilter::TRACE),
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" | "WARNING" => Some(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Some(LevelFilter::ERROR),
        "OFF" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Decide the level from the `--debug` flag and the two environment variables.
pub fn resolve_level(debug: bool, log_level: Option<&str>, debug_mode: Option<&str>) -> LevelFilter {
    if debug || debug_mode == Some("1") {
        return LevelFilter::DEBUG;
    }
    log_level
        .and_then(level_from_name)
        .unwrap_or(LevelFilter::INFO)
}

/// Install the global subscriber. `RUST_LOG`, when set, takes precedence.
pub fn init(debug: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => {
            let level = resolve_level(
                debug,
                std::env::var(LOG_LEVEL_VAR).ok().as_deref(),
                std::env::var(DEBUG_MODE_VAR).ok().as_deref(),
            );
            EnvFilter::default().add_directive(level.into())
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
