use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::protocol::openai::Usage;

/// Map a configured level name to a tracing filter directive.
///
/// - "DISABLED" -> `None`
/// - "WARNING" -> WARN
/// - "CRITICAL" -> ERROR
/// - Others map directly (DEBUG, INFO, ERROR)
#[must_use]
pub fn filter_directive(log_level: &str) -> Option<String> {
    let level = log_level.to_uppercase();
    match level.as_str() {
        "DISABLED" => None,
        "WARNING" => Some("WARN".to_string()),
        "CRITICAL" => Some("ERROR".to_string()),
        _ => Some(level),
    }
}

/// Install the global tracing subscriber.
///
/// Unknown levels fall back to INFO. When a subscriber is already installed
/// (tests, embedding applications) the call is a no-op.
pub fn init_tracing(log_level: &str, json: bool) {
    let Some(directive) = filter_directive(log_level) else {
        return;
    };
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("INFO"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log the token usage of a completed (or aggregated) response at INFO level.
pub fn log_usage(model: &str, usage: &Usage) {
    info!(
        model = model,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        cached_tokens = usage.cached_tokens(),
        reasoning_tokens = usage.reasoning_tokens(),
        "response usage"
    );
}
