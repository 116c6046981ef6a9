//! Process-wide tracing/logging setup.
//!
//! The auth pipeline leans on structured fields (`user_id`, `role`,
//! `required_permission`) rather than message text; JSON output keeps those
//! queryable. Filtering comes from `RUST_LOG`, defaulting to `info`.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops), which also
/// makes it usable from tests that spin up the full app.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
