//! Logging setup for the cctally CLI.

use tracing_subscriber::EnvFilter;

/// Initialize console logging to stderr - the dashboard owns stdout, so
/// diagnostics (malformed records, stream failures, completion stats) must
/// stay on the other stream. Defaults to WARN; `RUST_LOG` overrides.
pub fn init() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
    .with_writer(std::io::stderr)
    .init();
}
