//! Tracing subscriber bootstrap for binaries and test runs

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Level defaults to `info` and is overridable via `RUST_LOG`. Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
