//! Diagnostic logging via tracing
//!
//! Silent unless RUST_LOG is set, so log lines never tangle with the
//! interactive prompts on stderr.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber. Safe to call once at startup.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
