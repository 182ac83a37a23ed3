//! Small shared utilities.

pub mod ttl_cache;

pub use ttl_cache::{Clock, SystemClock, TtlCache};

/// Initialize logging for binaries and examples embedding this crate.
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
