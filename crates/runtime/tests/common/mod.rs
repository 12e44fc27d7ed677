//! Shared helpers for the integration tests

use std::sync::Once;

static TRACING: Once = Once::new();

/// Route runtime events to the test output
///
/// Filtered by `RUST_LOG`, e.g. `RUST_LOG=pcc_runtime=trace cargo test`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
