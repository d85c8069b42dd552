//! Tracing setup.
//!
//! The filter comes from `RUST_LOG` when set, otherwise the given default directive.

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(default_directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .try_init();
}

/// Same as [`init_tracing`] but writes through the test harness so output is
/// captured per test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_initialisation_is_ignored() {
        init_test_tracing();
        init_tracing("info");
        init_tracing("warn");
        tracing::info!("still logging after repeated initialisation");
    }
}
