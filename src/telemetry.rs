//! Opt-in tracing setup for hosts embedding `incidence-rs`.
//!
//! Aggregation and chart building only emit `tracing` events; nothing is
//! printed unless a subscriber is installed, either by the host or here.

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG` (default `warn`,
/// so dropped observations and color fallbacks are visible).
///
/// Returns `false` when the `telemetry` feature is off or a global subscriber
/// is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
