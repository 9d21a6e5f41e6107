//! Telemetry helpers for hosts embedding `chart-overlay`.
//!
//! The engine only emits `tracing` events (dropped candles, skipped pattern
//! elements, length mismatches, missing marker capability). Installing a
//! subscriber is left to the host; this helper is the opt-in shortcut.

/// Installs a compact `tracing` subscriber when the `telemetry` feature is enabled.
///
/// The filter is read from `RUST_LOG` and defaults to `info`, which keeps the
/// per-series `trace!` events of a render pass out of the output.
///
/// Returns `false` when the feature is disabled or a global subscriber was
/// already installed by the host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
