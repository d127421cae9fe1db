//! Telemetry helpers for hosts embedding `landing-rs`.
//!
//! Every component logs through `tracing`; installing a subscriber stays the
//! host's decision. Call `init_default_tracing` for a sensible default or
//! wire your own subscriber and filters.

/// Initializes a default `tracing` subscriber when the `telemetry` feature is enabled.
///
/// The filter is read from `RUST_LOG` and falls back to `info`.
/// Returns `false` when no initialization is performed (feature disabled) or if a
/// global subscriber was already set by the host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "telemetry"))]
    #[test]
    fn without_the_feature_nothing_is_installed() {
        assert!(!init_default_tracing());
        assert!(!init_default_tracing());
    }

    #[cfg(feature = "telemetry")]
    #[test]
    fn second_initialization_is_refused() {
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
