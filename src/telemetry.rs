//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Output is compact
//! text by default or JSON lines when requested.

use crate::config::LoggingSection;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {cause}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser failure.
        cause: tracing_subscriber::filter::ParseError,
    },
}

/// Installs the global subscriber described by `logging`.
///
/// Returns `false` when a subscriber was already installed, which leaves the
/// existing one in place.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when `RUST_LOG` is unset and
/// the configured level cannot be parsed.
pub fn init_tracing(logging: &LoggingSection) -> Result<bool, TelemetryError> {
    let filter = build_filter(&logging.level)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = if logging.json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(false)).try_init()
    };
    Ok(installed.is_ok())
}

fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level).map_err(|cause| TelemetryError::InvalidFilter {
            directive: level.to_owned(),
            cause,
        })
    })
}
