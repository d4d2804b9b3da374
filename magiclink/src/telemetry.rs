//! Structured logging setup.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global JSON subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Fails instead of
/// panicking when a global subscriber is already set.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("tracing_initialized");
    Ok(())
}
