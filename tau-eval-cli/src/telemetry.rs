//! Logging initialization

use anyhow::{Context, Result};
use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize console logging on stderr.
///
/// An explicit `level` wins over `RUST_LOG`; without either the filter is `info`.
/// Only the first call installs a subscriber.
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log filter '{}'", directives))?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .context("Failed to create env filter")?,
    };

    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init();
    });

    Ok(())
}
