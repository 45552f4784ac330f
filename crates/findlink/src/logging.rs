//! Logging setup for the command line tool
//!
//! Logs go to stderr so stdout only carries results.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// Initialize the global tracing subscriber (fmt layer filtered by `RUST_LOG`)
pub fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    #[cfg(feature = "profiling")]
    tracing::info!("Logging initialized (profiling spans enabled)");
    #[cfg(not(feature = "profiling"))]
    tracing::debug!("Logging initialized");
}
