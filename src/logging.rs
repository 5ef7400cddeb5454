//! Logging initialization.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` globally and `debug` for this crate.
///
/// # Example
/// ```ignore
/// rustle3d::logging::init_logging();
/// tracing::info!("renderer up");
/// ```
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rustle3d=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
