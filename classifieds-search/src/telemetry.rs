//! Tracing initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::errors::ReconcileError;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "classifieds_search=info,classifieds_search_repository=info";

/// Initialize tracing/logging.
pub fn init_tracing(format: LogFormat) -> Result<(), ReconcileError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false),
            )
            .try_init(),
        LogFormat::Console => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .try_init(),
    };

    result.map_err(|e| ReconcileError::config(format!("Failed to initialize tracing: {}", e)))
}
