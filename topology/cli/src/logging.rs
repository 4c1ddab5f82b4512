use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::LogFormat;

/// Installs the global subscriber, logging to stderr so stdout only carries command output.
pub(super) fn init_tracing_registry(log_level: Option<&str>, format: LogFormat) {
    let filter = match log_level {
        Some(level) => EnvFilter::builder().parse_lossy(level),
        None => EnvFilter::from_default_env(),
    };

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
