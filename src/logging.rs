//! File-based logging for MedMusic
//!
//! Tracing output goes to a file instead of stdout, since the TUI occupies
//! the terminal.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "medmusic";
const DEFAULT_FILTER: &str = "medmusic=debug,librespot=info,warn";

/// Initialize the logging system.
///
/// Logs are written to `.logs/medmusic.YYYY-MM-DD.log` with daily rotation.
/// The log level can be controlled via the `RUST_LOG` environment variable.
///
/// Default log levels:
/// - `medmusic` modules: DEBUG
/// - `librespot`: INFO
/// - Other crates: WARN
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);

    // Non-blocking so log writes never stall the async runtime
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; it has to live as long as the process
    Box::leak(Box::new(guard));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(())
}

/// HTTP status carried by a failed request, if the failure came from one
pub fn error_status(error: &anyhow::Error) -> Option<u16> {
    error
        .downcast_ref::<reqwest::Error>()
        .and_then(reqwest::Error::status)
        .map(|status| status.as_u16())
}

/// Log the outcome of an API request
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(
                operation = $operation,
                status = ?$crate::logging::error_status(e),
                error = %e,
                "API request failed"
            ),
        }
    };
}

/// Log an API request before it is sent
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr) => {
        tracing::debug!(operation = $operation, "API request started");
    };
    ($operation:expr, $($field:tt)+) => {
        tracing::debug!(operation = $operation, $($field)+, "API request started");
    };
}
