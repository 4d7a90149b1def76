use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up tracing output for the engine: human-readable console lines
/// plus a daily-rotated JSON file under `logs/` for later inspection.
///
/// `RUST_LOG` overrides the default `provider_dq=info` filter.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("provider_dq=info"));

    let file_appender = tracing_appender::rolling::daily("logs", "provider_dq.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .init();

    // The appender guard must outlive the process or buffered lines are lost
    std::mem::forget(guard);
}
