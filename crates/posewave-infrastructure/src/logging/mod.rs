//! Logging bootstrap.
//!
//! - Structured one-line JSON to a daily-rotated file (always)
//! - Human-readable colored output on stdout (debug builds)
//! - `log` macros from every crate forwarded into `tracing`

use std::path::PathBuf;
use std::sync::OnceLock;

use log::LevelFilter;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the logging system. Safe to call more than once; only the
/// first call installs anything.
pub fn init_logger(log_dir: PathBuf) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;

    // Forward log-crate records into tracing
    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(&log_dir, "posewave.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%dT%H:%M:%S%.3f%:z".to_string(),
        ))
        .with_filter(env_filter());

    let stdout_layer = if cfg!(debug_assertions) {
        Some(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                ))
                .with_filter(env_filter()),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stdout_layer)
        .init();

    let _ = LOGGER_READY.set(());
    tracing::info!("Logging initialized, files under {}", log_dir.display());
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
