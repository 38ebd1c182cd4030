//! Logging infrastructure for plancost.
//!
//! Structured logging using the `tracing` ecosystem. Recoverable catalog
//! outcomes (no match, ambiguous match) are reported as warnings here rather
//! than surfaced as errors.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.plancost/logs/plancost.log`
//! - Console output with configurable verbosity
//!
//! ## Example
//!
//! ```no_run
//! use plancost_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("estimation started");
//! tracing::debug!(address = "aws_instance.web", "building resource");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{PlancostError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the plancost logging system.
///
/// This sets up:
/// - File logging to `~/.plancost/logs/plancost.log` (JSON lines format)
/// - Console logging to stderr (human-readable format)
///
/// `verbose` switches the default level from INFO to DEBUG. `RUST_LOG`
/// overrides both.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| PlancostError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "plancost.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plancost={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the plancost home directory.
///
/// Returns `~/.plancost/`
pub fn plancost_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| PlancostError::Internal {
        message: "HOME environment variable not set".into(),
    })?;

    Ok(PathBuf::from(home).join(".plancost"))
}

/// Get the default log directory path.
///
/// Returns `~/.plancost/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(plancost_home()?.join("logs"))
}

/// Log a recoverable catalog outcome for a price component.
///
/// # Example
///
/// ```ignore
/// log_price_warning!("aws_instance.web", "Instance hours (t3.micro)", matches = 0, "no products found");
/// ```
#[macro_export]
macro_rules! log_price_warning {
    ($address:expr, $component:expr, $($field:tt)*) => {
        tracing::warn!(
            target: "plancost::pricing",
            address = $address,
            component = $component,
            $($field)*
        )
    };
}
