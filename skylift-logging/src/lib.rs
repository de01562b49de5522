//! Tracing subscriber setup for the Skylift CLI.
//!
//! Controlled through environment variables:
//! - `LOG_LEVEL`: default level when `RUST_LOG` is unset (default `info`)
//! - `LOG_FORMAT`: `human` (default) or `json`
//! - `LOG_FILE`: when set, log to this file instead of stderr

use std::env;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber from environment variables.
///
/// Returns a guard that must be kept alive for the lifetime of the process
/// when file logging is active, so buffered lines are flushed on exit.
pub fn init_subscriber() -> Option<WorkerGuard> {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "human".to_string());
    let log_file = env::var("LOG_FILE").ok();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    let is_json = log_format == "json";

    match log_file {
        Some(path) => {
            let path = Path::new(&path);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let filename = path.file_name().unwrap_or_else(|| "skylift.log".as_ref());
            let appender = tracing_appender::rolling::never(dir, filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let builder = fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false);
            if is_json {
                builder.json().init();
            } else {
                builder.init();
            }
            Some(guard)
        }
        None => {
            let builder = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);
            if is_json {
                builder.json().init();
            } else {
                builder.init();
            }
            None
        }
    }
}
