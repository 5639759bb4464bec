//! This module provides observability and diagnostics for the encoder.
//!
//! An encoder that picks its own chains needs visibility into its decisions.
//! The `log_metric!` macro emits one structured `key=value` record per
//! decision through the `log` facade at debug level, so it costs a level check
//! when logging is off. `enable_verbose_logging` installs an `env_logger`
//! backend for callers that do not configure one themselves.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

/// Logs a structured key-value metric record at debug level.
///
/// # Example
/// ```
/// use bincif::log_metric;
/// let rows = 42;
/// log_metric!("event" = "write_category", "category" = "atom_site", "rows" = rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts: Vec<String> = Vec::new();
            $(
                parts.push(format!("{}={}", $key, $value));
            )+
            $crate::__log::debug!("BINCIF_METRIC: {}", parts.join(" "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend at `Debug` level.
///
/// When `log_file` is given, records are appended to it instead of stderr. If
/// the file cannot be opened the logger falls back to stderr. Later calls are
/// no-ops, as is the first call when another logger is already installed.
pub fn enable_verbose_logging(log_file: Option<&Path>) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Debug);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });

        if let Some(path) = log_file {
            match OpenOptions::new().append(true).create(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(err) => {
                    eprintln!("bincif: cannot open log file {}: {}", path.display(), err);
                }
            }
        }

        let _ = builder.try_init();
    });
}
