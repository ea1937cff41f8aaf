//! This module provides observability hooks for the codec.
//!
//! The codec itself never logs the errors it returns; it only emits structured
//! diagnostics about what it decoded, encoded and pooled. The `log_metric!` macro
//! is the primary tool, and `enable_verbose_logging` installs a backend for
//! binaries and tests that want to see those lines.

use log::LevelFilter;
use std::sync::Once;

/// Logs a structured key-value metric line at debug level.
///
/// # Example
/// ```
/// use vecframe::log_metric;
/// let length = 4;
/// log_metric!("event"="decode_vector", "dtype"="i32", "length"=&length);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(target: "vecframe::metrics", log::Level::Debug) {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            log::debug!(target: "vecframe::metrics", "VECFRAME_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend at the given level. Only the first call has
/// any effect; later calls (and an already-installed logger) are ignored.
pub fn enable_verbose_logging(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(cfg!(test));
        builder.filter_level(level);

        // Custom formatter: just print the level, target and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        });

        let _ = builder.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        enable_verbose_logging(LevelFilter::Debug);
        enable_verbose_logging(LevelFilter::Trace);
        log_metric!("event" = "test", "count" = 3);
    }
}
