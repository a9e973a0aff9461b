//! Logger bootstrap plus conditional logging macros.
//!
//! The macros check a module-level `ENABLE_LOGS` flag so a noisy module can be silenced
//! without touching the global filter:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("Started run {}", run_id);
//! ```

use log::LevelFilter;

const RUST_LOG: &str = "RUST_LOG";

/// Installs `env_logger` and caps output at `level`. `RUST_LOG` directives, when set, take
/// precedence. Repeated calls only move the cap.
///
/// Call this before anything that may warn, then narrow or widen with [`set_level`] once the
/// configured level is known.
pub fn init(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized; keeping existing configuration");
    }
    set_level(level);
}

/// Changes the global cap. No-op under `RUST_LOG`.
pub fn set_level(level: LevelFilter) {
    if std::env::var_os(RUST_LOG).is_none() {
        log::set_max_level(level);
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
