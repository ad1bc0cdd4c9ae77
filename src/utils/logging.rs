//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! Meant for hot paths such as the layout pass, which runs on every resize:
//! the calling module declares
//!
//! ```ignore
//! const ENABLE_LOGS: bool = false;
//! ```
//!
//! and flips it while debugging that module only.

/// Forwards to `log::log!` when the caller's `ENABLE_LOGS` is set.
#[macro_export]
macro_rules! log_gated {
    ($level:expr, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::log!($level, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::log_gated!(log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::log_gated!(log::Level::Info, $($arg)*)
    };
}
