//! Quiet-mode aware logging. When SCRIPTHEAL_QUIET=1 (batch jobs), suppress INFO.

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    scriptheal_core::config::ObservabilityConfig::from_env().quiet
}
