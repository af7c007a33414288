//! Standardized emoji logging for backtest runs
//!
//! Provides consistent emoji usage across the driver, price-path loaders
//! and reporting so run milestones stand out in mixed log output.

/// Standard emoji set for backtest logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Run or export completed
    pub const ERROR: &'static str = "❌"; // Run aborted
    pub const WARNING: &'static str = "⚠️"; // Suspicious input

    // Module-specific
    pub const CHART: &'static str = "📊"; // Summary statistics
    pub const EXECUTE: &'static str = "⚡"; // Run start
    pub const DATA: &'static str = "📈"; // Price path loaded or generated
    pub const HALT: &'static str = "🛑"; // Dynamic pool rejected a swap
}

// Convenience macros for standardized logging
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::WARNING, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_metrics {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_execution {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::EXECUTE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_data {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::DATA, format!($($arg)*))
    };
}

/// Halts happen every step during a dislocation, so they log at debug
#[macro_export]
macro_rules! log_halt {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::HALT, format!($($arg)*))
    };
}
