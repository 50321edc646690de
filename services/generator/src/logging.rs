//! Standardized emoji logging for the callgate CLI

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Standard emoji set for generator logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅";
    pub const ERROR: &'static str = "❌";
    pub const WARNING: &'static str = "⚠️";

    // Pipeline stages
    pub const GENERATE: &'static str = "🛠️";
    pub const CHECK: &'static str = "🔍";
    pub const WRITE: &'static str = "📝";
    pub const NETWORK: &'static str = "🌐";
}

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
macro_rules! log_generate {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::GENERATE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_check {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHECK, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_write {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::WRITE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_network {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::NETWORK, format!($($arg)*))
    };
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
pub fn init(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
