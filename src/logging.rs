//! Structured logging setup.
//!
//! The crate instruments its pipeline with `tracing`; this module offers a
//! small configuration surface for applications that do not assemble their
//! own subscriber. Honors `RUST_LOG` when set.

use tracing::Level;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Most detailed debugging information.
    Trace,
    /// Detailed debugging information.
    Debug,
    /// Important events.
    Info,
    /// Potential issues.
    Warn,
    /// Errors.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON output for production environments.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level applied to this crate's events.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Whether to show the event's target module.
    pub show_target: bool,
    /// Whether to show thread IDs.
    pub show_thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_target: true,
            show_thread_ids: false,
        }
    }
}

impl LogConfig {
    /// Configuration for development environments.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            show_target: true,
            show_thread_ids: false,
        }
    }

    /// Configuration for production environments.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_target: true,
            show_thread_ids: true,
        }
    }

    /// Configuration for test environments.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
        }
    }
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courier={}", config.level)))
}

fn fmt_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .boxed(),
    }
}

/// Initializes the logging system. Panics when a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(env_filter(config)))
        .init();
}

/// Initializes the logging system, ignoring duplicate initialization.
/// Suitable for tests, where multiple calls must not panic.
pub fn try_init_logging(config: &LogConfig) {
    let _ = tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(env_filter(config)))
        .try_init();
}
