use crate::constants::env::LOG_LEVEL;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_LEVEL).unwrap_or_else(|_| "info".to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    /// Directive for `tracing_subscriber::EnvFilter` when `RUST_LOG` is unset.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Context-scoped logging handle. Every event goes through `tracing`, tagged
/// with the logger context and an optional JSON `meta` payload.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self { context }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&Value>) {
        let meta = meta
            .filter(|m| !m.is_null())
            .map(|m| m.to_string())
            .unwrap_or_default();
        let context = self.context.as_str();
        match level {
            LogLevel::Error => tracing::error!(context, meta = %meta, "{}", message),
            LogLevel::Warn => tracing::warn!(context, meta = %meta, "{}", message),
            LogLevel::Info => tracing::info!(context, meta = %meta, "{}", message),
            LogLevel::Debug => tracing::debug!(context, meta = %meta, "{}", message),
        }
    }

    pub fn error(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&Value>) {
        self.log(LogLevel::Debug, message, meta);
    }
}
