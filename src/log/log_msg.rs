use std::time::SystemTime;

use crate::log::log_level::LogLevel;

/// A single log event travelling from a [`LoggerHandle`](super::logger_handle::LoggerHandle)
/// to the logger worker.
#[derive(Debug, Clone)]
pub struct LogMsg {
    pub level: LogLevel,
    /// Milliseconds since the UNIX epoch.
    pub ts_ms: u128,
    pub text: String,
    /// Origin of the event, typically `module_path!()`.
    pub target: &'static str,
}

impl LogMsg {
    /// Creates a message stamped with the current time.
    pub fn new(level: LogLevel, text: impl Into<String>, target: &'static str) -> Self {
        Self {
            level,
            ts_ms: now_millis(),
            text: text.into(),
            target,
        }
    }

    /// Renders the line written to the log file.
    pub fn to_line(&self) -> String {
        format!("[{}] {} | {} | {}", self.level, self.ts_ms, self.target, self.text)
    }
}

pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
