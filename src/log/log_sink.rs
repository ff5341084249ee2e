use crate::log::log_level::LogLevel;

/// Destination for log lines emitted by the codec front ends.
///
/// Implementations must not block: the receive path calls `log` inline for
/// every dropped block.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}

/// Discards everything.
#[derive(Debug, Clone, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    #[inline]
    fn log(&self, _level: LogLevel, _msg: &str, _target: &'static str) {}
}
