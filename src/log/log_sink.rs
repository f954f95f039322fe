use crate::log::log_level::LogLevel;

/// Destination for pipeline log lines. Implementations must never block the
/// receive or send threads for long.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
