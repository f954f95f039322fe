use crate::log::log_level::LogLevel;

/// A single log line travelling from a producer thread to the logger worker.
#[derive(Debug, Clone)]
pub struct LogMsg {
    pub level: LogLevel,
    /// Milliseconds since the UNIX epoch.
    pub ts_ms: u128,
    pub text: String,
    /// Module path of the producer.
    pub target: &'static str,
}

impl LogMsg {
    pub fn new(
        level: LogLevel,
        text: impl Into<String>,
        target: &'static str,
        ts_ms: u128,
    ) -> Self {
        Self {
            level,
            ts_ms,
            text: text.into(),
            target,
        }
    }
}
