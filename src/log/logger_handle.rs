use std::{
    sync::mpsc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::log::{log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink};

/// Lightweight, cloneable handle to the process logger.
///
/// `LoggerHandle` enqueues `LogMsg` into a bounded `SyncSender`. Calls to
/// [`try_log`](Self::try_log) never block: when the queue is full the message
/// is dropped and an error is returned. The receive dispatcher relies on this,
/// a slow disk must not stall packet reception.
#[derive(Clone)]
pub struct LoggerHandle {
    pub(super) tx: mpsc::SyncSender<LogMsg>,
}

impl LogSink for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        let _ = self.try_log(level, msg, target);
    }
}

impl LoggerHandle {
    /// Attempts to enqueue a log message without blocking.
    ///
    /// # Errors
    /// - `TrySendError::Full` when the bounded queue is at capacity.
    /// - `TrySendError::Disconnected` when the logger worker is gone.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), mpsc::TrySendError<LogMsg>> {
        self.tx
            .try_send(LogMsg::new(level, text, target, now_millis()))
    }
}

pub(crate) fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::sync::mpsc::{TrySendError, sync_channel};

    #[test]
    fn try_log_ok_when_capacity_available() {
        let (tx, rx) = sync_channel::<LogMsg>(2);
        let h = LoggerHandle { tx };

        h.try_log(LogLevel::Info, "dispatcher started", "test::target")
            .expect("queue has room");

        let msg = rx.recv().expect("a message should arrive");
        assert_eq!(msg.level, LogLevel::Info);
        assert_eq!(msg.text, "dispatcher started");
        assert_eq!(msg.target, "test::target");
        assert!(msg.ts_ms > 0, "timestamp should be non-zero");
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (tx, _rx) = sync_channel::<LogMsg>(1);
        let h = LoggerHandle { tx };

        h.try_log(LogLevel::Debug, "first", "t").expect("first fits");
        match h.try_log(LogLevel::Debug, "second", "t") {
            Err(TrySendError::Full(m)) => assert_eq!(m.text, "second"),
            other => panic!("expected Full, got: {other:?}"),
        }
        // The LogSink path swallows the error.
        h.log(LogLevel::Error, "third", "t");
    }

    #[test]
    fn disconnected_when_worker_gone() {
        let (tx, rx) = sync_channel::<LogMsg>(1);
        drop(rx);
        let h = LoggerHandle { tx };

        assert!(matches!(
            h.try_log(LogLevel::Error, "won't send", "t"),
            Err(TrySendError::Disconnected(_))
        ));
    }
}
