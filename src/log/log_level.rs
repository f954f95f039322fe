/// Defines the severity levels for log messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Per-packet detail (chunk stamping, handler decisions).
    Trace,
    /// Dropped or corrupted datagrams and other recoverable oddities.
    Debug,
    /// Lifecycle: dispatcher start/stop, worker spawn/join.
    Info,
    /// Recoverable failures such as SRTP authentication errors.
    Warn,
    /// Socket failures that end a worker.
    Error,
}
