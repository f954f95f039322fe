use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the receive loop.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    received: AtomicU64,
    delivered: AtomicU64,
    parse_failures: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`DispatcherStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatcherCounters {
    pub received: u64,
    pub delivered: u64,
    pub parse_failures: u64,
    /// Datagrams no primary handler claimed.
    pub dropped: u64,
}

impl DispatcherStats {
    pub(crate) fn on_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatcherCounters {
        DispatcherCounters {
            received: self.received.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
