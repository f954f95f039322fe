use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the send path, synchronous or worker.
#[derive(Debug, Default)]
pub struct SendStats {
    frames_sent: AtomicU64,
    packets_sent: AtomicU64,
    bytes_sent: AtomicU64,
    send_failures: AtomicU64,
}

/// Point-in-time copy of [`SendStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendCounters {
    pub frames_sent: u64,
    pub packets_sent: u64,
    /// Datagram bytes handed to the socket, headers and SRTP tag included.
    pub bytes_sent: u64,
    /// Frames whose transmission stopped at a socket error.
    pub send_failures: u64,
}

impl SendStats {
    pub(crate) fn on_packet(&self, wire_len: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(wire_len as u64, Ordering::Relaxed);
    }

    pub(crate) fn on_frame(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SendCounters {
        SendCounters {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}
