use std::io;

/// Datagram transport the dispatchers run on.
///
/// `recv` blocks for at most the socket's read timeout and reports expiry as
/// `WouldBlock` or `TimedOut`. A zero-length read is a wake-up, not data.
pub trait DatagramSocket: Send + Sync {
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Sends one datagram to the configured peer.
    fn send(&self, buf: &[u8]) -> io::Result<usize>;

    /// Unblocks a thread parked in [`recv`](Self::recv).
    fn wake(&self) {}
}

/// Errors the receive loop retries instead of treating as fatal.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
