use std::{
    io,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    time::Duration,
};

use super::datagram_socket::DatagramSocket;

/// In-memory datagram socket, one end of a [`MemSocket::pair`].
///
/// Used for tests and same-process pipelines. Supports injecting datagrams,
/// forcing send failures and closing the receive side, which surfaces as a
/// fatal `NotConnected` error on the next `recv`.
pub struct MemSocket {
    peer_tx: Sender<Vec<u8>>,
    self_tx: Sender<Vec<u8>>,
    rx: Mutex<Receiver<Vec<u8>>>,
    read_timeout: Duration,
    closed: AtomicBool,
    fail_sends: AtomicBool,
    sent: AtomicUsize,
}

impl MemSocket {
    /// Two connected ends: what one sends, the other receives.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_timeout(Duration::from_millis(100))
    }

    pub fn pair_with_timeout(read_timeout: Duration) -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel();
        let (b_tx, b_rx) = mpsc::channel();
        let a = Self::end(b_tx.clone(), a_tx.clone(), a_rx, read_timeout);
        let b = Self::end(a_tx, b_tx, b_rx, read_timeout);
        (a, b)
    }

    fn end(
        peer_tx: Sender<Vec<u8>>,
        self_tx: Sender<Vec<u8>>,
        rx: Receiver<Vec<u8>>,
        read_timeout: Duration,
    ) -> Self {
        Self {
            peer_tx,
            self_tx,
            rx: Mutex::new(rx),
            read_timeout,
            closed: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            sent: AtomicUsize::new(0),
        }
    }

    /// Queues `dgram` as if it had arrived from the network.
    pub fn inject(&self, dgram: &[u8]) {
        let _ = self.self_tx.send(dgram.to_vec());
    }

    /// Makes every later `recv` fail with `NotConnected`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.wake();
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Datagrams successfully sent so far.
    pub fn send_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    fn closed_error() -> io::Error {
        io::Error::new(io::ErrorKind::NotConnected, "memory socket closed")
    }
}

impl DatagramSocket for MemSocket {
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Self::closed_error());
        }
        let rx = self.rx.lock().unwrap_or_else(|p| p.into_inner());
        match rx.recv_timeout(self.read_timeout) {
            Ok(dgram) => {
                if self.closed.load(Ordering::SeqCst) {
                    return Err(Self::closed_error());
                }
                let n = dgram.len().min(buf.len());
                buf[..n].copy_from_slice(&dgram[..n]);
                Ok(n)
            }
            Err(RecvTimeoutError::Timeout) => Err(io::ErrorKind::WouldBlock.into()),
            Err(RecvTimeoutError::Disconnected) => Err(Self::closed_error()),
        }
    }

    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "send failure injected"));
        }
        self.peer_tx
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer dropped"))?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(buf.len())
    }

    fn wake(&self) {
        let _ = self.self_tx.send(Vec::new());
    }
}
