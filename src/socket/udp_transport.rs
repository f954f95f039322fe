use std::{
    io,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    sync::Arc,
    time::Duration,
};

use super::datagram_socket::DatagramSocket;
use crate::{log::LogSink, sink_debug, sink_warn};

/// Default bound on a blocking receive.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// UDP socket with a fixed peer.
///
/// Datagrams are accepted from any source; filtering by peer is the
/// handlers' business. `wake` sends an empty datagram to the socket's own
/// address so a blocked `recv` returns immediately.
pub struct UdpTransport {
    sock: UdpSocket,
    local: SocketAddr,
    peer: SocketAddr,
    logger: Arc<dyn LogSink>,
}

impl UdpTransport {
    pub fn bind(
        local: SocketAddr,
        peer: SocketAddr,
        read_timeout: Option<Duration>,
        logger: Arc<dyn LogSink>,
    ) -> io::Result<Self> {
        let sock = UdpSocket::bind(local)?;
        sock.set_read_timeout(read_timeout.filter(|d| !d.is_zero()))?;
        let local = sock.local_addr()?;
        sink_debug!(logger, "[UDP] bound {} -> peer {}", local, peer);
        Ok(Self {
            sock,
            local,
            peer,
            logger,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Own address, with an unspecified IP replaced by loopback.
    fn wake_addr(&self) -> SocketAddr {
        let ip = match self.local.ip() {
            IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        SocketAddr::new(ip, self.local.port())
    }
}

impl DatagramSocket for UdpTransport {
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.sock.recv_from(buf).map(|(n, _)| n)
    }

    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.sock.send_to(buf, self.peer)
    }

    fn wake(&self) {
        if let Err(e) = self.sock.send_to(&[], self.wake_addr()) {
            sink_warn!(self.logger, "[UDP] wake datagram failed: {}", e);
        }
    }
}
