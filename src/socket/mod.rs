//! Datagram socket collaborators.

pub mod datagram_socket;
pub mod mem_socket;
pub mod udp_transport;

pub use datagram_socket::DatagramSocket;
pub use mem_socket::MemSocket;
pub use udp_transport::UdpTransport;
