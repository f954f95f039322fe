//! RTCP codec (RFC 3550 §6): SR, RR, SDES, BYE, APP and compound packets.

pub mod app;
pub mod bye;
pub mod common_header;
pub mod packet_type;
pub mod receiver_report;
pub mod report_block;
pub mod rtcp_error;
pub mod rtcp_packet;
pub mod sdes;
pub mod sender_info;
pub mod sender_report;

pub use rtcp_error::RtcpError;
pub use rtcp_packet::RtcpPacket;
