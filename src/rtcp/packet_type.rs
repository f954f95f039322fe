use super::{common_header::CommonHeader, rtcp_error::RtcpError, rtcp_packet::RtcpPacket};

// RTCP packet types (RFC 3550 §12.1)
pub const PT_SR: u8 = 200;
pub const PT_RR: u8 = 201;
pub const PT_SDES: u8 = 202;
pub const PT_BYE: u8 = 203;
pub const PT_APP: u8 = 204;
// Feedback types (RFC 4585). Recognized as RTCP but not decoded.
pub const PT_RTPFB: u8 = 205;
pub const PT_PSFB: u8 = 206;

/// True when `pt` falls in the range RTP demultiplexing reserves for RTCP.
#[inline]
pub fn is_rtcp_packet_type(pt: u8) -> bool {
    (PT_SR..=PT_PSFB).contains(&pt)
}

pub trait RtcpPacketType {
    /// Encodes the complete packet, common header included.
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError>;

    /// Decodes the body that follows `hdr`.
    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError>;
}
