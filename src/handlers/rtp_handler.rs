use bytes::Bytes;

use crate::{
    dispatch::{PacketHandler, RceFlags},
    frame::{Frame, RTP_HEADER_SIZE, RtpFrame, rtp_header::RTP_VERSION},
    rtcp::packet_type::is_rtcp_packet_type,
    rtp_error::Result,
};

/// Claims RTP version 2 datagrams that are not RTCP.
///
/// The frame payload is a zero-copy slice of the datagram. Under
/// [`RceFlags::SRTP`] padding is left in the payload because its count byte
/// is still encrypted.
#[derive(Debug, Default, Clone, Copy)]
pub struct RtpHandler;

impl RtpHandler {
    pub fn new() -> Self {
        Self
    }

    /// Demultiplexing test only. Does not validate the rest of the header.
    pub fn accepts(dgram: &[u8]) -> bool {
        dgram.len() >= RTP_HEADER_SIZE
            && dgram[0] >> 6 == RTP_VERSION
            && !is_rtcp_packet_type(dgram[1])
    }
}

impl PacketHandler for RtpHandler {
    fn handle(&self, dgram: &Bytes, flags: RceFlags) -> Result<Option<Frame>> {
        if !Self::accepts(dgram) {
            return Ok(None);
        }
        let keep_padding = flags.contains(RceFlags::SRTP);
        let frame = RtpFrame::parse(dgram.clone(), keep_padding)?;
        Ok(Some(Frame::Rtp(frame)))
    }
}
