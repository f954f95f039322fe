use bytes::Bytes;

use crate::{
    dispatch::{PacketHandler, RceFlags},
    frame::{Frame, RtcpFrame},
    rtcp::{
        RtcpPacket,
        common_header::{RTCP_HEADER_SIZE, RTCP_VERSION},
        packet_type::is_rtcp_packet_type,
    },
    rtp_error::Result,
};

/// Claims version 2 datagrams whose packet type is in the RTCP range and
/// decodes them as a compound packet.
#[derive(Debug, Default, Clone, Copy)]
pub struct RtcpHandler;

impl RtcpHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn accepts(dgram: &[u8]) -> bool {
        dgram.len() >= RTCP_HEADER_SIZE && dgram[0] >> 6 == RTCP_VERSION && is_rtcp_packet_type(dgram[1])
    }
}

impl PacketHandler for RtcpHandler {
    fn handle(&self, dgram: &Bytes, _flags: RceFlags) -> Result<Option<Frame>> {
        if !Self::accepts(dgram) {
            return Ok(None);
        }
        let packets = RtcpPacket::decode_compound(dgram)?;
        Ok(Some(Frame::Rtcp(RtcpFrame { packets })))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{
        frame::RtpHeader,
        rtcp::{RtcpError, bye::Bye, receiver_report::ReceiverReport},
        rtp_error::RtpError,
    };

    #[test]
    fn decodes_a_compound_datagram() {
        let wire = RtcpPacket::encode_compound(&[
            RtcpPacket::Rr(ReceiverReport::new(0x11, Vec::new())),
            RtcpPacket::Bye(Bye::single(0x11, Some("done".into()))),
        ])
        .unwrap();
        let frame = RtcpHandler
            .handle(&Bytes::from(wire), RceFlags::NONE)
            .unwrap()
            .unwrap();
        match frame {
            Frame::Rtcp(f) => {
                assert_eq!(f.packets.len(), 2);
                assert_eq!(f.packets[0].sender_ssrc(), Some(0x11));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn leaves_rtp_alone() {
        let mut out = Vec::new();
        RtpHeader::new(96, 1, 2, 3).encode_into(&mut out);
        assert!(RtcpHandler.handle(&Bytes::from(out), RceFlags::NONE).unwrap().is_none());
    }

    #[test]
    fn feedback_packets_are_a_parse_error() {
        // PSFB (206) PLI: header plus two SSRCs
        let pli = [0x81, 206, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2];
        assert!(matches!(
            RtcpHandler.handle(&Bytes::copy_from_slice(&pli), RceFlags::NONE),
            Err(RtpError::Rtcp(RtcpError::UnknownPacketType(206)))
        ));
    }
}
