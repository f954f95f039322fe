use byteorder::{BigEndian, ByteOrder};

use super::{
    common_header::{CommonHeader, finish_packet},
    packet_type::{PT_APP, RtcpPacketType},
    rtcp_error::RtcpError,
    rtcp_packet::RtcpPacket,
};

/// Application-defined packet. `data` is padded to a word boundary on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub subtype: u8,
    pub name: [u8; 4],
    pub ssrc: u32,
    pub data: Vec<u8>,
}

impl RtcpPacketType for App {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        let start = out.len();
        CommonHeader::new(self.subtype, PT_APP, false).encode_into(out);
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        out.extend_from_slice(&self.name);
        out.extend_from_slice(&self.data);
        finish_packet(out, start)
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        if payload.len() < 8 {
            return Err(RtcpError::TooShort);
        }
        let mut name = [0u8; 4];
        name.copy_from_slice(&payload[4..8]);
        Ok(RtcpPacket::App(App {
            subtype: hdr.rc_or_fmt(),
            name,
            ssrc: BigEndian::read_u32(&payload[0..4]),
            data: payload[8..].to_vec(),
        }))
    }
}
