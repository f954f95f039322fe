use byteorder::{BigEndian, ByteOrder};

use super::rtcp_error::RtcpError;

pub const SENDER_INFO_SIZE: usize = 20;

/// Sender info in an SR.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SenderInfo {
    pub ntp_msw: u32,
    pub ntp_lsw: u32,
    pub rtp_ts: u32,
    pub packet_count: u32,
    pub octet_count: u32,
}

impl SenderInfo {
    pub fn decode(buf: &[u8]) -> Result<Self, RtcpError> {
        if buf.len() < SENDER_INFO_SIZE {
            return Err(RtcpError::TooShort);
        }
        let mut words = [0u32; 5];
        BigEndian::read_u32_into(&buf[..SENDER_INFO_SIZE], &mut words);
        let [ntp_msw, ntp_lsw, rtp_ts, packet_count, octet_count] = words;
        Ok(Self {
            ntp_msw,
            ntp_lsw,
            rtp_ts,
            packet_count,
            octet_count,
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let mut b = [0u8; SENDER_INFO_SIZE];
        BigEndian::write_u32_into(
            &[
                self.ntp_msw,
                self.ntp_lsw,
                self.rtp_ts,
                self.packet_count,
                self.octet_count,
            ],
            &mut b,
        );
        out.extend_from_slice(&b);
    }
}
