use byteorder::{BigEndian, ByteOrder};

use super::rtcp_error::RtcpError;

pub const REPORT_BLOCK_SIZE: usize = 24;

/// Reception report block (RFC 3550 §6.4.1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportBlock {
    pub ssrc: u32,
    pub fraction_lost: u8,
    /// 24-bit signed on the wire.
    pub cumulative_lost: i32,
    pub highest_seq_no_received: u32, // extended
    pub interarrival_jitter: u32,
    pub lsr: u32,
    pub dlsr: u32,
}

impl ReportBlock {
    pub fn decode(buf: &[u8]) -> Result<Self, RtcpError> {
        if buf.len() < REPORT_BLOCK_SIZE {
            return Err(RtcpError::Truncated);
        }
        Ok(Self {
            ssrc: BigEndian::read_u32(&buf[0..4]),
            fraction_lost: buf[4],
            cumulative_lost: BigEndian::read_i24(&buf[5..8]),
            highest_seq_no_received: BigEndian::read_u32(&buf[8..12]),
            interarrival_jitter: BigEndian::read_u32(&buf[12..16]),
            lsr: BigEndian::read_u32(&buf[16..20]),
            dlsr: BigEndian::read_u32(&buf[20..24]),
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let mut b = [0u8; REPORT_BLOCK_SIZE];
        BigEndian::write_u32(&mut b[0..4], self.ssrc);
        b[4] = self.fraction_lost;
        BigEndian::write_i24(
            &mut b[5..8],
            self.cumulative_lost.clamp(-8_388_608, 8_388_607),
        );
        BigEndian::write_u32(&mut b[8..12], self.highest_seq_no_received);
        BigEndian::write_u32(&mut b[12..16], self.interarrival_jitter);
        BigEndian::write_u32(&mut b[16..20], self.lsr);
        BigEndian::write_u32(&mut b[20..24], self.dlsr);
        out.extend_from_slice(&b);
    }

    /// Decodes `count` consecutive blocks.
    pub(crate) fn decode_many(buf: &[u8], count: usize) -> Result<Vec<Self>, RtcpError> {
        if buf.len() < count * REPORT_BLOCK_SIZE {
            return Err(RtcpError::Truncated);
        }
        buf.chunks_exact(REPORT_BLOCK_SIZE)
            .take(count)
            .map(Self::decode)
            .collect()
    }
}
