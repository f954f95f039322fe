use byteorder::{BigEndian, ByteOrder};

use super::rtp_parse_error::RtpParseError;

pub const RTP_VERSION: u8 = 2;
/// Size of the fixed part of the RTP header.
pub const RTP_HEADER_SIZE: usize = 12;

/// RTP fixed header (RFC 3550 §5.1). CSRCs and the extension live on the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    pub version: u8,     // must be 2
    pub padding: bool,   // P bit
    pub extension: bool, // X bit
    pub cc: u8,          // CSRC count, 4 bits
    pub marker: bool,    // M bit
    pub payload_type: u8, // 7 bits
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
}

impl Default for RtpHeader {
    fn default() -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            extension: false,
            cc: 0,
            marker: false,
            payload_type: 0,
            sequence_number: 0,
            timestamp: 0,
            ssrc: 0,
        }
    }
}

impl RtpHeader {
    pub fn new(payload_type: u8, sequence_number: u16, timestamp: u32, ssrc: u32) -> Self {
        Self {
            payload_type: payload_type & 0x7F,
            sequence_number,
            timestamp,
            ssrc,
            ..Self::default()
        }
    }

    pub fn with_marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    /// Decodes the 12 fixed bytes. Does not look at CSRCs or the extension.
    pub fn decode(buf: &[u8]) -> Result<Self, RtpParseError> {
        if buf.len() < RTP_HEADER_SIZE {
            return Err(RtpParseError::TooShort);
        }
        let b0 = buf[0];
        let b1 = buf[1];
        let version = b0 >> 6;
        if version != RTP_VERSION {
            return Err(RtpParseError::BadVersion(version));
        }
        Ok(Self {
            version,
            padding: b0 & 0x20 != 0,
            extension: b0 & 0x10 != 0,
            cc: b0 & 0x0F,
            marker: b1 & 0x80 != 0,
            payload_type: b1 & 0x7F,
            sequence_number: BigEndian::read_u16(&buf[2..4]),
            timestamp: BigEndian::read_u32(&buf[4..8]),
            ssrc: BigEndian::read_u32(&buf[8..12]),
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let b0 = (self.version & 0b11) << 6
            | u8::from(self.padding) << 5
            | u8::from(self.extension) << 4
            | (self.cc & 0x0F);
        let b1 = u8::from(self.marker) << 7 | (self.payload_type & 0x7F);
        let mut fixed = [0u8; RTP_HEADER_SIZE];
        fixed[0] = b0;
        fixed[1] = b1;
        BigEndian::write_u16(&mut fixed[2..4], self.sequence_number);
        BigEndian::write_u32(&mut fixed[4..8], self.timestamp);
        BigEndian::write_u32(&mut fixed[8..12], self.ssrc);
        out.extend_from_slice(&fixed);
    }
}
