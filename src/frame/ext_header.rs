use byteorder::{BigEndian, ByteOrder};

use super::rtp_parse_error::RtpParseError;

/// RTP header extension (RFC 3550 §5.3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtHeader {
    /// Profile-defined identifier.
    pub ext_type: u16,
    /// Extension data in 32-bit words, excluding the 4-byte extension header.
    pub len: u16,
    pub data: Vec<u8>,
}

impl ExtHeader {
    /// Zero-pads `data` to a word boundary.
    pub fn new(ext_type: u16, mut data: Vec<u8>) -> Self {
        let rem = data.len() % 4;
        if rem != 0 {
            data.resize(data.len() + 4 - rem, 0);
        }
        Self {
            ext_type,
            len: u16::try_from(data.len() / 4).unwrap_or(u16::MAX),
            data,
        }
    }

    /// Size on the wire including the 4-byte extension header.
    pub fn wire_len(&self) -> usize {
        4 + usize::from(self.len) * 4
    }

    /// Decodes the extension at the start of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self, RtpParseError> {
        if buf.len() < 4 {
            return Err(RtpParseError::HeaderExtensionTooShort);
        }
        let ext_type = BigEndian::read_u16(&buf[0..2]);
        let len = BigEndian::read_u16(&buf[2..4]);
        let end = 4 + usize::from(len) * 4;
        let data = buf
            .get(4..end)
            .ok_or(RtpParseError::HeaderExtensionTooShort)?
            .to_vec();
        Ok(Self {
            ext_type,
            len,
            data,
        })
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let mut hdr = [0u8; 4];
        BigEndian::write_u16(&mut hdr[0..2], self.ext_type);
        BigEndian::write_u16(&mut hdr[2..4], self.len);
        out.extend_from_slice(&hdr);
        let want = usize::from(self.len) * 4;
        let take = self.data.len().min(want);
        out.extend_from_slice(&self.data[..take]);
        out.resize(out.len() + want - take, 0);
    }
}
