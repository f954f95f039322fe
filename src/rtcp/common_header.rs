use byteorder::{BigEndian, ByteOrder};

use super::rtcp_error::RtcpError;

pub const RTCP_VERSION: u8 = 2;
pub const RTCP_HEADER_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonHeader {
    version: u8,       // 2
    padding: bool,     // P
    rc_or_fmt: u8,     // 5 bits: report count, source count or APP subtype
    pt: u8,            // packet type
    length_words: u16, // number of 32-bit words minus one
}

impl CommonHeader {
    pub fn new(rc_or_fmt: u8, pt: u8, padding: bool) -> Self {
        Self {
            version: RTCP_VERSION,
            padding,
            rc_or_fmt: rc_or_fmt & 0x1F,
            pt,
            length_words: 0,
        }
    }

    /// Decodes the header and returns it with the packet's total size in bytes.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), RtcpError> {
        if buf.len() < RTCP_HEADER_SIZE {
            return Err(RtcpError::TooShort);
        }
        let version = buf[0] >> 6;
        if version != RTCP_VERSION {
            return Err(RtcpError::BadVersion(version));
        }
        let length_words = BigEndian::read_u16(&buf[2..4]);
        let total_bytes = (usize::from(length_words) + 1) * 4;
        if buf.len() < total_bytes {
            return Err(RtcpError::Truncated);
        }
        Ok((
            Self {
                version,
                padding: buf[0] & 0x20 != 0,
                rc_or_fmt: buf[0] & 0x1F,
                pt: buf[1],
                length_words,
            },
            total_bytes,
        ))
    }

    /// Writes the header with a zero length; finish with [`finish_packet`].
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push((self.version & 0b11) << 6 | u8::from(self.padding) << 5 | self.rc_or_fmt);
        out.push(self.pt);
        out.extend_from_slice(&self.length_words.to_be_bytes());
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn rc_or_fmt(&self) -> u8 {
        self.rc_or_fmt
    }

    pub fn pt(&self) -> u8 {
        self.pt
    }

    pub fn length_words(&self) -> u16 {
        self.length_words
    }
}

/// Zero-pads the packet that starts at `start` to a 32-bit boundary and
/// patches its length field.
pub fn finish_packet(out: &mut Vec<u8>, start: usize) -> Result<(), RtcpError> {
    let rem = (out.len() - start) % 4;
    if rem != 0 {
        out.resize(out.len() + 4 - rem, 0);
    }
    let total = out.len() - start;
    let words = u16::try_from(total / 4 - 1).map_err(|_| RtcpError::Oversized(total))?;
    BigEndian::write_u16(&mut out[start + 2..start + 4], words);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn finish_packet_pads_and_patches_length() {
        let mut out = Vec::new();
        CommonHeader::new(3, 204, false).encode_into(&mut out);
        out.extend_from_slice(&[1, 2, 3, 4, 5]);
        finish_packet(&mut out, 0).unwrap();
        assert_eq!(out.len(), 12);
        let (hdr, total) = CommonHeader::decode(&out).unwrap();
        assert_eq!(hdr.length_words(), 2);
        assert_eq!(total, 12);
        assert_eq!(hdr.rc_or_fmt(), 3);
        assert_eq!(hdr.pt(), 204);
    }

    #[test]
    fn decode_checks_version_and_length() {
        assert_eq!(CommonHeader::decode(&[0x80, 200]), Err(RtcpError::TooShort));
        assert_eq!(
            CommonHeader::decode(&[0x40, 200, 0, 0]),
            Err(RtcpError::BadVersion(1))
        );
        assert_eq!(
            CommonHeader::decode(&[0x80, 200, 0, 1, 0, 0]),
            Err(RtcpError::Truncated)
        );
    }
}
