use byteorder::{BigEndian, ByteOrder};

use super::{
    common_header::{CommonHeader, finish_packet},
    packet_type::{PT_SDES, RtcpPacketType},
    rtcp_error::RtcpError,
    rtcp_packet::RtcpPacket,
};

/// SDES item (RFC 3550 §6.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdesItem {
    Cname(String), // 1
    Name(String),  // 2
    Email(String), // 3
    Phone(String), // 4
    Loc(String),   // 5
    Tool(String),  // 6
    Note(String),  // 7
    Priv(Vec<u8>), // 8
    Unknown(u8, Vec<u8>),
}

impl SdesItem {
    fn from_wire(kind: u8, data: &[u8]) -> Self {
        let text = || String::from_utf8_lossy(data).into_owned();
        match kind {
            1 => Self::Cname(text()),
            2 => Self::Name(text()),
            3 => Self::Email(text()),
            4 => Self::Phone(text()),
            5 => Self::Loc(text()),
            6 => Self::Tool(text()),
            7 => Self::Note(text()),
            8 => Self::Priv(data.to_vec()),
            other => Self::Unknown(other, data.to_vec()),
        }
    }

    fn wire_parts(&self) -> (u8, &[u8]) {
        match self {
            Self::Cname(s) => (1, s.as_bytes()),
            Self::Name(s) => (2, s.as_bytes()),
            Self::Email(s) => (3, s.as_bytes()),
            Self::Phone(s) => (4, s.as_bytes()),
            Self::Loc(s) => (5, s.as_bytes()),
            Self::Tool(s) => (6, s.as_bytes()),
            Self::Note(s) => (7, s.as_bytes()),
            Self::Priv(v) => (8, v.as_slice()),
            Self::Unknown(t, v) => (*t, v.as_slice()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SdesChunk {
    pub ssrc: u32,
    pub items: Vec<SdesItem>,
}

impl SdesChunk {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        let start = out.len();
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        for item in &self.items {
            let (kind, data) = item.wire_parts();
            let len = u8::try_from(data.len()).map_err(|_| RtcpError::SdesItemTooLong)?;
            out.push(kind);
            out.push(len);
            out.extend_from_slice(data);
        }
        // END item, then pad the chunk to a word boundary
        out.push(0);
        let rem = (out.len() - start) % 4;
        if rem != 0 {
            out.resize(out.len() + 4 - rem, 0);
        }
        Ok(())
    }

    /// Returns the chunk and the number of bytes it used, padding included.
    fn decode(buf: &[u8]) -> Result<(Self, usize), RtcpError> {
        if buf.len() < 4 {
            return Err(RtcpError::TooShort);
        }
        let ssrc = BigEndian::read_u32(&buf[0..4]);
        let mut idx = 4usize;
        let mut items = Vec::new();

        loop {
            let Some(&kind) = buf.get(idx) else {
                return Err(RtcpError::Truncated);
            };
            idx += 1;
            if kind == 0 {
                idx += (4 - idx % 4) % 4;
                if idx > buf.len() {
                    return Err(RtcpError::Truncated);
                }
                break;
            }
            let Some(&len) = buf.get(idx) else {
                return Err(RtcpError::SdesItemTooShort);
            };
            idx += 1;
            let end = idx + usize::from(len);
            let data = buf.get(idx..end).ok_or(RtcpError::SdesItemTooShort)?;
            items.push(SdesItem::from_wire(kind, data));
            idx = end;
        }
        Ok((Self { ssrc, items }, idx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sdes {
    pub chunks: Vec<SdesChunk>,
}

impl Sdes {
    pub fn cname(ssrc: u32, cname: impl Into<String>) -> Self {
        Self {
            chunks: vec![SdesChunk {
                ssrc,
                items: vec![SdesItem::Cname(cname.into())],
            }],
        }
    }
}

impl RtcpPacketType for Sdes {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.chunks.len() > 31 {
            return Err(RtcpError::TooManySdesChunks(self.chunks.len()));
        }
        let start = out.len();
        CommonHeader::new(self.chunks.len() as u8, PT_SDES, false).encode_into(out);
        for chunk in &self.chunks {
            chunk.encode_into(out)?;
        }
        finish_packet(out, start)
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        let count = usize::from(hdr.rc_or_fmt());
        let mut chunks = Vec::with_capacity(count);
        let mut idx = 0usize;
        for _ in 0..count {
            let (chunk, used) = SdesChunk::decode(&payload[idx..])?;
            chunks.push(chunk);
            idx += used;
        }
        Ok(RtcpPacket::Sdes(Sdes { chunks }))
    }
}
