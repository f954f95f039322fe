use byteorder::{BigEndian, ByteOrder};

use super::{
    common_header::{CommonHeader, finish_packet},
    packet_type::{PT_BYE, RtcpPacketType},
    rtcp_error::RtcpError,
    rtcp_packet::RtcpPacket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bye {
    pub sources: Vec<u32>,
    pub reason: Option<String>,
}

impl Bye {
    pub fn single(ssrc: u32, reason: Option<String>) -> Self {
        Self {
            sources: vec![ssrc],
            reason,
        }
    }
}

impl RtcpPacketType for Bye {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.sources.len() > 31 {
            return Err(RtcpError::TooManyByeSources(self.sources.len()));
        }
        let start = out.len();
        CommonHeader::new(self.sources.len() as u8, PT_BYE, false).encode_into(out);
        for ssrc in &self.sources {
            out.extend_from_slice(&ssrc.to_be_bytes());
        }
        if let Some(reason) = &self.reason {
            let bytes = reason.as_bytes();
            let bytes = &bytes[..bytes.len().min(usize::from(u8::MAX))];
            out.push(bytes.len() as u8);
            out.extend_from_slice(bytes);
        }
        finish_packet(out, start)
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        let sc = usize::from(hdr.rc_or_fmt());
        if payload.len() < sc * 4 {
            return Err(RtcpError::Truncated);
        }
        let sources = payload[..sc * 4]
            .chunks_exact(4)
            .map(BigEndian::read_u32)
            .collect();
        let rest = &payload[sc * 4..];
        let reason = match rest.first() {
            Some(&len) => {
                let text = rest
                    .get(1..1 + usize::from(len))
                    .ok_or(RtcpError::Truncated)?;
                Some(String::from_utf8_lossy(text).into_owned())
            }
            None => None,
        };
        Ok(RtcpPacket::Bye(Bye { sources, reason }))
    }
}
