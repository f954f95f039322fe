use byteorder::{BigEndian, ByteOrder};

use super::zrtp_error::ZrtpError;
use crate::rtp_error::{Result, RtpError};

/// "ZRTP" in ASCII.
pub const ZRTP_MAGIC: u32 = 0x5A52_5450;
pub const ZRTP_HEADER_SIZE: usize = 12;

const ZRTP_ALIVE: u32 = 0x5A46_524D;
const ZRTP_POISON: u32 = 0xDEAD_5A46;

/// ZRTP handshake packet framing (RFC 6189 §5).
///
/// Layout: version(4) reserved(12) seq(16) magic(32) ssrc(32) payload.
/// The top two bits of the first byte are zero, which is what separates
/// these datagrams from RTP and RTCP on a shared port.
#[derive(Debug, Clone)]
pub struct ZrtpFrame {
    pub version: u8,
    pub seq: u16,
    pub magic: u32,
    pub ssrc: u32,
    pub payload: Vec<u8>,
    sentinel: u32,
}

impl ZrtpFrame {
    /// Frame with a zeroed payload of `payload_size` bytes.
    pub fn alloc(payload_size: usize) -> Result<Box<Self>> {
        if payload_size == 0 {
            return Err(RtpError::InvalidValue("ZRTP payload size is 0"));
        }
        let mut payload = Vec::new();
        payload.try_reserve_exact(payload_size)?;
        payload.resize(payload_size, 0);
        Ok(Box::new(Self {
            version: 1,
            seq: 0,
            magic: ZRTP_MAGIC,
            ssrc: 0,
            payload,
            sentinel: ZRTP_ALIVE,
        }))
    }

    pub fn parse(buf: &[u8]) -> std::result::Result<Box<Self>, ZrtpError> {
        if buf.len() < ZRTP_HEADER_SIZE {
            return Err(ZrtpError::TooShort);
        }
        let magic = BigEndian::read_u32(&buf[4..8]);
        if magic != ZRTP_MAGIC {
            return Err(ZrtpError::BadMagic(magic));
        }
        if buf.len() == ZRTP_HEADER_SIZE {
            return Err(ZrtpError::EmptyPayload);
        }
        Ok(Box::new(Self {
            version: buf[0] >> 4,
            seq: BigEndian::read_u16(&buf[2..4]),
            magic,
            ssrc: BigEndian::read_u32(&buf[8..12]),
            payload: buf[ZRTP_HEADER_SIZE..].to_vec(),
            sentinel: ZRTP_ALIVE,
        }))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; ZRTP_HEADER_SIZE];
        out[0] = (self.version & 0x0F) << 4;
        BigEndian::write_u16(&mut out[2..4], self.seq);
        BigEndian::write_u32(&mut out[4..8], self.magic);
        BigEndian::write_u32(&mut out[8..12], self.ssrc);
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn is_alive(&self) -> bool {
        self.sentinel == ZRTP_ALIVE
    }

    pub(crate) fn release_in_place(&mut self) -> Result<()> {
        if self.sentinel != ZRTP_ALIVE {
            return Err(RtpError::InvalidValue("ZRTP frame already released"));
        }
        self.payload = Vec::new();
        self.sentinel = ZRTP_POISON;
        Ok(())
    }
}

/// Quick check used for demultiplexing: top bits zero and the magic cookie.
pub fn looks_like_zrtp(buf: &[u8]) -> bool {
    buf.len() >= ZRTP_HEADER_SIZE
        && buf[0] >> 6 == 0
        && BigEndian::read_u32(&buf[4..8]) == ZRTP_MAGIC
}

pub fn dealloc_zrtp_frame(frame: Option<Box<ZrtpFrame>>) -> Result<()> {
    let mut frame = frame.ok_or(RtpError::InvalidValue("ZRTP frame is None"))?;
    frame.release_in_place()
}
