use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use super::{
    ext_header::ExtHeader,
    rtp_header::{RTP_HEADER_SIZE, RtpHeader},
    rtp_parse_error::RtpParseError,
};
use crate::rtp_error::{Result, RtpError};

/// Largest RTP payload assumed for one datagram on a 1500 byte path.
pub const MAX_PAYLOAD: usize = 1446;

const FRAME_ALIVE: u32 = 0x5254_5046; // "RTPF"
const FRAME_POISON: u32 = 0xDEAD_F4A3;

/// Payload storage. `Shared` is a zero-copy window into the datagram.
#[derive(Debug, Clone)]
enum Payload {
    Shared(Bytes),
    Owned(Vec<u8>),
}

impl Payload {
    fn as_slice(&self) -> &[u8] {
        match self {
            Payload::Shared(b) => b.as_ref(),
            Payload::Owned(v) => v.as_slice(),
        }
    }
}

/// A received or locally built RTP frame.
///
/// Padding is never part of the payload; its size is kept in `padding_len`.
/// A frame parsed from a datagram keeps that datagram alive while its payload
/// still points into it. Copying the payload out (see
/// [`payload_mut`](Self::payload_mut)) releases the datagram handle.
#[derive(Debug)]
pub struct RtpFrame {
    pub header: RtpHeader,
    pub csrc: Option<Vec<u32>>,
    pub ext: Option<ExtHeader>,
    pub padding_len: usize,
    payload: Payload,
    dgram: Option<Bytes>,
    sentinel: u32,
}

impl RtpFrame {
    /// Empty frame (no payload), version 2.
    pub fn alloc() -> Result<Box<Self>> {
        Ok(Box::new(Self::bare(Vec::new())))
    }

    /// Frame with a zeroed payload of `size` bytes.
    pub fn with_payload(size: usize) -> Result<Box<Self>> {
        Self::with_capacity(size, size)
    }

    /// Frame with `size` payload bytes and room for `pz_size` more
    /// maximum-size payloads behind them (the probation zone).
    pub fn with_probation(size: usize, pz_size: usize) -> Result<Box<Self>> {
        let capacity = pz_size
            .checked_mul(MAX_PAYLOAD)
            .and_then(|pz| pz.checked_add(size))
            .ok_or(RtpError::MemoryError)?;
        Self::with_capacity(size, capacity)
    }

    fn with_capacity(size: usize, capacity: usize) -> Result<Box<Self>> {
        let mut payload = Vec::new();
        payload.try_reserve_exact(capacity)?;
        payload.resize(size, 0);
        Ok(Box::new(Self::bare(payload)))
    }

    fn bare(payload: Vec<u8>) -> Self {
        Self {
            header: RtpHeader::default(),
            csrc: None,
            ext: None,
            padding_len: 0,
            payload: Payload::Owned(payload),
            dgram: None,
            sentinel: FRAME_ALIVE,
        }
    }

    /// Parses one RTP datagram.
    ///
    /// The payload is a slice of `dgram`. With `keep_padding` the trailing
    /// padding stays in the payload, which is what SRTP needs since the
    /// padding count is encrypted.
    pub fn parse(dgram: Bytes, keep_padding: bool) -> std::result::Result<Box<Self>, RtpParseError> {
        let header = RtpHeader::decode(&dgram)?;
        let mut off = RTP_HEADER_SIZE;

        let cc = usize::from(header.cc);
        let csrc = if cc > 0 {
            let raw = dgram
                .get(off..off + cc * 4)
                .ok_or(RtpParseError::CsrcCountMismatch {
                    expected: cc,
                    buf_left: dgram.len() - off,
                })?;
            off += cc * 4;
            Some(raw.chunks_exact(4).map(BigEndian::read_u32).collect())
        } else {
            None
        };

        let ext = if header.extension {
            let ext = ExtHeader::decode(&dgram[off..])?;
            off += ext.wire_len();
            Some(ext)
        } else {
            None
        };

        let mut end = dgram.len();
        let mut padding_len = 0;
        if header.padding && !keep_padding {
            let pad = usize::from(dgram[end - 1]);
            if pad == 0 || pad > end - off {
                return Err(RtpParseError::PaddingTooShort);
            }
            end -= pad;
            padding_len = pad;
        }

        Ok(Box::new(Self {
            header,
            csrc,
            ext,
            padding_len,
            payload: Payload::Shared(dgram.slice(off..end)),
            dgram: Some(dgram),
            sentinel: FRAME_ALIVE,
        }))
    }

    pub fn payload(&self) -> &[u8] {
        self.payload.as_slice()
    }

    pub fn payload_len(&self) -> usize {
        self.payload().len()
    }

    /// Mutable payload. A zero-copy payload is copied out first and the
    /// datagram handle is dropped.
    pub fn payload_mut(&mut self) -> Result<&mut Vec<u8>> {
        if let Payload::Shared(shared) = &self.payload {
            let mut owned = Vec::new();
            owned.try_reserve_exact(shared.len())?;
            owned.extend_from_slice(shared);
            self.payload = Payload::Owned(owned);
            self.dgram = None;
        }
        match &mut self.payload {
            Payload::Owned(v) => Ok(v),
            Payload::Shared(_) => Err(RtpError::InvalidValue("payload is still shared")),
        }
    }

    /// Replaces the payload and releases the datagram.
    pub fn set_payload(&mut self, payload: Vec<u8>) {
        self.payload = Payload::Owned(payload);
        self.dgram = None;
    }

    /// Raw datagram this frame was parsed from, while the payload still
    /// borrows from it.
    pub fn dgram(&self) -> Option<&Bytes> {
        self.dgram.as_ref()
    }

    pub fn is_zero_copy(&self) -> bool {
        matches!(self.payload, Payload::Shared(_))
    }

    /// Spare bytes reserved behind the payload.
    pub fn probation_capacity(&self) -> usize {
        match &self.payload {
            Payload::Owned(v) => v.capacity() - v.len(),
            Payload::Shared(_) => 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.sentinel == FRAME_ALIVE
    }

    /// Serializes the frame. CC, X and P are derived from the frame contents;
    /// padding is written as zeros followed by the count byte.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let csrc = self.csrc.as_deref().unwrap_or_default();
        let padding_len = self.padding_len.min(usize::from(u8::MAX));
        let mut header = self.header;
        header.cc = csrc.len().min(15) as u8;
        header.extension = self.ext.is_some();
        header.padding = padding_len > 0;
        header.encode_into(out);
        for id in csrc.iter().take(15) {
            out.extend_from_slice(&id.to_be_bytes());
        }
        if let Some(ext) = &self.ext {
            ext.encode_into(out);
        }
        out.extend_from_slice(self.payload());
        if padding_len > 0 {
            out.resize(out.len() + padding_len - 1, 0);
            out.push(padding_len as u8);
        }
    }

    /// Drops payload, extension and CSRCs and poisons the sentinel.
    pub(crate) fn release_in_place(&mut self) -> Result<()> {
        if self.sentinel != FRAME_ALIVE {
            return Err(RtpError::InvalidValue("frame already released"));
        }
        self.payload = Payload::Owned(Vec::new());
        self.ext = None;
        self.csrc = None;
        self.dgram = None;
        self.padding_len = 0;
        self.sentinel = FRAME_POISON;
        Ok(())
    }
}

/// Releases a frame handed out by the dispatcher or allocated by the caller.
///
/// The datagram buffer is freed only if no other frame still shares it.
pub fn dealloc_frame(frame: Option<Box<RtpFrame>>) -> Result<()> {
    let mut frame = frame.ok_or(RtpError::InvalidValue("frame is None"))?;
    frame.release_in_place()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn sample_frame() -> Box<RtpFrame> {
        let mut f = RtpFrame::alloc().unwrap();
        f.header = RtpHeader::new(96, 1000, 90_000, 0xCAFE_BABE).with_marker(true);
        f.csrc = Some(vec![1, 2]);
        f.ext = Some(ExtHeader::new(0xBEDE, vec![1, 2, 3]));
        f.padding_len = 3;
        f.set_payload(b"hello rtp".to_vec());
        f
    }

    #[test]
    fn alloc_variants_size_the_payload() {
        let f = RtpFrame::alloc().unwrap();
        assert_eq!(f.payload_len(), 0);
        assert_eq!(f.header.version, 2);

        let f = RtpFrame::with_payload(100).unwrap();
        assert_eq!(f.payload(), &[0u8; 100][..]);

        let f = RtpFrame::with_probation(10, 2).unwrap();
        assert_eq!(f.payload_len(), 10);
        assert!(f.probation_capacity() >= 2 * MAX_PAYLOAD);
    }

    #[test]
    fn absurd_probation_zone_is_a_memory_error() {
        assert!(matches!(
            RtpFrame::with_probation(1, usize::MAX),
            Err(RtpError::MemoryError)
        ));
    }

    #[test]
    fn parse_reads_back_an_encoded_frame() {
        let f = sample_frame();
        let mut wire = Vec::new();
        f.encode_into(&mut wire);

        let parsed = RtpFrame::parse(Bytes::from(wire), false).unwrap();
        assert_eq!(parsed.header.sequence_number, 1000);
        assert!(parsed.header.marker);
        assert_eq!(parsed.csrc, Some(vec![1, 2]));
        assert_eq!(parsed.ext.as_ref().unwrap().data, vec![1, 2, 3, 0]);
        assert_eq!(parsed.padding_len, 3);
        assert_eq!(parsed.payload(), b"hello rtp");
        assert!(parsed.is_zero_copy());
    }

    #[test]
    fn keep_padding_leaves_trailer_in_payload() {
        let f = sample_frame();
        let mut wire = Vec::new();
        f.encode_into(&mut wire);
        let parsed = RtpFrame::parse(Bytes::from(wire), true).unwrap();
        assert_eq!(parsed.padding_len, 0);
        assert_eq!(parsed.payload_len(), b"hello rtp".len() + 3);
    }

    #[test]
    fn parse_rejects_truncated_parts() {
        let mut hdr = RtpHeader::new(0, 1, 2, 3);
        hdr.cc = 2;
        let mut wire = Vec::new();
        hdr.encode_into(&mut wire);
        wire.extend_from_slice(&[0, 0, 0, 1]);
        assert_eq!(
            RtpFrame::parse(Bytes::from(wire), false).unwrap_err(),
            RtpParseError::CsrcCountMismatch {
                expected: 2,
                buf_left: 4
            }
        );

        let mut hdr = RtpHeader::new(0, 1, 2, 3);
        hdr.padding = true;
        let mut wire = Vec::new();
        hdr.encode_into(&mut wire);
        wire.extend_from_slice(&[0xAA, 9]);
        assert_eq!(
            RtpFrame::parse(Bytes::from(wire), false).unwrap_err(),
            RtpParseError::PaddingTooShort
        );
    }

    #[test]
    fn copy_out_releases_the_datagram() {
        let mut wire = Vec::new();
        sample_frame().encode_into(&mut wire);
        let dgram = Bytes::from(wire);
        let mut parsed = RtpFrame::parse(dgram.clone(), false).unwrap();
        assert!(parsed.dgram().is_some());

        parsed.payload_mut().unwrap().push(b'!');
        assert!(parsed.dgram().is_none());
        assert!(!parsed.is_zero_copy());
        assert_eq!(parsed.payload(), b"hello rtp!");
        // our handle is the only one left
        assert!(dgram.is_unique());
    }

    #[test]
    fn dealloc_once_then_detect_second_release() {
        assert!(matches!(dealloc_frame(None), Err(RtpError::InvalidValue(_))));
        assert!(dealloc_frame(Some(sample_frame())).is_ok());

        let mut f = sample_frame();
        f.release_in_place().unwrap();
        assert!(!f.is_alive());
        assert!(matches!(
            f.release_in_place(),
            Err(RtpError::InvalidValue("frame already released"))
        ));
        assert!(matches!(dealloc_frame(Some(f)), Err(RtpError::InvalidValue(_))));
    }
}
