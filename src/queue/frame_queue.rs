use super::{
    h264_fragmenter::H264Fragmenter, media_format::MediaFormat, outgoing_chunk::OutgoingChunk,
    rtp_context::RtpContext,
};
use crate::rtp_error::{Result, RtpError};

/// Upper bound on packets per frame, so the sequence numbers of one frame
/// never wrap onto each other.
pub const MAX_FRAGMENTS: usize = 32_767;

/// Cuts pushed frames into packet-sized chunks and stamps their headers.
#[derive(Debug, Clone, Copy)]
pub struct FrameQueue {
    format: MediaFormat,
    max_payload: usize,
}

impl FrameQueue {
    /// `max_payload` is the RTP payload budget of one datagram.
    pub fn new(format: MediaFormat, max_payload: usize) -> Self {
        Self {
            format,
            max_payload,
        }
    }

    pub fn format(&self) -> MediaFormat {
        self.format
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Splits `data` into chunks and reserves their sequence numbers in
    /// `ctx`. Only the last chunk carries the marker.
    pub fn fragment(&self, data: &[u8], ctx: &RtpContext) -> Result<Vec<OutgoingChunk>> {
        if data.is_empty() {
            return Err(RtpError::InvalidValue("frame is empty"));
        }
        let too_large = RtpError::FrameTooLarge {
            len: data.len(),
            max: self.max_payload.saturating_mul(MAX_FRAGMENTS),
        };
        let ts = ctx.timestamp_now();

        // (offset, len, prefix, timestamp)
        let pieces: Vec<(usize, usize, Option<[u8; 2]>, u32)> = match self.format {
            MediaFormat::Generic => {
                if self.max_payload == 0 || data.len().div_ceil(self.max_payload) > MAX_FRAGMENTS {
                    return Err(too_large);
                }
                (0..data.len())
                    .step_by(self.max_payload)
                    .map(|off| (off, self.max_payload.min(data.len() - off), None, ts))
                    .collect()
            }
            MediaFormat::Pcm { bytes_per_sample } => {
                let bps = usize::from(bytes_per_sample.max(1));
                // keep samples whole
                let step = self.max_payload - self.max_payload % bps;
                if step == 0 || data.len().div_ceil(step) > MAX_FRAGMENTS {
                    return Err(too_large);
                }
                (0..data.len())
                    .step_by(step)
                    .map(|off| {
                        let sample_ts = ts.wrapping_add((off / bps) as u32);
                        (off, step.min(data.len() - off), None, sample_ts)
                    })
                    .collect()
            }
            MediaFormat::H264 => {
                let pieces = H264Fragmenter::new(self.max_payload)
                    .fragment(data)
                    .ok_or(too_large)?;
                if pieces.is_empty() {
                    return Err(RtpError::InvalidValue("access unit has no NAL units"));
                }
                pieces
                    .into_iter()
                    .map(|p| (p.range.start, p.range.len(), p.prefix, ts))
                    .collect()
            }
        };

        if pieces.len() > MAX_FRAGMENTS {
            return Err(RtpError::FrameTooLarge {
                len: data.len(),
                max: self.max_payload.saturating_mul(MAX_FRAGMENTS),
            });
        }
        let count = pieces.len();
        let first_seq = ctx.reserve_sequence(count as u16);
        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(i, (offset, len, prefix, timestamp))| OutgoingChunk {
                offset,
                len,
                prefix,
                seq: first_seq.wrapping_add(i as u16),
                timestamp,
                marker: i + 1 == count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn ctx(first_seq: u16) -> RtpContext {
        RtpContext::with_initial(96, 90_000, 0x1234, first_seq, 1000)
    }

    #[test]
    fn k_full_chunks_plus_remainder() {
        let max = 100;
        let data: Vec<u8> = (0..(3 * max + 37)).map(|i| i as u8).collect();
        let q = FrameQueue::new(MediaFormat::Generic, max);
        let chunks = q.fragment(&data, &ctx(10)).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].len, 37);
        assert!(chunks[3].marker);
        assert!(chunks[..3].iter().all(|c| !c.marker && c.len == max));
        assert_eq!(
            chunks.iter().map(|c| c.seq).collect::<Vec<_>>(),
            vec![10, 11, 12, 13]
        );
        let ts = chunks[0].timestamp;
        assert!(chunks.iter().all(|c| c.timestamp == ts));

        let rebuilt: Vec<u8> = chunks.iter().flat_map(|c| c.slice(&data).to_vec()).collect();
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn sequence_numbers_wrap_inside_a_frame() {
        let q = FrameQueue::new(MediaFormat::Generic, 4);
        let c = ctx(65_535);
        let chunks = q.fragment(&[0; 12], &c).unwrap();
        assert_eq!(
            chunks.iter().map(|c| c.seq).collect::<Vec<_>>(),
            vec![65_535, 0, 1]
        );
        assert_eq!(c.peek_sequence(), 2);
    }

    #[test]
    fn pcm_timestamps_follow_the_sample_offset() {
        let q = FrameQueue::new(MediaFormat::Pcm { bytes_per_sample: 2 }, 101);
        let chunks = q.fragment(&[0; 450], &ctx(0)).unwrap();
        // 101 rounds down to 100 bytes = 50 samples
        assert_eq!(chunks.len(), 5);
        let base = chunks[0].timestamp;
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.timestamp, base.wrapping_add(50 * i as u32));
            assert_eq!(c.len % 2, 0);
        }
        assert_eq!(chunks[4].len, 50);
    }

    #[test]
    fn h264_uses_fu_a_and_marks_the_last_fragment() {
        let mut au = vec![0, 0, 0, 1, 0x67, 1, 2, 0, 0, 0, 1, 0x65];
        au.extend(std::iter::repeat_n(7u8, 50));
        let q = FrameQueue::new(MediaFormat::H264, 20);
        let chunks = q.fragment(&au, &ctx(0)).unwrap();
        assert!(chunks[0].prefix.is_none());
        assert!(chunks[1..].iter().all(|c| c.prefix.is_some()));
        assert!(chunks.last().unwrap().marker);
        assert_eq!(chunks.iter().filter(|c| c.marker).count(), 1);
    }

    #[test]
    fn size_and_argument_errors() {
        let q = FrameQueue::new(MediaFormat::Generic, 1);
        assert!(matches!(
            q.fragment(&[], &ctx(0)),
            Err(RtpError::InvalidValue(_))
        ));
        assert!(matches!(
            q.fragment(&vec![0; MAX_FRAGMENTS + 1], &ctx(0)),
            Err(RtpError::FrameTooLarge { .. })
        ));
        assert!(q.fragment(&vec![0; MAX_FRAGMENTS], &ctx(0)).is_ok());
        assert!(matches!(
            FrameQueue::new(MediaFormat::Generic, 0).fragment(&[1], &ctx(0)),
            Err(RtpError::FrameTooLarge { .. })
        ));
        assert!(matches!(
            FrameQueue::new(MediaFormat::Pcm { bytes_per_sample: 4 }, 3).fragment(&[1; 8], &ctx(0)),
            Err(RtpError::FrameTooLarge { .. })
        ));
    }
}
