use std::ops::Range;

/// NAL unit type of an FU-A fragmentation unit (RFC 6184 §5.8).
const FU_A: u8 = 28;

/// Payload piece of an H.264 access unit, as an index range into the
/// Annex-B buffer plus an optional FU-A prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H264Piece {
    pub range: Range<usize>,
    pub prefix: Option<[u8; 2]>,
}

/// Splits Annex-B access units into RTP payloads (RFC 6184).
///
/// NAL units that fit are sent as single NAL unit packets; larger ones are
/// cut into FU-A fragments. No aggregation (STAP-A).
#[derive(Debug, Clone, Copy)]
pub struct H264Fragmenter {
    max_payload: usize,
}

impl H264Fragmenter {
    pub fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Payload pieces for one access unit, in send order. Start codes are
    /// never part of a piece. `None` when the budget cannot fit an FU-A
    /// fragment.
    pub fn fragment(&self, annexb: &[u8]) -> Option<Vec<H264Piece>> {
        let mut out = Vec::new();
        for nalu in split_annexb_nalus(annexb) {
            let len = nalu.end - nalu.start;
            if len <= self.max_payload {
                out.push(H264Piece {
                    range: nalu,
                    prefix: None,
                });
                continue;
            }

            // the original NAL header is folded into the FU indicator and header
            let nalu_header = annexb[nalu.start];
            let fu_indicator = (nalu_header & 0xE0) | FU_A;
            let ntype = nalu_header & 0x1F;
            let budget = self.max_payload.checked_sub(2).filter(|&b| b > 0)?;

            let mut offset = nalu.start + 1;
            while offset < nalu.end {
                let take = (nalu.end - offset).min(budget);
                let start_bit = if offset == nalu.start + 1 { 0x80 } else { 0 };
                let end_bit = if offset + take == nalu.end { 0x40 } else { 0 };
                out.push(H264Piece {
                    range: offset..offset + take,
                    prefix: Some([fu_indicator, start_bit | end_bit | ntype]),
                });
                offset += take;
            }
        }
        Some(out)
    }
}

/// NAL unit ranges of an Annex-B buffer, without start codes or trailing
/// zero bytes. Accepts 3 and 4 byte start codes; a buffer without any start
/// code is one NAL unit.
pub fn split_annexb_nalus(data: &[u8]) -> Vec<Range<usize>> {
    let n = data.len();
    let mut starts = Vec::new();
    let mut i = 0usize;
    while i + 3 <= n {
        if let Some(sc_len) = start_code_len_at(data, i) {
            starts.push(i + sc_len);
            i += sc_len;
            continue;
        }
        i += 1;
    }

    if starts.is_empty() {
        return if data.is_empty() { Vec::new() } else { vec![0..n] };
    }

    let mut nalus = Vec::with_capacity(starts.len());
    for (k, &start) in starts.iter().enumerate() {
        // the next start code's leading zeros belong to neither unit
        let limit = starts.get(k + 1).map_or(n, |&next| next - 3);
        let mut end = limit.max(start);
        while end > start && data[end - 1] == 0 {
            end -= 1;
        }
        if end > start {
            nalus.push(start..end);
        }
    }
    nalus
}

#[inline]
fn start_code_len_at(data: &[u8], i: usize) -> Option<usize> {
    match data.get(i..) {
        Some([0, 0, 0, 1, ..]) => Some(4),
        Some([0, 0, 1, ..]) => Some(3),
        _ => None,
    }
}
