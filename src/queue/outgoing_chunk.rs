/// One packet's worth of a pushed frame.
///
/// `offset..offset + len` indexes the frame buffer; `prefix` holds payload
/// header bytes written before that slice (the FU-A indicator and header for
/// H.264 fragments).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingChunk {
    pub offset: usize,
    pub len: usize,
    pub prefix: Option<[u8; 2]>,
    pub seq: u16,
    pub timestamp: u32,
    pub marker: bool,
}

impl OutgoingChunk {
    pub fn payload_len(&self) -> usize {
        self.len + self.prefix.map_or(0, |p| p.len())
    }

    /// Payload bytes of this chunk taken from the frame `buf`.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.offset..self.offset + self.len]
    }
}
