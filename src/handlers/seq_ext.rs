/// Extends 16-bit RTP sequence numbers with a wrap counter.
#[derive(Debug, Default, Clone)]
pub struct SeqExt {
    cycles: u32, // multiples of 2^16
    last: Option<u16>,
}

impl SeqExt {
    /// Feeds one sequence number and returns its extended value.
    pub fn update(&mut self, seq: u16) -> u32 {
        if let Some(last) = self.last {
            // backwards by more than half the space is a wrap
            if seq < last && last.wrapping_sub(seq) > 0x8000 {
                self.cycles = self.cycles.wrapping_add(1 << 16);
            }
        }
        self.last = Some(seq);
        self.cycles | u32::from(seq)
    }

    pub fn cycles(&self) -> u32 {
        self.cycles >> 16
    }
}
