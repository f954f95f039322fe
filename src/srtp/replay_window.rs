use super::constants::REPLAY_WINDOW_SIZE;

/// Sliding bitmap over the last 64 packet indices (RFC 3711 §3.3.2).
/// Bit `n` marks `max_index - n` as seen.
#[derive(Debug, Default)]
pub(crate) struct ReplayWindow {
    max_index: u64,
    window: u64,
}

impl ReplayWindow {
    pub(crate) fn is_replay(&self, index: u64) -> bool {
        if self.window == 0 || index > self.max_index {
            return false;
        }
        let diff = self.max_index - index;
        diff >= REPLAY_WINDOW_SIZE || self.window & (1u64 << diff) != 0
    }

    pub(crate) fn record(&mut self, index: u64) {
        if self.window == 0 || index > self.max_index {
            let shift = index.saturating_sub(self.max_index);
            self.window = if self.window != 0 && shift < REPLAY_WINDOW_SIZE {
                self.window << shift
            } else {
                0
            };
            self.window |= 1;
            self.max_index = index;
        } else {
            let diff = self.max_index - index;
            if diff < REPLAY_WINDOW_SIZE {
                self.window |= 1u64 << diff;
            }
        }
    }
}
