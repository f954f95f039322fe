use std::{
    sync::atomic::{AtomicU32, AtomicU64, Ordering},
    time::Instant,
};

use rand::{RngCore, rngs::OsRng};

/// Clock, SSRC and sequence state of one outgoing RTP stream.
///
/// Sequence numbers are handed out in blocks so every chunk of a frame gets
/// consecutive values even when several threads push.
#[derive(Debug)]
pub struct RtpContext {
    ssrc: u32,
    payload_type: u8,
    clock_rate: u32,
    initial_ts: u32,
    epoch: Instant,
    // low 16 bits are the next sequence number; u32 wraps in step with u16
    next_seq: AtomicU32,
    packets_sent: AtomicU64,
    octets_sent: AtomicU64,
}

impl RtpContext {
    /// Random SSRC, initial sequence number and initial timestamp.
    pub fn random(payload_type: u8, clock_rate: u32) -> Self {
        Self::with_initial(
            payload_type,
            clock_rate,
            OsRng.next_u32(),
            OsRng.next_u32() as u16,
            OsRng.next_u32(),
        )
    }

    pub fn with_initial(
        payload_type: u8,
        clock_rate: u32,
        ssrc: u32,
        first_seq: u16,
        initial_ts: u32,
    ) -> Self {
        Self {
            ssrc,
            payload_type: payload_type & 0x7F,
            clock_rate: clock_rate.max(1),
            initial_ts,
            epoch: Instant::now(),
            next_seq: AtomicU32::new(u32::from(first_seq)),
            packets_sent: AtomicU64::new(0),
            octets_sent: AtomicU64::new(0),
        }
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Media clock now: the initial timestamp plus elapsed time in clock
    /// units, wrapping at 2^32.
    pub fn timestamp_now(&self) -> u32 {
        let elapsed = self.epoch.elapsed();
        let rate = u64::from(self.clock_rate);
        let units =
            elapsed.as_secs() * rate + u64::from(elapsed.subsec_nanos()) * rate / 1_000_000_000;
        self.initial_ts.wrapping_add(units as u32)
    }

    /// Reserves `count` consecutive sequence numbers and returns the first.
    pub fn reserve_sequence(&self, count: u16) -> u16 {
        self.next_seq.fetch_add(u32::from(count), Ordering::Relaxed) as u16
    }

    /// Sequence number the next reservation starts at.
    pub fn peek_sequence(&self) -> u16 {
        self.next_seq.load(Ordering::Relaxed) as u16
    }

    pub(crate) fn record_sent(&self, payload_len: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.octets_sent
            .fetch_add(payload_len as u64, Ordering::Relaxed);
    }

    /// `(packet count, octet count)` as they go into a sender report.
    pub fn sender_counts(&self) -> (u32, u32) {
        (
            self.packets_sent.load(Ordering::Relaxed) as u32,
            self.octets_sent.load(Ordering::Relaxed) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};

    #[test]
    fn sequence_blocks_wrap() {
        let ctx = RtpContext::with_initial(96, 90_000, 1, 65_534, 0);
        assert_eq!(ctx.reserve_sequence(3), 65_534);
        assert_eq!(ctx.peek_sequence(), 1);
        assert_eq!(ctx.reserve_sequence(1), 1);
    }

    #[test]
    fn timestamp_advances_with_the_clock() {
        let ctx = RtpContext::with_initial(0, 8000, 1, 0, u32::MAX - 10);
        thread::sleep(Duration::from_millis(20));
        // at least 160 ticks have passed, so the 32-bit clock wrapped
        assert!(ctx.timestamp_now() < 10_000);
    }

    #[test]
    fn counts_what_was_sent() {
        let ctx = RtpContext::random(96, 90_000);
        ctx.record_sent(100);
        ctx.record_sent(50);
        assert_eq!(ctx.sender_counts(), (2, 150));
        assert_eq!(ctx.payload_type(), 96);
    }
}
