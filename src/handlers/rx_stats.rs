use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use super::{
    ntp_time::{now_ntp_compact, ntp_compact},
    seq_ext::SeqExt,
};
use crate::{
    dispatch::{AuxHandler, RceFlags},
    frame::Frame,
    rtcp::{RtcpPacket, report_block::ReportBlock},
    rtp_error::Result,
};

/// Point-in-time view of one remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RxSnapshot {
    pub packets: u64,
    pub bytes: u64,
    pub highest_ext_seq: u32,
    /// Expected minus received. Negative when duplicates arrived.
    pub cumulative_lost: i64,
    /// RFC 3550 interarrival jitter, in RTP timestamp units.
    pub jitter: u32,
}

#[derive(Debug, Default, Clone)]
struct RxTracker {
    seqext: SeqExt,
    base_ext_seq: Option<u32>,
    highest_ext_seq: u32,
    received: u32,
    bytes: u64,
    expected_prev: u32,
    received_prev: u32,

    // RFC 3550 A.8, kept scaled by 16
    jitter_q4: i64,
    last_transit: Option<u32>,

    last_sr_compact: Option<u32>,
    last_sr_arrival_compact: Option<u32>,
}

impl RxTracker {
    fn on_rtp(&mut self, seq: u16, rtp_ts: u32, arrival_rtp_units: u32, len: usize) {
        let ext = self.seqext.update(seq);
        if self.base_ext_seq.is_none() {
            self.base_ext_seq = Some(ext);
            self.highest_ext_seq = ext;
        }
        if ext > self.highest_ext_seq {
            self.highest_ext_seq = ext;
        }
        self.received = self.received.wrapping_add(1);
        self.bytes = self.bytes.saturating_add(len as u64);

        let transit = arrival_rtp_units.wrapping_sub(rtp_ts);
        if let Some(prev) = self.last_transit {
            let d = i64::from((transit.wrapping_sub(prev) as i32).unsigned_abs());
            self.jitter_q4 += d - ((self.jitter_q4 + 8) >> 4);
        }
        self.last_transit = Some(transit);
    }

    fn on_sr(&mut self, ntp_msw: u32, ntp_lsw: u32) {
        self.last_sr_compact = Some(ntp_compact(ntp_msw, ntp_lsw));
        self.last_sr_arrival_compact = Some(now_ntp_compact());
    }

    fn expected(&self) -> u32 {
        match self.base_ext_seq {
            Some(base) => self.highest_ext_seq.wrapping_sub(base).wrapping_add(1),
            None => 0,
        }
    }

    fn jitter(&self) -> u32 {
        (self.jitter_q4 >> 4).clamp(0, i64::from(u32::MAX)) as u32
    }

    fn snapshot(&self) -> RxSnapshot {
        RxSnapshot {
            packets: u64::from(self.received),
            bytes: self.bytes,
            highest_ext_seq: self.highest_ext_seq,
            cumulative_lost: i64::from(self.expected()) - i64::from(self.received),
            jitter: self.jitter(),
        }
    }

    /// Consumes the interval deltas used for the fraction lost.
    fn report_block(&mut self, ssrc: u32) -> ReportBlock {
        let expected = self.expected();
        let exp_delta = expected.wrapping_sub(self.expected_prev);
        let rec_delta = self.received.wrapping_sub(self.received_prev);
        let lost_delta = exp_delta.saturating_sub(rec_delta);
        let fraction_lost = if exp_delta == 0 {
            0
        } else {
            ((u64::from(lost_delta) << 8) / u64::from(exp_delta)).min(255) as u8
        };
        self.expected_prev = expected;
        self.received_prev = self.received;

        let (lsr, dlsr) = match (self.last_sr_compact, self.last_sr_arrival_compact) {
            (Some(lsr), Some(arrival)) => (lsr, now_ntp_compact().wrapping_sub(arrival)),
            _ => (0, 0),
        };

        let lost = i64::from(expected) - i64::from(self.received);
        ReportBlock {
            ssrc,
            fraction_lost,
            cumulative_lost: lost.clamp(-8_388_608, 8_388_607) as i32,
            highest_seq_no_received: self.highest_ext_seq,
            interarrival_jitter: self.jitter(),
            lsr,
            dlsr,
        }
    }
}

/// Receive statistics for every remote SSRC seen on a stream.
pub struct RxStats {
    streams: Mutex<HashMap<u32, RxTracker>>,
    clock_rate: u32,
    epoch: Instant,
}

impl RxStats {
    /// `clock_rate` is the RTP clock of the media, used to express arrival
    /// times in timestamp units for the jitter estimate.
    pub fn new(clock_rate: u32) -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            clock_rate: clock_rate.max(1),
            epoch: Instant::now(),
        }
    }

    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Records one RTP packet that arrived now.
    pub fn on_rtp(&self, ssrc: u32, seq: u16, rtp_ts: u32, payload_len: usize) {
        let arrival = self.arrival_rtp_units();
        self.on_rtp_at(ssrc, seq, rtp_ts, payload_len, arrival);
    }

    /// Records one RTP packet with an explicit arrival time in RTP units.
    pub fn on_rtp_at(&self, ssrc: u32, seq: u16, rtp_ts: u32, payload_len: usize, arrival: u32) {
        self.lock()
            .entry(ssrc)
            .or_default()
            .on_rtp(seq, rtp_ts, arrival, payload_len);
    }

    /// Remembers the NTP time of a sender report for LSR/DLSR.
    pub fn on_sender_report(&self, ssrc: u32, ntp_msw: u32, ntp_lsw: u32) {
        self.lock().entry(ssrc).or_default().on_sr(ntp_msw, ntp_lsw);
    }

    /// Forgets sources that left the session (RFC 3550 §6.3.7).
    pub fn on_bye(&self, sources: &[u32]) {
        let mut streams = self.lock();
        for ssrc in sources {
            streams.remove(ssrc);
        }
    }

    pub fn snapshot(&self, ssrc: u32) -> Option<RxSnapshot> {
        self.lock().get(&ssrc).map(RxTracker::snapshot)
    }

    /// Builds a reception report block for `ssrc` and starts a new interval.
    pub fn report_block(&self, ssrc: u32) -> Option<ReportBlock> {
        self.lock().get_mut(&ssrc).map(|t| t.report_block(ssrc))
    }

    pub fn sources(&self) -> Vec<u32> {
        let mut v: Vec<u32> = self.lock().keys().copied().collect();
        v.sort_unstable();
        v
    }

    fn arrival_rtp_units(&self) -> u32 {
        let elapsed = self.epoch.elapsed();
        let units = elapsed.as_secs() * u64::from(self.clock_rate)
            + u64::from(elapsed.subsec_nanos()) * u64::from(self.clock_rate) / 1_000_000_000;
        units as u32
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u32, RxTracker>> {
        self.streams.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Auxiliary that feeds [`RxStats`] from RTP frames and sender reports and
/// drops sources that send BYE.
/// The frame is left untouched.
pub struct RxStatsHandler {
    stats: Arc<RxStats>,
}

impl RxStatsHandler {
    pub fn new(stats: Arc<RxStats>) -> Self {
        Self { stats }
    }

    pub fn stats(&self) -> &Arc<RxStats> {
        &self.stats
    }
}

impl AuxHandler for RxStatsHandler {
    fn handle(&self, _flags: RceFlags, frame: &mut Option<Frame>) -> Result<()> {
        match frame {
            Some(Frame::Rtp(f)) => {
                self.stats.on_rtp(
                    f.header.ssrc,
                    f.header.sequence_number,
                    f.header.timestamp,
                    f.payload_len(),
                );
            }
            Some(Frame::Rtcp(f)) => {
                for pkt in &f.packets {
                    match pkt {
                        RtcpPacket::Sr(sr) => {
                            self.stats
                                .on_sender_report(sr.ssrc, sr.info.ntp_msw, sr.info.ntp_lsw);
                        }
                        RtcpPacket::Bye(bye) => self.stats.on_bye(&bye.sources),
                        _ => {}
                    }
                }
            }
            Some(Frame::Zrtp(_)) | None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{
        frame::{RtcpFrame, RtpFrame, RtpHeader},
        rtcp::{bye::Bye, sender_info::SenderInfo, sender_report::SenderReport},
    };

    #[test]
    fn counts_packets_bytes_and_loss() {
        let stats = RxStats::new(8000);
        for seq in [10u16, 11, 13, 14] {
            stats.on_rtp_at(7, seq, u32::from(seq) * 160, 100, u32::from(seq) * 160);
        }
        let s = stats.snapshot(7).unwrap();
        assert_eq!(s.packets, 4);
        assert_eq!(s.bytes, 400);
        assert_eq!(s.highest_ext_seq, 14);
        assert_eq!(s.cumulative_lost, 1);
        assert_eq!(s.jitter, 0);
        assert!(stats.snapshot(8).is_none());
    }

    #[test]
    fn extended_sequence_crosses_the_wrap() {
        let stats = RxStats::new(90_000);
        for seq in [65_534u16, 65_535, 0, 1] {
            stats.on_rtp_at(1, seq, 0, 1, 0);
        }
        let s = stats.snapshot(1).unwrap();
        assert_eq!(s.highest_ext_seq, 65_537);
        assert_eq!(s.cumulative_lost, 0);
    }

    #[test]
    fn jitter_grows_with_uneven_arrivals() {
        let stats = RxStats::new(8000);
        // constant 160 unit spacing on the sender, arrivals alternate 100/220
        let mut arrival = 0u32;
        for i in 0..32u32 {
            arrival += if i % 2 == 0 { 100 } else { 220 };
            stats.on_rtp_at(3, i as u16, i * 160, 10, arrival);
        }
        let j = stats.snapshot(3).unwrap().jitter;
        assert!(j > 20 && j <= 60, "jitter {j}");
    }

    #[test]
    fn report_block_tracks_interval_loss() {
        let stats = RxStats::new(8000);
        for seq in 0u16..10 {
            if seq != 4 && seq != 5 {
                stats.on_rtp_at(9, seq, 0, 1, 0);
            }
        }
        let rb = stats.report_block(9).unwrap();
        assert_eq!(rb.ssrc, 9);
        assert_eq!(rb.cumulative_lost, 2);
        assert_eq!(rb.fraction_lost, (2 * 256 / 10) as u8);
        assert_eq!(rb.lsr, 0);

        for seq in 10u16..20 {
            stats.on_rtp_at(9, seq, 0, 1, 0);
        }
        let rb = stats.report_block(9).unwrap();
        assert_eq!(rb.fraction_lost, 0);
        assert_eq!(rb.highest_seq_no_received, 19);
    }

    #[test]
    fn handler_reads_rtp_and_sender_reports() {
        let stats = Arc::new(RxStats::new(90_000));
        let h = RxStatsHandler::new(stats.clone());

        let mut f = RtpFrame::with_payload(33).unwrap();
        f.header = RtpHeader::new(96, 5, 1000, 0xAA);
        let mut slot = Some(Frame::Rtp(f));
        h.handle(RceFlags::NONE, &mut slot).unwrap();
        assert!(slot.is_some());

        let sr = SenderReport::new(
            0xAA,
            SenderInfo {
                ntp_msw: 0x0001_0002,
                ntp_lsw: 0x0003_0004,
                ..Default::default()
            },
            Vec::new(),
        );
        let mut slot = Some(Frame::Rtcp(RtcpFrame {
            packets: vec![RtcpPacket::Sr(sr)],
        }));
        h.handle(RceFlags::NONE, &mut slot).unwrap();

        let mut empty = None;
        h.handle(RceFlags::NONE, &mut empty).unwrap();
        assert!(empty.is_none());

        assert_eq!(stats.snapshot(0xAA).unwrap().bytes, 33);
        assert_eq!(stats.report_block(0xAA).unwrap().lsr, 0x0002_0003);
        assert_eq!(stats.sources(), vec![0xAA]);
    }

    #[test]
    fn bye_removes_the_source() {
        let stats = Arc::new(RxStats::new(8000));
        let h = RxStatsHandler::new(stats.clone());
        stats.on_rtp(0xAA, 1, 0, 10);
        stats.on_rtp(0xBB, 1, 0, 10);

        let mut slot = Some(Frame::Rtcp(RtcpFrame {
            packets: vec![RtcpPacket::Bye(Bye::single(0xAA, None))],
        }));
        h.handle(RceFlags::NONE, &mut slot).unwrap();
        assert_eq!(stats.sources(), vec![0xBB]);
        assert!(stats.snapshot(0xAA).is_none());

        stats.on_bye(&[0xBB, 0xCC]);
        assert!(stats.sources().is_empty());
    }
}
