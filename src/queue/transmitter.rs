use std::sync::Arc;

use super::{outgoing_chunk::OutgoingChunk, rtp_context::RtpContext, send_stats::SendStats};
use crate::{
    frame::{RTP_HEADER_SIZE, RtpHeader},
    log::LogSink,
    rtp_error::{Result, RtpError},
    sink_trace, sink_warn,
    socket::DatagramSocket,
    srtp::SrtpContext,
};

/// Turns chunks into datagrams and writes them to the socket.
pub struct Transmitter {
    socket: Arc<dyn DatagramSocket>,
    ctx: Arc<RtpContext>,
    srtp: Option<SrtpContext>,
    stats: Arc<SendStats>,
    logger: Arc<dyn LogSink>,
    scratch: Vec<u8>,
}

impl Transmitter {
    pub fn new(
        socket: Arc<dyn DatagramSocket>,
        ctx: Arc<RtpContext>,
        srtp: Option<SrtpContext>,
        stats: Arc<SendStats>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            socket,
            ctx,
            srtp,
            stats,
            logger,
            scratch: Vec::with_capacity(1500),
        }
    }

    /// Sends every chunk of `buf` in order. Stops at the first socket
    /// error; packets already sent stay sent.
    pub fn send_chunks(&mut self, buf: &[u8], chunks: &[OutgoingChunk]) -> Result<()> {
        for chunk in chunks {
            if let Err(e) = self.send_one(buf, chunk) {
                self.stats.on_failure();
                sink_warn!(
                    self.logger,
                    "[Transmitter] seq={} not sent: {}",
                    chunk.seq,
                    e
                );
                return Err(e);
            }
        }
        self.stats.on_frame();
        Ok(())
    }

    fn send_one(&mut self, buf: &[u8], chunk: &OutgoingChunk) -> Result<()> {
        let pkt = &mut self.scratch;
        pkt.clear();
        pkt.try_reserve(RTP_HEADER_SIZE + chunk.payload_len())?;
        RtpHeader::new(
            self.ctx.payload_type(),
            chunk.seq,
            chunk.timestamp,
            self.ctx.ssrc(),
        )
        .with_marker(chunk.marker)
        .encode_into(pkt);
        if let Some(prefix) = chunk.prefix {
            pkt.extend_from_slice(&prefix);
        }
        pkt.extend_from_slice(chunk.slice(buf));

        if let Some(srtp) = self.srtp.as_mut() {
            srtp.protect(pkt)?;
        }

        self.socket.send(pkt).map_err(RtpError::SendError)?;
        self.ctx.record_sent(chunk.payload_len());
        self.stats.on_packet(pkt.len());
        sink_trace!(
            self.logger,
            "[Transmitter] sent seq={} ts={} len={} marker={}",
            chunk.seq,
            chunk.timestamp,
            pkt.len(),
            chunk.marker
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{log::NoopLogSink, socket::MemSocket};
    use std::time::Duration;

    fn chunk(offset: usize, len: usize, seq: u16, marker: bool) -> OutgoingChunk {
        OutgoingChunk {
            offset,
            len,
            prefix: None,
            seq,
            timestamp: 77,
            marker,
        }
    }

    #[test]
    fn writes_header_prefix_and_slice() {
        let (a, b) = MemSocket::pair_with_timeout(Duration::from_millis(50));
        let ctx = Arc::new(RtpContext::with_initial(100, 8000, 0xABCD, 0, 0));
        let stats = Arc::new(SendStats::default());
        let mut tx = Transmitter::new(
            Arc::new(a),
            ctx.clone(),
            None,
            stats.clone(),
            Arc::new(NoopLogSink),
        );

        let mut c = chunk(2, 3, 9, true);
        c.prefix = Some([0xF0, 0x0F]);
        tx.send_chunks(b"..abc..", &[c]).unwrap();

        let mut buf = [0u8; 64];
        let n = b.recv(&mut buf).unwrap();
        let hdr = RtpHeader::decode(&buf[..n]).unwrap();
        assert_eq!((hdr.payload_type, hdr.sequence_number, hdr.ssrc), (100, 9, 0xABCD));
        assert!(hdr.marker);
        assert_eq!(&buf[12..n], &[0xF0, 0x0F, b'a', b'b', b'c']);
        assert_eq!(ctx.sender_counts(), (1, 5));
        assert_eq!(stats.snapshot().bytes_sent, n as u64);
    }

    #[test]
    fn socket_failure_is_a_send_error_and_stops_the_frame() {
        let (a, _b) = MemSocket::pair();
        a.fail_sends(true);
        let a = Arc::new(a);
        let stats = Arc::new(SendStats::default());
        let mut tx = Transmitter::new(
            a.clone(),
            Arc::new(RtpContext::random(96, 90_000)),
            None,
            stats.clone(),
            Arc::new(NoopLogSink),
        );
        let r = tx.send_chunks(b"abcd", &[chunk(0, 2, 1, false), chunk(2, 2, 2, true)]);
        assert!(matches!(r, Err(RtpError::SendError(_))));
        let s = stats.snapshot();
        assert_eq!((s.frames_sent, s.send_failures, s.packets_sent), (0, 1, 0));
    }
}
