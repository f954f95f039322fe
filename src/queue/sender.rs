use std::sync::{Arc, Mutex, MutexGuard};

use rand::{RngCore, rngs::OsRng};

use super::{
    dealloc_hook::{DeallocHook, DeallocSlot},
    frame_queue::FrameQueue,
    rtp_context::RtpContext,
    rtp_flags::RtpFlags,
    send_dispatcher::{SendDispatcher, SendJob},
    send_stats::{SendCounters, SendStats},
    sender_config::SenderConfig,
    transmitter::Transmitter,
};
use crate::{
    log::LogSink,
    rtp_error::{Result, RtpError},
    sink_debug, sink_info,
    socket::DatagramSocket,
    srtp::{SrtpContext, SrtpEndpointKeys, constants::AUTH_TAG_LEN},
};

enum SendPath {
    /// Chunks go out inside `push_frame`.
    Direct(Transmitter),
    Worker(SendDispatcher),
}

/// Outgoing side of one RTP stream.
///
/// Created idle; [`init`](Self::init) builds the send path and
/// [`destroy`](Self::destroy) (or drop) tears it down, joining the send
/// worker if there is one.
pub struct Sender {
    config: SenderConfig,
    socket: Arc<dyn DatagramSocket>,
    ctx: Arc<RtpContext>,
    queue: FrameQueue,
    outbound_keys: Option<SrtpEndpointKeys>,
    path: Mutex<Option<SendPath>>,
    dealloc: Arc<DeallocSlot>,
    stats: Arc<SendStats>,
    logger: Arc<dyn LogSink>,
}

impl Sender {
    pub fn new(
        socket: Arc<dyn DatagramSocket>,
        config: SenderConfig,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let ctx = match config.ssrc {
            Some(ssrc) => RtpContext::with_initial(
                config.payload_type,
                config.clock_rate,
                ssrc,
                OsRng.next_u32() as u16,
                OsRng.next_u32(),
            ),
            None => RtpContext::random(config.payload_type, config.clock_rate),
        };
        let queue = FrameQueue::new(config.format, config.max_payload(0));
        Self {
            config,
            socket,
            ctx: Arc::new(ctx),
            queue,
            outbound_keys: None,
            path: Mutex::new(None),
            dealloc: Arc::new(DeallocSlot::default()),
            stats: Arc::new(SendStats::default()),
            logger,
        }
    }

    /// Protects every outgoing packet with SRTP. The payload budget shrinks
    /// by the authentication tag.
    pub fn with_srtp(mut self, keys: SrtpEndpointKeys) -> Result<Self> {
        keys.validate()?;
        self.outbound_keys = Some(keys);
        self.queue = FrameQueue::new(self.config.format, self.config.max_payload(AUTH_TAG_LEN));
        Ok(self)
    }

    /// Builds the send path and, when configured, starts the
    /// `rtp-send-dispatcher` worker.
    pub fn init(&self) -> Result<()> {
        let mut path = self.lock_path()?;
        if path.is_some() {
            return Err(RtpError::InvalidValue("sender already initialized"));
        }
        let srtp = match &self.outbound_keys {
            Some(keys) => Some(SrtpContext::new(self.logger.clone(), keys)?),
            None => None,
        };
        let transmitter = Transmitter::new(
            self.socket.clone(),
            self.ctx.clone(),
            srtp,
            self.stats.clone(),
            self.logger.clone(),
        );
        *path = Some(if self.config.use_send_dispatcher {
            SendPath::Worker(SendDispatcher::spawn(
                transmitter,
                self.config.send_queue_capacity,
                self.dealloc.clone(),
                self.logger.clone(),
            )?)
        } else {
            SendPath::Direct(transmitter)
        });
        sink_info!(
            self.logger,
            "[Sender] ssrc={:#010x} pt={} format={} max_payload={} worker={}",
            self.ctx.ssrc(),
            self.ctx.payload_type(),
            self.queue.format(),
            self.queue.max_payload(),
            self.config.use_send_dispatcher
        );
        Ok(())
    }

    /// Drains and joins the send worker. Later pushes fail with
    /// [`RtpError::NotRunning`].
    pub fn destroy(&self) -> Result<()> {
        let path = self.lock_path()?.take();
        if let Some(SendPath::Worker(mut worker)) = path {
            worker.shutdown();
        }
        sink_debug!(self.logger, "[Sender] destroyed");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.path.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    /// Sends a frame the caller keeps owning.
    ///
    /// Without a worker the chunks are sent straight from `data` (from a
    /// private copy under [`RtpFlags::COPY`]). With a worker the bytes are
    /// always copied before being queued.
    pub fn push_frame(&self, data: &[u8], flags: RtpFlags) -> Result<()> {
        if data.is_empty() {
            return Err(RtpError::InvalidValue("frame is empty"));
        }
        let mut guard = self.lock_path()?;
        let path = guard.as_mut().ok_or(RtpError::NotRunning)?;
        let chunks = self.queue.fragment(data, &self.ctx)?;
        match path {
            SendPath::Direct(tx) if flags.contains(RtpFlags::COPY) => {
                let copy = copy_of(data)?;
                tx.send_chunks(&copy, &chunks)
            }
            SendPath::Direct(tx) => tx.send_chunks(data, &chunks),
            SendPath::Worker(worker) => worker.submit(SendJob {
                buf: copy_of(data)?,
                chunks,
                owned: false,
            }),
        }
    }

    /// Sends a frame whose buffer moves into the sender.
    ///
    /// The buffer goes to the dealloc hook exactly once, after its last chunk
    /// is sent or as soon as the push fails. Without a hook it is dropped.
    pub fn push_frame_owned(&self, data: Vec<u8>, _flags: RtpFlags) -> Result<()> {
        if data.is_empty() {
            self.dealloc.release(data);
            return Err(RtpError::InvalidValue("frame is empty"));
        }
        let mut guard = match self.lock_path() {
            Ok(guard) => guard,
            Err(e) => {
                self.dealloc.release(data);
                return Err(e);
            }
        };
        let Some(path) = guard.as_mut() else {
            self.dealloc.release(data);
            return Err(RtpError::NotRunning);
        };
        let chunks = match self.queue.fragment(&data, &self.ctx) {
            Ok(chunks) => chunks,
            Err(e) => {
                self.dealloc.release(data);
                return Err(e);
            }
        };
        match path {
            SendPath::Direct(tx) => {
                let sent = tx.send_chunks(&data, &chunks);
                self.dealloc.release(data);
                sent
            }
            SendPath::Worker(worker) => worker.submit(SendJob {
                buf: data,
                chunks,
                owned: true,
            }),
        }
    }

    /// Installs the hook that receives buffers from
    /// [`push_frame_owned`](Self::push_frame_owned).
    pub fn install_dealloc_hook(&self, hook: Option<DeallocHook>) -> Result<()> {
        let hook = hook.ok_or(RtpError::InvalidValue("dealloc hook is None"))?;
        self.dealloc.install(hook);
        Ok(())
    }

    pub fn has_dealloc_hook(&self) -> bool {
        self.dealloc.is_installed()
    }

    /// Clock, SSRC and sequence state of this stream.
    pub fn get_rtp_ctx(&self) -> &Arc<RtpContext> {
        &self.ctx
    }

    pub fn frame_queue(&self) -> &FrameQueue {
        &self.queue
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    pub fn stats(&self) -> SendCounters {
        self.stats.snapshot()
    }

    fn lock_path(&self) -> Result<MutexGuard<'_, Option<SendPath>>> {
        Ok(self.path.lock()?)
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        let _ = self.destroy();
    }
}

fn copy_of(data: &[u8]) -> Result<Vec<u8>> {
    let mut copy = Vec::new();
    copy.try_reserve_exact(data.len())?;
    copy.extend_from_slice(data);
    Ok(copy)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{
        frame::{RtpFrame, RtpHeader},
        log::NoopLogSink,
        queue::MediaFormat,
        socket::MemSocket,
    };
    use bytes::Bytes;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    fn sender(cfg: SenderConfig) -> (Sender, Arc<MemSocket>, MemSocket) {
        let (a, b) = MemSocket::pair_with_timeout(Duration::from_millis(200));
        let a = Arc::new(a);
        let s = Sender::new(a.clone(), cfg, Arc::new(NoopLogSink));
        (s, a, b)
    }

    fn small(worker: bool) -> SenderConfig {
        SenderConfig {
            mtu: 12 + 8,
            use_send_dispatcher: worker,
            ssrc: Some(0x1111),
            ..SenderConfig::default()
        }
    }

    fn drain(rx: &MemSocket, n: usize) -> Vec<Box<RtpFrame>> {
        let mut buf = [0u8; 256];
        (0..n)
            .map(|_| {
                let len = rx.recv(&mut buf).unwrap();
                RtpFrame::parse(Bytes::copy_from_slice(&buf[..len]), false).unwrap()
            })
            .collect()
    }

    #[test]
    fn push_before_init_and_empty_frames_fail() {
        let (s, _a, _b) = sender(small(false));
        assert!(matches!(
            s.push_frame(b"x", RtpFlags::NONE),
            Err(RtpError::NotRunning)
        ));
        assert!(!s.is_initialized());
        s.init().unwrap();
        assert!(s.is_initialized());
        assert!(matches!(s.init(), Err(RtpError::InvalidValue(_))));
        assert!(matches!(
            s.push_frame(&[], RtpFlags::NONE),
            Err(RtpError::InvalidValue(_))
        ));
    }

    #[test]
    fn direct_send_fragments_with_consecutive_sequence_numbers() {
        let (s, _a, b) = sender(small(false));
        s.init().unwrap();
        let first = s.get_rtp_ctx().peek_sequence();
        let data: Vec<u8> = (0..20).collect();
        s.push_frame(&data, RtpFlags::COPY).unwrap();

        let frames = drain(&b, 3);
        let mut rebuilt = Vec::new();
        for (i, f) in frames.iter().enumerate() {
            assert_eq!(f.header.sequence_number, first.wrapping_add(i as u16));
            assert_eq!(f.header.ssrc, 0x1111);
            assert_eq!(f.header.marker, i == 2);
            rebuilt.extend_from_slice(f.payload());
        }
        assert_eq!(rebuilt, data);
        assert_eq!(s.stats().packets_sent, 3);
        assert_eq!(s.get_rtp_ctx().sender_counts(), (3, 20));
    }

    #[test]
    fn socket_failure_is_reported_in_direct_mode() {
        let (s, a, _b) = sender(small(false));
        s.init().unwrap();
        a.fail_sends(true);
        assert!(matches!(
            s.push_frame(b"abc", RtpFlags::NONE),
            Err(RtpError::SendError(_))
        ));
    }

    #[test]
    fn owned_buffers_reach_the_hook_once() {
        for worker in [false, true] {
            let (s, _a, b) = sender(small(worker));
            let calls = Arc::new(AtomicUsize::new(0));
            let seen = calls.clone();
            assert!(s.install_dealloc_hook(None).is_err());
            assert!(!s.has_dealloc_hook());
            s.install_dealloc_hook(Some(Arc::new(move |buf: Vec<u8>| {
                assert_eq!(buf.len(), 10);
                seen.fetch_add(1, Ordering::SeqCst);
            })))
            .unwrap();
            assert!(s.has_dealloc_hook());

            // not initialized yet: the buffer still comes back
            assert!(s.push_frame_owned(vec![1; 10], RtpFlags::NONE).is_err());
            s.init().unwrap();
            s.push_frame_owned(vec![2; 10], RtpFlags::NONE).unwrap();
            s.destroy().unwrap();

            assert_eq!(calls.load(Ordering::SeqCst), 2);
            assert_eq!(drain(&b, 2).len(), 2);
        }
    }

    #[test]
    fn worker_mode_sends_in_push_order() {
        let (s, _a, b) = sender(SenderConfig {
            send_queue_capacity: 1,
            ..small(true)
        });
        s.init().unwrap();
        for i in 0u8..10 {
            s.push_frame(&[i; 4], RtpFlags::NONE).unwrap();
        }
        s.destroy().unwrap();
        let frames = drain(&b, 10);
        for (i, f) in frames.iter().enumerate() {
            assert_eq!(f.payload(), &[i as u8; 4]);
            assert!(f.header.marker);
        }
        assert_eq!(s.stats().frames_sent, 10);
        assert!(matches!(
            s.push_frame(b"late", RtpFlags::NONE),
            Err(RtpError::NotRunning)
        ));
    }

    #[test]
    fn srtp_shrinks_the_payload_budget() {
        let keys = SrtpEndpointKeys::new(vec![3; 16], vec![4; 14]).unwrap();
        let (s, _a, b) = sender(SenderConfig {
            mtu: 12 + 10 + 6,
            ..small(false)
        });
        let s = s.with_srtp(keys).unwrap();
        assert_eq!(s.frame_queue().max_payload(), 6);
        s.init().unwrap();
        s.push_frame(&[9; 12], RtpFlags::NONE).unwrap();

        let mut buf = [0u8; 64];
        for _ in 0..2 {
            let n = b.recv(&mut buf).unwrap();
            assert_eq!(n, 12 + 6 + 10);
            assert_ne!(&buf[12..18], &[9; 6]);
            RtpHeader::decode(&buf[..n]).unwrap();
        }
    }

    #[test]
    fn h264_format_is_used() {
        let (s, _a, b) = sender(SenderConfig {
            format: MediaFormat::H264,
            mtu: 12 + 100,
            ..small(false)
        });
        s.init().unwrap();
        s.push_frame(&[0, 0, 0, 1, 0x67, 1, 0, 0, 1, 0x68, 2], RtpFlags::NONE)
            .unwrap();
        let frames = drain(&b, 2);
        assert_eq!(frames[0].payload(), &[0x67, 1]);
        assert_eq!(frames[1].payload(), &[0x68, 2]);
        assert!(frames[1].header.marker && !frames[0].header.marker);
    }
}
