use std::{net::SocketAddr, sync::Arc, time::Duration};

use super::stream_config::StreamConfig;
use crate::{
    dispatch::{DispatcherState, HandlerKey, PktDispatcher, RceFlags, ReceiveHook},
    frame::Frame,
    handlers::{RtcpHandler, RtpHandler, RxStats, RxStatsHandler, SrtpAuxHandler, ZrtpHandler},
    log::LogSink,
    queue::{DeallocHook, RtpFlags, Sender},
    rtp_error::{Result, RtpError},
    sink_info,
    socket::{DatagramSocket, UdpTransport},
};

/// Keys of the built-in primaries, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHandlers {
    pub rtcp: HandlerKey,
    pub zrtp: HandlerKey,
    pub rtp: HandlerKey,
}

/// One bidirectional RTP stream over one socket: a receive dispatcher with
/// the built-in handler chain and a sender.
///
/// Handler layout: RTCP, then ZRTP, then RTP. RTP frames run through the
/// SRTP auxiliary (when keyed) and then receive statistics; RTCP frames feed
/// the statistics with sender report times.
pub struct MediaStream {
    socket: Arc<dyn DatagramSocket>,
    dispatcher: PktDispatcher,
    sender: Sender,
    rx_stats: Arc<RxStats>,
    handlers: StreamHandlers,
    flags: RceFlags,
    logger: Arc<dyn LogSink>,
}

impl MediaStream {
    pub fn new(
        socket: Arc<dyn DatagramSocket>,
        config: StreamConfig,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let dispatcher = PktDispatcher::with_config(config.dispatcher.clone(), logger.clone());
        let rx_stats = Arc::new(RxStats::new(config.sender.clock_rate));

        let rtcp = dispatcher.install_handler(Some(Box::new(RtcpHandler)));
        let zrtp = dispatcher.install_handler(Some(Box::new(ZrtpHandler)));
        let rtp = dispatcher.install_handler(Some(Box::new(RtpHandler)));

        let mut sender = Sender::new(socket.clone(), config.sender.clone(), logger.clone());
        let mut flags = RceFlags::NONE;
        if let Some(keys) = &config.srtp {
            let aux = SrtpAuxHandler::new(logger.clone(), &keys.inbound)?;
            dispatcher.install_aux_handler(rtp, Some(Box::new(aux)))?;
            sender = sender.with_srtp(keys.outbound.clone())?;
            flags = flags | RceFlags::SRTP;
        }
        dispatcher.install_aux_handler(rtp, Some(Box::new(RxStatsHandler::new(rx_stats.clone()))))?;
        dispatcher
            .install_aux_handler(rtcp, Some(Box::new(RxStatsHandler::new(rx_stats.clone()))))?;

        Ok(Self {
            socket,
            dispatcher,
            sender,
            rx_stats,
            handlers: StreamHandlers { rtcp, zrtp, rtp },
            flags,
            logger,
        })
    }

    /// Binds a UDP socket on `local` that sends to `peer`.
    pub fn open_udp(
        local: SocketAddr,
        peer: SocketAddr,
        config: StreamConfig,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let socket = UdpTransport::bind(
            local,
            peer,
            Some(config.dispatcher.read_timeout),
            logger.clone(),
        )
        .map_err(RtpError::ResourceCreation)?;
        Self::new(Arc::new(socket), config, logger)
    }

    /// Initializes the sender and starts the receive thread.
    pub fn start(&self) -> Result<()> {
        self.sender.init()?;
        if let Err(e) = self.dispatcher.start(self.socket.clone(), self.flags) {
            let _ = self.sender.destroy();
            return Err(e);
        }
        sink_info!(
            self.logger,
            "[Stream] started ssrc={:#010x} srtp={}",
            self.sender.get_rtp_ctx().ssrc(),
            self.flags.contains(RceFlags::SRTP)
        );
        Ok(())
    }

    /// Joins the receive thread, then drains and joins the send worker.
    pub fn stop(&self) -> Result<()> {
        let stopped = self.dispatcher.stop();
        self.sender.destroy()?;
        stopped
    }

    pub fn push_frame(&self, data: &[u8], flags: RtpFlags) -> Result<()> {
        self.sender.push_frame(data, flags)
    }

    pub fn push_frame_owned(&self, data: Vec<u8>, flags: RtpFlags) -> Result<()> {
        self.sender.push_frame_owned(data, flags)
    }

    pub fn install_dealloc_hook(&self, hook: Option<DeallocHook>) -> Result<()> {
        self.sender.install_dealloc_hook(hook)
    }

    pub fn install_receive_hook(&self, hook: Option<ReceiveHook>) -> Result<()> {
        self.dispatcher.install_receive_hook(hook)
    }

    pub fn pull_frame(&self) -> Option<Frame> {
        self.dispatcher.pull_frame()
    }

    pub fn pull_frame_timeout(&self, timeout: Duration) -> Option<Frame> {
        self.dispatcher.pull_frame_timeout(timeout)
    }

    pub fn rx_stats(&self) -> &Arc<RxStats> {
        &self.rx_stats
    }

    pub fn handlers(&self) -> StreamHandlers {
        self.handlers
    }

    pub fn state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    pub fn dispatcher(&self) -> &PktDispatcher {
        &self.dispatcher
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
