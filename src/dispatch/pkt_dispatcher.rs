use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, RwLock},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use bytes::Bytes;

use super::{
    delivery::{DeliveryChannel, ReceiveHook},
    dispatcher_config::{DispatcherConfig, MIN_RECV_BUFFER},
    dispatcher_state::DispatcherState,
    dispatcher_stats::{DispatcherCounters, DispatcherStats},
    handler::{AuxHandler, PacketHandler},
    handler_key::HandlerKey,
    handler_registry::{ChainOutcome, HandlerRegistry},
    rce_flags::RceFlags,
};
use crate::{
    frame::Frame,
    log::LogSink,
    rtp_error::{Result, RtpError},
    sink_debug, sink_error, sink_info, sink_trace, sink_warn,
    socket::{DatagramSocket, datagram_socket::is_transient},
};

/// State shared between the owner and the `rtp-pkt-dispatcher` thread.
struct Shared {
    registry: RwLock<HandlerRegistry>,
    delivery: DeliveryChannel,
    state: Mutex<DispatcherState>,
    state_cv: Condvar,
    stats: DispatcherStats,
    config: DispatcherConfig,
    logger: Arc<dyn LogSink>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, DispatcherState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, next: DispatcherState) {
        *self.lock_state() = next;
        self.state_cv.notify_all();
    }
}

struct Worker {
    handle: JoinHandle<()>,
    socket: Arc<dyn DatagramSocket>,
}

/// Receive dispatcher: reads datagrams on a background thread, runs them
/// through the handler chain and delivers the resulting frames.
///
/// Handlers are expected to be installed before [`start`](Self::start).
/// Installing while running is allowed; it briefly blocks the receive loop.
///
/// # Shutdown
///
/// [`stop`](Self::stop) flips the state to `Stopping`, wakes the socket, and
/// joins the thread before returning, so the socket and any handler state may
/// be torn down right after. Dropping the dispatcher stops it.
pub struct PktDispatcher {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

impl PktDispatcher {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self::with_config(DispatcherConfig::default(), logger)
    }

    pub fn with_config(config: DispatcherConfig, logger: Arc<dyn LogSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: RwLock::new(HandlerRegistry::new(logger.clone())),
                delivery: DeliveryChannel::new(),
                state: Mutex::new(DispatcherState::Idle),
                state_cv: Condvar::new(),
                stats: DispatcherStats::default(),
                config,
                logger,
            }),
            worker: Mutex::new(None),
        }
    }

    /// See [`HandlerRegistry::install_handler`].
    pub fn install_handler(&self, handler: Option<Box<dyn PacketHandler>>) -> HandlerKey {
        match self.shared.registry.write() {
            Ok(mut reg) => reg.install_handler(handler),
            Err(_) => {
                sink_error!(self.shared.logger, "[Dispatcher] registry lock poisoned");
                HandlerKey::INVALID
            }
        }
    }

    pub fn install_aux_handler(
        &self,
        key: HandlerKey,
        handler: Option<Box<dyn AuxHandler>>,
    ) -> Result<()> {
        self.shared.registry.write()?.install_aux_handler(key, handler)
    }

    pub fn install_receive_hook(&self, hook: Option<ReceiveHook>) -> Result<()> {
        self.shared.delivery.install_receive_hook(hook)
    }

    pub fn call_aux_handlers(&self, key: HandlerKey, flags: RceFlags, frame: &mut Option<Frame>) {
        let reg = self
            .shared
            .registry
            .read()
            .unwrap_or_else(|p| p.into_inner());
        reg.call_aux_handlers(key, flags, frame);
    }

    /// Hands `frame` to the receive hook or the pull queue.
    pub fn return_frame(&self, frame: Frame) {
        self.shared.delivery.return_frame(frame);
    }

    /// Spawns the receive thread on `socket`.
    ///
    /// # Errors
    /// - `InvalidValue` if already running.
    /// - `ResourceCreation` if the thread cannot be spawned; the state is
    ///   left unchanged.
    pub fn start(&self, socket: Arc<dyn DatagramSocket>, flags: RceFlags) -> Result<()> {
        let mut worker = self.worker.lock()?;
        let prev = {
            let mut state = self.shared.lock_state();
            if state.is_active() {
                return Err(RtpError::InvalidValue("dispatcher already running"));
            }
            let prev = *state;
            *state = DispatcherState::Running;
            prev
        };

        // A loop that died on a socket error leaves its handle behind.
        if let Some(old) = worker.take() {
            let _ = old.handle.join();
        }
        self.shared.delivery.reopen();

        let shared = self.shared.clone();
        let sock = socket.clone();
        let spawned = thread::Builder::new()
            .name("rtp-pkt-dispatcher".into())
            .spawn(move || run(&shared, sock.as_ref(), flags));

        match spawned {
            Ok(handle) => {
                *worker = Some(Worker { handle, socket });
                self.shared.state_cv.notify_all();
                sink_info!(self.shared.logger, "[Dispatcher] started, flags={:#x}", flags.bits());
                Ok(())
            }
            Err(e) => {
                self.shared.set_state(prev);
                sink_error!(self.shared.logger, "[Dispatcher] spawn failed: {}", e);
                Err(RtpError::ResourceCreation(e))
            }
        }
    }

    /// Stops the receive thread and waits for it to exit.
    ///
    /// A no-op when nothing is running. Afterwards `pull_frame` returns
    /// buffered frames and then `None` without blocking.
    ///
    /// # Errors
    /// - `InvalidValue` when called from the receive thread itself, e.g. from
    ///   a receive hook or a handler. The thread cannot join itself.
    pub fn stop(&self) -> Result<()> {
        let worker = {
            let mut slot = self.worker.lock()?;
            if slot
                .as_ref()
                .is_some_and(|w| w.handle.thread().id() == thread::current().id())
            {
                return Err(RtpError::InvalidValue("stop called from the receive thread"));
            }
            slot.take()
        };
        {
            let mut state = self.shared.lock_state();
            if *state == DispatcherState::Running {
                *state = DispatcherState::Stopping;
                self.shared.state_cv.notify_all();
            }
        }
        let Some(worker) = worker else {
            return Ok(());
        };

        worker.socket.wake();
        if worker.handle.join().is_err() {
            sink_error!(self.shared.logger, "[Dispatcher] receive thread panicked");
        }
        self.shared.set_state(DispatcherState::Stopped);
        self.shared.delivery.close();
        sink_info!(self.shared.logger, "[Dispatcher] stopped");
        Ok(())
    }

    /// Blocks until a frame is available or the dispatcher has stopped.
    pub fn pull_frame(&self) -> Option<Frame> {
        self.shared.delivery.pull_frame()
    }

    /// Like [`pull_frame`](Self::pull_frame) with an upper bound on the wait.
    pub fn pull_frame_timeout(&self, timeout: Duration) -> Option<Frame> {
        self.shared.delivery.pull_frame_timeout(timeout)
    }

    pub fn state(&self) -> DispatcherState {
        *self.shared.lock_state()
    }

    /// Waits up to `timeout` for the dispatcher to reach `target`.
    pub fn wait_for_state(&self, target: DispatcherState, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock_state();
        while *state != target {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .shared
                .state_cv
                .wait_timeout(state, deadline - now)
                .map(|(g, _)| g)
                .unwrap_or_else(|p| p.into_inner().0);
        }
        true
    }

    pub fn stats(&self) -> DispatcherCounters {
        self.shared.stats.snapshot()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.shared.config
    }
}

impl Drop for PktDispatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Receive loop of the `rtp-pkt-dispatcher` thread.
fn run(shared: &Shared, socket: &dyn DatagramSocket, flags: RceFlags) {
    let logger = &shared.logger;
    let mut buf = vec![0u8; shared.config.recv_buffer_size.max(MIN_RECV_BUFFER)];
    sink_debug!(logger, "[Dispatcher] receive loop up, buffer={}", buf.len());

    loop {
        if *shared.lock_state() != DispatcherState::Running {
            break;
        }
        let n = match socket.recv(&mut buf) {
            Ok(n) => n,
            Err(e) if is_transient(&e) => continue,
            Err(e) => {
                sink_error!(logger, "[Dispatcher] socket error, receive loop ends: {}", e);
                {
                    let mut state = shared.lock_state();
                    if *state == DispatcherState::Running {
                        *state = DispatcherState::Stopped;
                    }
                }
                shared.state_cv.notify_all();
                shared.delivery.close();
                return;
            }
        };
        if *shared.lock_state() != DispatcherState::Running {
            break;
        }
        if n == 0 {
            continue;
        }
        shared.stats.on_received();
        let dgram = Bytes::copy_from_slice(&buf[..n]);

        let outcome = {
            let reg = shared.registry.read().unwrap_or_else(|p| p.into_inner());
            reg.run_chain(&dgram, flags)
        };
        match outcome {
            ChainOutcome::Claimed(key, Some(frame)) => {
                sink_trace!(logger, "[Dispatcher] {} frame from {}", frame.kind(), key);
                shared.delivery.return_frame(frame);
                shared.stats.on_delivered();
            }
            ChainOutcome::Claimed(key, None) => {
                sink_trace!(logger, "[Dispatcher] frame consumed by {}'s auxiliaries", key);
            }
            ChainOutcome::Failed(key, e) => {
                shared.stats.on_parse_failure();
                sink_warn!(logger, "[Dispatcher] {} rejected {} byte datagram: {}", key, n, e);
            }
            ChainOutcome::Unclaimed => {
                shared.stats.on_dropped();
                sink_trace!(logger, "[Dispatcher] unclaimed {} byte datagram dropped", n);
            }
        }
    }
    sink_debug!(logger, "[Dispatcher] receive loop exits");
}
