use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::{
    frame::Frame,
    rtp_error::{Result, RtpError},
};

/// Push-style consumer of completed frames. Runs on the dispatcher thread
/// with the hook lock held.
///
/// A hook must not install another hook (it would deadlock on that lock).
/// Stopping the dispatcher from inside the hook fails with `InvalidValue`.
pub type ReceiveHook = Box<dyn FnMut(Frame) + Send>;

#[derive(Default)]
struct QueueState {
    frames: VecDeque<Frame>,
    closed: bool,
}

/// Hands completed frames to the application, either through a hook or a
/// FIFO queue drained by [`pull_frame`](Self::pull_frame).
///
/// Queue mode is the default. Once a hook is installed every later frame goes
/// to it and never to the queue. Hook calls are serialized.
pub struct DeliveryChannel {
    queue: Mutex<QueueState>,
    ready: Condvar,
    hook: Mutex<Option<ReceiveHook>>,
}

impl Default for DeliveryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryChannel {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(QueueState::default()),
            ready: Condvar::new(),
            hook: Mutex::new(None),
        }
    }

    pub fn install_receive_hook(&self, hook: Option<ReceiveHook>) -> Result<()> {
        let hook = hook.ok_or(RtpError::InvalidValue("receive hook is None"))?;
        *self.hook.lock()? = Some(hook);
        Ok(())
    }

    pub fn has_hook(&self) -> bool {
        self.hook
            .lock()
            .map(|h| h.is_some())
            .unwrap_or_else(|p| p.into_inner().is_some())
    }

    /// Delivers one frame to the hook or the queue.
    pub fn return_frame(&self, frame: Frame) {
        let mut hook = self.hook.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(hook) = hook.as_mut() {
            hook(frame);
            return;
        }
        drop(hook);

        let mut q = self.lock_queue();
        q.frames.push_back(frame);
        drop(q);
        self.ready.notify_one();
    }

    /// Blocks until a frame is queued or the channel closes.
    pub fn pull_frame(&self) -> Option<Frame> {
        let mut q = self.lock_queue();
        loop {
            if let Some(frame) = q.frames.pop_front() {
                return Some(frame);
            }
            if q.closed {
                return None;
            }
            q = self.ready.wait(q).unwrap_or_else(|p| p.into_inner());
        }
    }

    /// Like [`pull_frame`](Self::pull_frame) but gives up after `timeout`.
    /// A zero timeout polls.
    pub fn pull_frame_timeout(&self, timeout: Duration) -> Option<Frame> {
        let deadline = Instant::now() + timeout;
        let mut q = self.lock_queue();
        loop {
            if let Some(frame) = q.frames.pop_front() {
                return Some(frame);
            }
            if q.closed {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            q = self
                .ready
                .wait_timeout(q, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|p| p.into_inner().0);
        }
    }

    /// Wakes every waiter. Buffered frames can still be pulled.
    pub fn close(&self) {
        self.lock_queue().closed = true;
        self.ready.notify_all();
    }

    pub fn reopen(&self) {
        self.lock_queue().closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.lock_queue().closed
    }

    pub fn queued(&self) -> usize {
        self.lock_queue().frames.len()
    }

    fn lock_queue(&self) -> MutexGuard<'_, QueueState> {
        self.queue.lock().unwrap_or_else(|p| p.into_inner())
    }
}
