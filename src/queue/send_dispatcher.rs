use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, SyncSender},
    },
    thread::{self, JoinHandle},
};

use super::{dealloc_hook::DeallocSlot, outgoing_chunk::OutgoingChunk, transmitter::Transmitter};
use crate::{
    log::LogSink,
    rtp_error::{Result, RtpError},
    sink_debug, sink_error, sink_warn,
};

/// One fragmented frame waiting for the send worker.
pub(crate) struct SendJob {
    pub buf: Vec<u8>,
    pub chunks: Vec<OutgoingChunk>,
    /// The buffer came from the caller and goes back through the dealloc
    /// hook. Private copies are just dropped.
    pub owned: bool,
}

/// Background sender fed through a bounded queue.
///
/// A full queue blocks the producer. Dropping or [`shutdown`](Self::shutdown)
/// lets the worker drain what is queued and joins it.
pub struct SendDispatcher {
    tx: Option<SyncSender<SendJob>>,
    handle: Option<JoinHandle<()>>,
    dealloc: Arc<DeallocSlot>,
    logger: Arc<dyn LogSink>,
}

impl SendDispatcher {
    pub(crate) fn spawn(
        transmitter: Transmitter,
        capacity: usize,
        dealloc: Arc<DeallocSlot>,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let worker_dealloc = dealloc.clone();
        let worker_logger = logger.clone();
        let handle = thread::Builder::new()
            .name("rtp-send-dispatcher".into())
            .spawn(move || run(transmitter, rx, &worker_dealloc, worker_logger.as_ref()))
            .map_err(|e| {
                sink_error!(logger, "[SendDispatcher] spawn failed: {}", e);
                RtpError::ResourceCreation(e)
            })?;
        sink_debug!(logger, "[SendDispatcher] started, capacity={}", capacity.max(1));
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            dealloc,
            logger,
        })
    }

    /// Queues a job, blocking while the queue is full.
    pub(crate) fn submit(&self, job: SendJob) -> Result<()> {
        let Some(tx) = self.tx.as_ref() else {
            self.give_back(job);
            return Err(RtpError::NotRunning);
        };
        tx.send(job).map_err(|mpsc::SendError(job)| {
            sink_warn!(self.logger, "[SendDispatcher] worker gone, frame not queued");
            self.give_back(job);
            RtpError::NotRunning
        })
    }

    /// Closes the queue, lets the worker drain it and joins the thread.
    pub fn shutdown(&mut self) {
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                sink_error!(self.logger, "[SendDispatcher] worker panicked");
            }
            sink_debug!(self.logger, "[SendDispatcher] stopped");
        }
    }

    fn give_back(&self, job: SendJob) {
        if job.owned {
            self.dealloc.release(job.buf);
        }
    }
}

impl Drop for SendDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    mut transmitter: Transmitter,
    rx: Receiver<SendJob>,
    dealloc: &DeallocSlot,
    logger: &dyn LogSink,
) {
    while let Ok(job) = rx.recv() {
        if let Err(e) = transmitter.send_chunks(&job.buf, &job.chunks) {
            sink_warn!(logger, "[SendDispatcher] frame dropped: {}", e);
        }
        if job.owned {
            dealloc.release(job.buf);
        }
    }
}
