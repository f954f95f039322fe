use std::{collections::BTreeMap, sync::Arc};

use bytes::Bytes;

use super::{
    handler::{AuxHandler, PacketHandler},
    handler_key::HandlerKey,
    rce_flags::RceFlags,
};
use crate::{
    frame::Frame,
    log::LogSink,
    rtp_error::{Result, RtpError},
    sink_debug, sink_error, sink_warn,
};

struct HandlerEntry {
    primary: Box<dyn PacketHandler>,
    auxiliary: Vec<Box<dyn AuxHandler>>,
}

/// What happened to one datagram.
#[derive(Debug)]
pub enum ChainOutcome {
    /// A primary claimed it. The frame is `None` if an auxiliary consumed it.
    Claimed(HandlerKey, Option<Frame>),
    /// A primary recognized the datagram but could not parse it.
    Failed(HandlerKey, RtpError),
    Unclaimed,
}

/// Primary handlers in installation order, each with its auxiliary chain.
///
/// Keys come from a counter that only moves forward, so a key is never
/// handed out twice by the same registry.
pub struct HandlerRegistry {
    entries: BTreeMap<HandlerKey, HandlerEntry>,
    last_key: u32,
    logger: Arc<dyn LogSink>,
}

impl HandlerRegistry {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            entries: BTreeMap::new(),
            last_key: 0,
            logger,
        }
    }

    /// Installs a primary handler and returns its key, or
    /// [`HandlerKey::INVALID`] when `handler` is `None`.
    pub fn install_handler(&mut self, handler: Option<Box<dyn PacketHandler>>) -> HandlerKey {
        let Some(primary) = handler else {
            sink_warn!(self.logger, "[Registry] install_handler called without a handler");
            return HandlerKey::INVALID;
        };
        let Some(next) = self.last_key.checked_add(1) else {
            sink_error!(self.logger, "[Registry] handler keys exhausted");
            return HandlerKey::INVALID;
        };
        self.last_key = next;
        let key = HandlerKey::from_raw(next);
        self.entries.insert(
            key,
            HandlerEntry {
                primary,
                auxiliary: Vec::new(),
            },
        );
        sink_debug!(self.logger, "[Registry] primary handler {} installed", key);
        key
    }

    /// Appends an auxiliary to `key`'s chain.
    pub fn install_aux_handler(
        &mut self,
        key: HandlerKey,
        handler: Option<Box<dyn AuxHandler>>,
    ) -> Result<()> {
        let handler = handler.ok_or(RtpError::InvalidValue("auxiliary handler is None"))?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(RtpError::InvalidValue("no primary handler for key"))?;
        entry.auxiliary.push(handler);
        sink_debug!(
            self.logger,
            "[Registry] auxiliary #{} installed under {}",
            entry.auxiliary.len(),
            key
        );
        Ok(())
    }

    /// Runs `key`'s auxiliaries in order over `frame`. Errors are logged and
    /// the chain goes on.
    pub fn call_aux_handlers(&self, key: HandlerKey, flags: RceFlags, frame: &mut Option<Frame>) {
        let Some(entry) = self.entries.get(&key) else {
            sink_warn!(self.logger, "[Registry] no handlers under {}", key);
            return;
        };
        for (idx, aux) in entry.auxiliary.iter().enumerate() {
            if let Err(e) = aux.handle(flags, frame) {
                sink_warn!(self.logger, "[Registry] auxiliary {} of {} failed: {}", idx, key, e);
            }
        }
    }

    /// Offers `dgram` to the primaries in order. The first claim wins and its
    /// auxiliary chain runs before returning.
    pub fn run_chain(&self, dgram: &Bytes, flags: RceFlags) -> ChainOutcome {
        for (&key, entry) in &self.entries {
            match entry.primary.handle(dgram, flags) {
                Ok(Some(frame)) => {
                    let mut slot = Some(frame);
                    self.call_aux_handlers(key, flags, &mut slot);
                    return ChainOutcome::Claimed(key, slot);
                }
                Ok(None) => continue,
                Err(e) => return ChainOutcome::Failed(key, e),
            }
        }
        ChainOutcome::Unclaimed
    }

    pub fn contains(&self, key: HandlerKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Installed keys in invocation order.
    pub fn keys(&self) -> Vec<HandlerKey> {
        self.entries.keys().copied().collect()
    }

    pub fn aux_count(&self, key: HandlerKey) -> Option<usize> {
        self.entries.get(&key).map(|e| e.auxiliary.len())
    }
}
