use bytes::Bytes;

use super::rce_flags::RceFlags;
use crate::{frame::Frame, rtp_error::Result};

/// First-stage interpreter of a raw datagram.
///
/// Returns `Ok(Some(frame))` when the datagram belongs to this handler's
/// packet family, `Ok(None)` to let the next primary try, and `Err` when the
/// datagram is recognized but malformed. An error discards the datagram.
pub trait PacketHandler: Send + Sync {
    fn handle(&self, dgram: &Bytes, flags: RceFlags) -> Result<Option<Frame>>;
}

/// Post-processor run on frames its primary claimed.
///
/// The slot may be transformed in place or emptied to consume the frame.
/// An auxiliary that receives an empty slot must leave it alone.
pub trait AuxHandler: Send + Sync {
    fn handle(&self, flags: RceFlags, frame: &mut Option<Frame>) -> Result<()>;
}

impl<F> PacketHandler for F
where
    F: Fn(&Bytes, RceFlags) -> Result<Option<Frame>> + Send + Sync,
{
    fn handle(&self, dgram: &Bytes, flags: RceFlags) -> Result<Option<Frame>> {
        self(dgram, flags)
    }
}

impl<F> AuxHandler for F
where
    F: Fn(RceFlags, &mut Option<Frame>) -> Result<()> + Send + Sync,
{
    fn handle(&self, flags: RceFlags, frame: &mut Option<Frame>) -> Result<()> {
        self(flags, frame)
    }
}

/// Boxes a closure as a primary handler.
pub fn primary_fn<F>(f: F) -> Box<dyn PacketHandler>
where
    F: Fn(&Bytes, RceFlags) -> Result<Option<Frame>> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Boxes a closure as an auxiliary handler.
pub fn aux_fn<F>(f: F) -> Box<dyn AuxHandler>
where
    F: Fn(RceFlags, &mut Option<Frame>) -> Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}
