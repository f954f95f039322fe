use bytes::Bytes;

use crate::{
    dispatch::{PacketHandler, RceFlags},
    frame::{Frame, ZrtpFrame, zrtp_frame::looks_like_zrtp},
    rtp_error::Result,
};

/// Claims ZRTP handshake datagrams (leading bits zero and the magic cookie).
/// The key exchange itself is left to the application.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZrtpHandler;

impl ZrtpHandler {
    pub fn new() -> Self {
        Self
    }
}

impl PacketHandler for ZrtpHandler {
    fn handle(&self, dgram: &Bytes, _flags: RceFlags) -> Result<Option<Frame>> {
        if !looks_like_zrtp(dgram) {
            return Ok(None);
        }
        Ok(Some(Frame::Zrtp(ZrtpFrame::parse(dgram)?)))
    }
}
