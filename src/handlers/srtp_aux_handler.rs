use std::sync::{Arc, Mutex};

use crate::{
    dispatch::{AuxHandler, RceFlags},
    frame::{Frame, RTP_HEADER_SIZE, RtpFrame, RtpParseError},
    log::LogSink,
    rtp_error::{Result, RtpError},
    sink_debug,
    srtp::{SrtpContext, SrtpEndpointKeys},
};

/// Authenticates and decrypts RTP frames claimed by the RTP primary.
///
/// The decrypted payload is copied out of the datagram, which is released,
/// and padding is stripped. A frame that fails authentication or the replay
/// check is consumed.
pub struct SrtpAuxHandler {
    ctx: Mutex<SrtpContext>,
    logger: Arc<dyn LogSink>,
}

impl SrtpAuxHandler {
    pub fn new(logger: Arc<dyn LogSink>, inbound: &SrtpEndpointKeys) -> Result<Self> {
        let ctx = SrtpContext::new(logger.clone(), inbound)?;
        Ok(Self {
            ctx: Mutex::new(ctx),
            logger,
        })
    }

    fn decrypt(&self, frame: &mut RtpFrame) -> Result<()> {
        let dgram = frame
            .dgram()
            .ok_or(RtpError::InvalidValue("SRTP frame has no datagram"))?;
        let mut plain = dgram.to_vec();
        self.ctx.lock()?.unprotect(&mut plain)?;

        let header_len = RTP_HEADER_SIZE
            + frame.csrc.as_ref().map_or(0, |c| c.len() * 4)
            + frame.ext.as_ref().map_or(0, |e| e.wire_len());
        if plain.len() < header_len {
            return Err(RtpParseError::TooShort.into());
        }

        let mut end = plain.len();
        let mut padding_len = 0;
        if frame.header.padding {
            let pad = usize::from(plain[end - 1]);
            if pad == 0 || pad > end - header_len {
                return Err(RtpParseError::PaddingTooShort.into());
            }
            end -= pad;
            padding_len = pad;
        }
        plain.truncate(end);
        plain.drain(..header_len);

        frame.set_payload(plain);
        frame.padding_len = padding_len;
        Ok(())
    }
}

impl AuxHandler for SrtpAuxHandler {
    fn handle(&self, _flags: RceFlags, frame: &mut Option<Frame>) -> Result<()> {
        let Some(Frame::Rtp(rtp)) = frame.as_mut() else {
            return Ok(());
        };
        if let Err(e) = self.decrypt(rtp) {
            sink_debug!(
                self.logger,
                "[SRTP] dropping ssrc={:#x} seq={}: {}",
                rtp.header.ssrc,
                rtp.header.sequence_number,
                e
            );
            *frame = None;
            return Err(e);
        }
        Ok(())
    }
}
