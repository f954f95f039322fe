use std::{collections::HashMap, sync::Arc};

use byteorder::{BigEndian, ByteOrder};

use super::{
    constants::AUTH_TAG_LEN,
    crypto::{apply_keystream, auth_tag, compute_iv, constant_time_eq, rtp_header_len},
    replay_window::ReplayWindow,
    session_keys::SessionKeys,
    srtp_endpoint_keys::SrtpEndpointKeys,
    srtp_error::SrtpError,
};
use crate::{log::LogSink, sink_debug, sink_trace, sink_warn};

/// Rollover and replay state for one SSRC.
#[derive(Debug, Default)]
struct SsrcState {
    roc: u32,
    last_seq: Option<u16>,
    replay: ReplayWindow,
}

impl SsrcState {
    /// Sender side: the ROC advances when the sequence number wraps.
    fn next_send_roc(&mut self, seq: u16) -> u32 {
        if let Some(last) = self.last_seq
            && seq < last
            && last - seq > 0x8000
        {
            self.roc = self.roc.wrapping_add(1);
        }
        self.last_seq = Some(seq);
        self.roc
    }

    /// Receiver side guess (RFC 3711 §3.3.1). State is only committed after
    /// the packet authenticates.
    fn estimate_roc(&self, seq: u16) -> u32 {
        let Some(last) = self.last_seq else {
            return self.roc;
        };
        let delta = i32::from(seq) - i32::from(last);
        if delta < -0x8000 {
            self.roc.wrapping_add(1)
        } else if delta > 0x8000 {
            self.roc.wrapping_sub(1)
        } else {
            self.roc
        }
    }

    fn commit(&mut self, roc: u32, seq: u16, index: u64) {
        let newer = match self.last_seq {
            None => true,
            Some(last) => ((u64::from(self.roc) << 16) | u64::from(last)) < index,
        };
        if newer {
            self.roc = roc;
            self.last_seq = Some(seq);
        }
        self.replay.record(index);
    }
}

/// SRTP_AES128_CM_SHA1_80 for one direction of a stream.
pub struct SrtpContext {
    logger: Arc<dyn LogSink>,
    keys: SessionKeys,
    streams: HashMap<u32, SsrcState>,
}

impl SrtpContext {
    pub fn new(logger: Arc<dyn LogSink>, master_keys: &SrtpEndpointKeys) -> Result<Self, SrtpError> {
        let keys = SessionKeys::derive(master_keys)?;
        sink_debug!(logger, "[SRTP] session keys derived");
        Ok(Self {
            logger,
            keys,
            streams: HashMap::new(),
        })
    }

    /// Encrypts the payload of an RTP packet in place and appends the tag.
    pub fn protect(&mut self, packet: &mut Vec<u8>) -> Result<(), SrtpError> {
        let header_len = rtp_header_len(packet)?;
        let seq = BigEndian::read_u16(&packet[2..4]);
        let ssrc = BigEndian::read_u32(&packet[8..12]);
        let roc = self.streams.entry(ssrc).or_default().next_send_roc(seq);
        let index = (u64::from(roc) << 16) | u64::from(seq);

        let iv = compute_iv(&self.keys.salt, ssrc, index);
        apply_keystream(&self.keys.enc_key, &iv, &mut packet[header_len..])?;
        let tag = auth_tag(&self.keys.auth_key, packet, roc)?;
        packet.extend_from_slice(&tag[..AUTH_TAG_LEN]);

        sink_trace!(
            self.logger,
            "[SRTP] protected ssrc={:#x} seq={} roc={} len={}",
            ssrc,
            seq,
            roc,
            packet.len()
        );
        Ok(())
    }

    /// Authenticates, replay-checks and decrypts an SRTP packet in place.
    /// On success the tag is removed; on failure the packet is left as is.
    pub fn unprotect(&mut self, packet: &mut Vec<u8>) -> Result<(), SrtpError> {
        if packet.len() < 12 + AUTH_TAG_LEN {
            return Err(SrtpError::PacketTooShort(packet.len()));
        }
        let tag_start = packet.len() - AUTH_TAG_LEN;
        let seq = BigEndian::read_u16(&packet[2..4]);
        let ssrc = BigEndian::read_u32(&packet[8..12]);

        // unknown sources are only tracked once a packet authenticates
        let fresh = SsrcState::default();
        let state = self.streams.get(&ssrc).unwrap_or(&fresh);
        let roc = state.estimate_roc(seq);
        let index = (u64::from(roc) << 16) | u64::from(seq);

        if state.replay.is_replay(index) {
            sink_warn!(self.logger, "[SRTP] replay ssrc={:#x} seq={}", ssrc, seq);
            return Err(SrtpError::Replay { ssrc, seq });
        }

        let (content, received) = packet.split_at(tag_start);
        let computed = auth_tag(&self.keys.auth_key, content, roc)?;
        if !constant_time_eq(&computed[..AUTH_TAG_LEN], received) {
            sink_warn!(
                self.logger,
                "[SRTP] auth tag mismatch ssrc={:#x} seq={} roc={}",
                ssrc,
                seq,
                roc
            );
            return Err(SrtpError::AuthFailed { ssrc, seq });
        }

        packet.truncate(tag_start);
        let header_len = rtp_header_len(packet)?;
        let iv = compute_iv(&self.keys.salt, ssrc, index);
        apply_keystream(&self.keys.enc_key, &iv, &mut packet[header_len..])?;
        self.streams.entry(ssrc).or_default().commit(roc, seq, index);

        sink_trace!(self.logger, "[SRTP] unprotected ssrc={:#x} seq={}", ssrc, seq);
        Ok(())
    }
}
