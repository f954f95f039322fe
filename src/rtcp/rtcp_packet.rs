use super::{
    app::App,
    bye::Bye,
    common_header::{CommonHeader, RTCP_HEADER_SIZE},
    packet_type::{PT_APP, PT_BYE, PT_RR, PT_SDES, PT_SR, RtcpPacketType},
    receiver_report::ReceiverReport,
    rtcp_error::RtcpError,
    sdes::Sdes,
    sender_report::SenderReport,
};

/// The union of supported RTCP packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcpPacket {
    Sr(SenderReport),
    Rr(ReceiverReport),
    Sdes(Sdes),
    Bye(Bye),
    App(App),
}

impl RtcpPacket {
    /// Decodes a compound RTCP datagram into its packets.
    pub fn decode_compound(buf: &[u8]) -> Result<Vec<RtcpPacket>, RtcpError> {
        let mut out = Vec::new();
        let mut idx = 0usize;
        while idx < buf.len() {
            let (hdr, total) = CommonHeader::decode(&buf[idx..])?;
            let mut body = &buf[idx + RTCP_HEADER_SIZE..idx + total];
            if hdr.padding() {
                let pad = body.last().map_or(0, |&p| usize::from(p));
                if pad == 0 || pad > body.len() {
                    return Err(RtcpError::Truncated);
                }
                body = &body[..body.len() - pad];
            }
            let pkt = match hdr.pt() {
                PT_SR => SenderReport::decode(&hdr, body)?,
                PT_RR => ReceiverReport::decode(&hdr, body)?,
                PT_SDES => Sdes::decode(&hdr, body)?,
                PT_BYE => Bye::decode(&hdr, body)?,
                PT_APP => App::decode(&hdr, body)?,
                other => return Err(RtcpError::UnknownPacketType(other)),
            };
            out.push(pkt);
            idx += total;
        }
        if out.is_empty() {
            return Err(RtcpError::TooShort);
        }
        Ok(out)
    }

    /// Encodes packets back to back into one compound datagram.
    pub fn encode_compound(pkts: &[RtcpPacket]) -> Result<Vec<u8>, RtcpError> {
        let mut out = Vec::new();
        for pkt in pkts {
            pkt.encode_into(&mut out)?;
        }
        Ok(out)
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        match self {
            RtcpPacket::Sr(p) => p.encode_into(out),
            RtcpPacket::Rr(p) => p.encode_into(out),
            RtcpPacket::Sdes(p) => p.encode_into(out),
            RtcpPacket::Bye(p) => p.encode_into(out),
            RtcpPacket::App(p) => p.encode_into(out),
        }
    }

    /// SSRC of the packet's originator, if the packet type names one.
    pub fn sender_ssrc(&self) -> Option<u32> {
        match self {
            RtcpPacket::Sr(p) => Some(p.ssrc),
            RtcpPacket::Rr(p) => Some(p.ssrc),
            RtcpPacket::Sdes(p) => p.chunks.first().map(|c| c.ssrc),
            RtcpPacket::Bye(p) => p.sources.first().copied(),
            RtcpPacket::App(p) => Some(p.ssrc),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::rtcp::{report_block::ReportBlock, sender_info::SenderInfo};

    fn sample_compound() -> Vec<RtcpPacket> {
        vec![
            RtcpPacket::Sr(SenderReport::new(
                0x1111_2222,
                SenderInfo {
                    ntp_msw: 1,
                    ntp_lsw: 2,
                    rtp_ts: 3,
                    packet_count: 4,
                    octet_count: 5,
                },
                vec![ReportBlock {
                    ssrc: 0x3333_4444,
                    cumulative_lost: 2,
                    ..ReportBlock::default()
                }],
            )),
            RtcpPacket::Sdes(Sdes::cname(0x1111_2222, "alice@host")),
            RtcpPacket::Bye(Bye::single(0x1111_2222, Some("done".into()))),
            RtcpPacket::App(App {
                subtype: 3,
                name: *b"TEST",
                ssrc: 0x1111_2222,
                data: vec![1, 2, 3, 4],
            }),
        ]
    }

    #[test]
    fn compound_packets_survive_encode_and_decode() {
        let pkts = sample_compound();
        let wire = RtcpPacket::encode_compound(&pkts).unwrap();
        assert_eq!(RtcpPacket::decode_compound(&wire).unwrap(), pkts);
        assert_eq!(pkts[0].sender_ssrc(), Some(0x1111_2222));
    }

    #[test]
    fn feedback_types_are_rejected() {
        // RTPFB generic NACK header with one FCI word
        let wire = [0x81, 205, 0, 3, 0, 0, 0, 1, 0, 0, 0, 2, 0, 5, 0, 0];
        assert_eq!(
            RtcpPacket::decode_compound(&wire),
            Err(RtcpError::UnknownPacketType(205))
        );
    }

    #[test]
    fn trailing_partial_packet_is_an_error() {
        let mut wire = RtcpPacket::encode_compound(&sample_compound()[..1]).unwrap();
        wire.extend_from_slice(&[0x80, 201]);
        assert_eq!(RtcpPacket::decode_compound(&wire), Err(RtcpError::TooShort));
    }

    #[test]
    fn padded_packet_strips_padding() {
        let rr = RtcpPacket::Rr(ReceiverReport::new(9, vec![]));
        let mut wire = RtcpPacket::encode_compound(std::slice::from_ref(&rr)).unwrap();
        wire[0] |= 0x20;
        wire.extend_from_slice(&[0, 0, 0, 4]);
        wire[3] += 1;
        assert_eq!(RtcpPacket::decode_compound(&wire).unwrap(), vec![rr]);
    }
}
