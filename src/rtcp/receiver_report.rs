use byteorder::{BigEndian, ByteOrder};

use super::{
    common_header::{CommonHeader, finish_packet},
    packet_type::{PT_RR, RtcpPacketType},
    report_block::{REPORT_BLOCK_SIZE, ReportBlock},
    rtcp_error::RtcpError,
    rtcp_packet::RtcpPacket,
    sender_report::MAX_RC,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiverReport {
    pub ssrc: u32,
    pub reports: Vec<ReportBlock>,
    pub profile_ext: Vec<u8>,
}

impl ReceiverReport {
    pub fn new(ssrc: u32, reports: Vec<ReportBlock>) -> Self {
        Self {
            ssrc,
            reports,
            profile_ext: Vec::new(),
        }
    }
}

impl RtcpPacketType for ReceiverReport {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.reports.len() > MAX_RC {
            return Err(RtcpError::TooManyReportBlocks(self.reports.len()));
        }
        let start = out.len();
        CommonHeader::new(self.reports.len() as u8, PT_RR, false).encode_into(out);
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        for rb in &self.reports {
            rb.encode_into(out);
        }
        out.extend_from_slice(&self.profile_ext);
        finish_packet(out, start)
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        if payload.len() < 4 {
            return Err(RtcpError::TooShort);
        }
        let ssrc = BigEndian::read_u32(&payload[0..4]);
        let rc = usize::from(hdr.rc_or_fmt());
        let reports = ReportBlock::decode_many(&payload[4..], rc)?;
        let profile_ext = payload[4 + rc * REPORT_BLOCK_SIZE..].to_vec();
        Ok(RtcpPacket::Rr(ReceiverReport {
            ssrc,
            reports,
            profile_ext,
        }))
    }
}
