use byteorder::{BigEndian, ByteOrder};

use super::{
    common_header::{CommonHeader, finish_packet},
    packet_type::{PT_SR, RtcpPacketType},
    report_block::{REPORT_BLOCK_SIZE, ReportBlock},
    rtcp_error::RtcpError,
    rtcp_packet::RtcpPacket,
    sender_info::{SENDER_INFO_SIZE, SenderInfo},
};

pub(crate) const MAX_RC: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SenderReport {
    pub ssrc: u32,
    pub info: SenderInfo,
    pub reports: Vec<ReportBlock>,
    /// Profile-specific extension trailing the report blocks.
    pub profile_ext: Vec<u8>,
}

impl SenderReport {
    pub fn new(ssrc: u32, info: SenderInfo, reports: Vec<ReportBlock>) -> Self {
        Self {
            ssrc,
            info,
            reports,
            profile_ext: Vec::new(),
        }
    }
}

impl RtcpPacketType for SenderReport {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RtcpError> {
        if self.reports.len() > MAX_RC {
            return Err(RtcpError::TooManyReportBlocks(self.reports.len()));
        }
        let start = out.len();
        CommonHeader::new(self.reports.len() as u8, PT_SR, false).encode_into(out);
        out.extend_from_slice(&self.ssrc.to_be_bytes());
        self.info.encode_into(out);
        for rb in &self.reports {
            rb.encode_into(out);
        }
        out.extend_from_slice(&self.profile_ext);
        finish_packet(out, start)
    }

    fn decode(hdr: &CommonHeader, payload: &[u8]) -> Result<RtcpPacket, RtcpError> {
        if payload.len() < 4 + SENDER_INFO_SIZE {
            return Err(RtcpError::TooShort);
        }
        let ssrc = BigEndian::read_u32(&payload[0..4]);
        let info = SenderInfo::decode(&payload[4..])?;
        let idx = 4 + SENDER_INFO_SIZE;
        let rc = usize::from(hdr.rc_or_fmt());
        let reports = ReportBlock::decode_many(&payload[idx..], rc)?;
        let profile_ext = payload[idx + rc * REPORT_BLOCK_SIZE..].to_vec();
        Ok(RtcpPacket::Sr(SenderReport {
            ssrc,
            info,
            reports,
            profile_ext,
        }))
    }
}
