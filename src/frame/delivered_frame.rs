use super::{
    rtp_frame::{RtpFrame, dealloc_frame},
    zrtp_frame::{ZrtpFrame, dealloc_zrtp_frame},
};
use crate::{rtcp::RtcpPacket, rtp_error::Result};

/// A decoded compound RTCP datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpFrame {
    pub packets: Vec<RtcpPacket>,
}

/// Everything the receive dispatcher can hand to the application.
#[derive(Debug)]
pub enum Frame {
    Rtp(Box<RtpFrame>),
    Rtcp(RtcpFrame),
    Zrtp(Box<ZrtpFrame>),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Rtp(_) => "rtp",
            Frame::Rtcp(_) => "rtcp",
            Frame::Zrtp(_) => "zrtp",
        }
    }

    pub fn ssrc(&self) -> Option<u32> {
        match self {
            Frame::Rtp(f) => Some(f.header.ssrc),
            Frame::Rtcp(f) => f.packets.first().and_then(RtcpPacket::sender_ssrc),
            Frame::Zrtp(f) => Some(f.ssrc),
        }
    }

    pub fn as_rtp(&self) -> Option<&RtpFrame> {
        match self {
            Frame::Rtp(f) => Some(f),
            _ => None,
        }
    }

    pub fn into_rtp(self) -> Option<Box<RtpFrame>> {
        match self {
            Frame::Rtp(f) => Some(f),
            _ => None,
        }
    }

    pub fn into_zrtp(self) -> Option<Box<ZrtpFrame>> {
        match self {
            Frame::Zrtp(f) => Some(f),
            _ => None,
        }
    }

    /// Releases the frame through the matching dealloc path.
    pub fn dealloc(self) -> Result<()> {
        match self {
            Frame::Rtp(f) => dealloc_frame(Some(f)),
            Frame::Zrtp(f) => dealloc_zrtp_frame(Some(f)),
            Frame::Rtcp(_) => Ok(()),
        }
    }
}
