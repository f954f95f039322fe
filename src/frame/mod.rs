//! Frame model: RTP frames, header extensions, ZRTP handshake frames and
//! the [`Frame`] union the dispatcher delivers.

pub mod delivered_frame;
pub mod ext_header;
pub mod rtp_frame;
pub mod rtp_header;
pub mod rtp_parse_error;
pub mod zrtp_error;
pub mod zrtp_frame;

pub use delivered_frame::{Frame, RtcpFrame};
pub use ext_header::ExtHeader;
pub use rtp_frame::{MAX_PAYLOAD, RtpFrame, dealloc_frame};
pub use rtp_header::{RTP_HEADER_SIZE, RtpHeader};
pub use rtp_parse_error::RtpParseError;
pub use zrtp_frame::{ZRTP_MAGIC, ZrtpFrame, dealloc_zrtp_frame};
