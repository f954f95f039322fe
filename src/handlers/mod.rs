//! Built-in handlers: RTP, RTCP and ZRTP primaries, plus the receive
//! statistics and SRTP auxiliaries.

pub mod ntp_time;
pub mod rtcp_handler;
pub mod rtp_handler;
pub mod rx_stats;
pub mod seq_ext;
pub mod srtp_aux_handler;
pub mod zrtp_handler;

pub use rtcp_handler::RtcpHandler;
pub use rtp_handler::RtpHandler;
pub use rx_stats::{RxSnapshot, RxStats, RxStatsHandler};
pub use srtp_aux_handler::SrtpAuxHandler;
pub use zrtp_handler::ZrtpHandler;
