//! Send side: fragmentation, header stamping and transmission, inline or
//! through the `rtp-send-dispatcher` worker.

mod dealloc_hook;
pub mod frame_queue;
pub mod h264_fragmenter;
pub mod media_format;
pub mod outgoing_chunk;
pub mod rtp_context;
pub mod rtp_flags;
pub mod send_dispatcher;
pub mod send_stats;
pub mod sender;
pub mod sender_config;
pub mod transmitter;

pub use dealloc_hook::DeallocHook;
pub use frame_queue::{FrameQueue, MAX_FRAGMENTS};
pub use media_format::MediaFormat;
pub use outgoing_chunk::OutgoingChunk;
pub use rtp_context::RtpContext;
pub use rtp_flags::RtpFlags;
pub use send_stats::SendCounters;
pub use sender::Sender;
pub use sender_config::SenderConfig;
