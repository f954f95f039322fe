//! rustyrtp is the packet pipeline of an RTP/RTCP stack.
//!
//! On the receive side a background dispatcher reads datagrams, offers each
//! one to an ordered chain of primary handlers and runs the claiming handler's
//! auxiliary chain before delivering the frame through a hook or a pull queue.
//! On the send side frames are fragmented into packet-sized chunks, stamped
//! with sequence numbers and timestamps, optionally SRTP protected, and sent
//! inline or from a send worker with a bounded queue.
//!
//! The crate is structured into several modules, each responsible for one
//! stage of the pipeline.

/// Handles configuration loading and typed views of it.
pub mod config;
/// Receive dispatcher, handler registry and delivery channel.
pub mod dispatch;
/// RTP, ZRTP and delivered frame types.
pub mod frame;
/// Built-in primary and auxiliary handlers.
pub mod handlers;
/// Logging utilities.
pub mod log;
/// Send side: frame queue, RTP context and send dispatcher.
pub mod queue;
/// RTCP (RTP Control Protocol) packet parsing and building.
pub mod rtcp;
/// Crate-wide error type.
pub mod rtp_error;
/// Datagram socket collaborators.
pub mod socket;
/// SRTP (Secure Real-time Transport Protocol) implementation.
pub mod srtp;
/// Bidirectional stream glue.
pub mod stream;

pub use dispatch::{HandlerKey, PktDispatcher, RceFlags};
pub use frame::{Frame, RtpFrame, ZrtpFrame};
pub use queue::{RtpFlags, Sender};
pub use rtp_error::{Result, RtpError};
pub use stream::{MediaStream, StreamConfig};
