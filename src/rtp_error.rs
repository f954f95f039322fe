use std::{fmt, io, sync::PoisonError};

use crate::{
    frame::{rtp_parse_error::RtpParseError, zrtp_error::ZrtpError},
    rtcp::rtcp_error::RtcpError,
    srtp::srtp_error::SrtpError,
};

/// Status returned by every fallible operation of the packet pipeline.
///
/// None of these conditions is fatal to the process; the caller decides how
/// to escalate.
#[derive(Debug)]
pub enum RtpError {
    /// Missing handler, empty buffer, unknown key and similar caller mistakes.
    InvalidValue(&'static str),
    /// A buffer reservation failed.
    MemoryError,
    /// The frame cannot be carried even after fragmentation.
    FrameTooLarge { len: usize, max: usize },
    /// The socket refused a chunk. Chunks sent before it are not retracted.
    SendError(io::Error),
    /// Malformed RTP datagram.
    Rtp(RtpParseError),
    /// Malformed RTCP datagram.
    Rtcp(RtcpError),
    /// Malformed ZRTP handshake datagram.
    Zrtp(ZrtpError),
    /// SRTP authentication, replay or keying failure.
    Srtp(SrtpError),
    /// A worker thread could not be spawned or a socket could not be bound.
    ResourceCreation(io::Error),
    /// The worker that would carry the request is gone.
    NotRunning,
    MutexPoisoned,
}

pub type Result<T> = std::result::Result<T, RtpError>;

impl fmt::Display for RtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RtpError::*;
        match self {
            InvalidValue(what) => write!(f, "invalid value: {what}"),
            MemoryError => write!(f, "memory allocation failed"),
            FrameTooLarge { len, max } => {
                write!(f, "frame of {len} bytes exceeds the {max} byte limit")
            }
            SendError(e) => write!(f, "send failed: {e}"),
            Rtp(e) => write!(f, "RTP error: {e}"),
            Rtcp(e) => write!(f, "RTCP error: {e}"),
            Zrtp(e) => write!(f, "ZRTP error: {e}"),
            Srtp(e) => write!(f, "SRTP error: {e}"),
            ResourceCreation(e) => write!(f, "could not create resource: {e}"),
            NotRunning => write!(f, "worker is not running"),
            MutexPoisoned => write!(f, "Mutex poisoned"),
        }
    }
}

impl std::error::Error for RtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RtpError::SendError(e) | RtpError::ResourceCreation(e) => Some(e),
            RtpError::Rtp(e) => Some(e),
            RtpError::Rtcp(e) => Some(e),
            RtpError::Zrtp(e) => Some(e),
            RtpError::Srtp(e) => Some(e),
            _ => None,
        }
    }
}

impl<T> From<PoisonError<T>> for RtpError {
    fn from(_: PoisonError<T>) -> Self {
        RtpError::MutexPoisoned
    }
}

impl From<RtpParseError> for RtpError {
    fn from(e: RtpParseError) -> Self {
        Self::Rtp(e)
    }
}

impl From<RtcpError> for RtpError {
    fn from(e: RtcpError) -> Self {
        Self::Rtcp(e)
    }
}

impl From<ZrtpError> for RtpError {
    fn from(e: ZrtpError) -> Self {
        Self::Zrtp(e)
    }
}

impl From<SrtpError> for RtpError {
    fn from(e: SrtpError) -> Self {
        Self::Srtp(e)
    }
}

impl From<std::collections::TryReserveError> for RtpError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::MemoryError
    }
}
