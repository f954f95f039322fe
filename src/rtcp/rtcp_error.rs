use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcpError {
    TooShort,
    BadVersion(u8),
    UnknownPacketType(u8),
    Truncated,
    SdesItemTooShort,
    SdesItemTooLong,
    TooManyReportBlocks(usize),
    TooManyByeSources(usize),
    TooManySdesChunks(usize),
    /// Rendered packet does not fit the 16-bit length field.
    Oversized(usize),
}

impl fmt::Display for RtcpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RtcpError::*;
        match self {
            TooShort => write!(f, "buffer too short"),
            BadVersion(v) => write!(f, "bad RTCP version: {v}"),
            UnknownPacketType(pt) => write!(f, "unknown RTCP packet type: {pt}"),
            Truncated => write!(f, "truncated RTCP structure"),
            SdesItemTooShort => write!(f, "SDES item too short"),
            SdesItemTooLong => write!(f, "SDES item longer than 255 bytes"),
            TooManyReportBlocks(n) => write!(f, "{n} report blocks, at most 31 fit"),
            TooManyByeSources(n) => write!(f, "{n} BYE sources, at most 31 fit"),
            TooManySdesChunks(n) => write!(f, "{n} SDES chunks, at most 31 fit"),
            Oversized(n) => write!(f, "RTCP packet of {n} bytes overflows the length field"),
        }
    }
}

impl std::error::Error for RtcpError {}
