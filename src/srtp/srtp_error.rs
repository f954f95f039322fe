use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrtpError {
    PacketTooShort(usize),
    /// CSRC list or header extension runs past the end of the packet.
    HeaderTooShort,
    BadKeyLength { what: &'static str, len: usize },
    Replay { ssrc: u32, seq: u16 },
    AuthFailed { ssrc: u32, seq: u16 },
}

impl fmt::Display for SrtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SrtpError::*;
        match self {
            PacketTooShort(n) => write!(f, "packet of {n} bytes too short for SRTP"),
            HeaderTooShort => write!(f, "RTP header runs past the packet end"),
            BadKeyLength { what, len } => write!(f, "bad {what} length: {len}"),
            Replay { ssrc, seq } => write!(f, "replayed packet ssrc={ssrc:#x} seq={seq}"),
            AuthFailed { ssrc, seq } => {
                write!(f, "authentication tag mismatch ssrc={ssrc:#x} seq={seq}")
            }
        }
    }
}

impl std::error::Error for SrtpError {}
