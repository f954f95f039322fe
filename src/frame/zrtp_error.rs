use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZrtpError {
    TooShort,
    BadMagic(u32),
    EmptyPayload,
}

impl fmt::Display for ZrtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZrtpError::TooShort => write!(f, "buffer too short for ZRTP header"),
            ZrtpError::BadMagic(m) => write!(f, "bad ZRTP magic cookie: {m:#010x}"),
            ZrtpError::EmptyPayload => write!(f, "ZRTP payload must not be empty"),
        }
    }
}

impl std::error::Error for ZrtpError {}
