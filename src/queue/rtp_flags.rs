use std::ops::BitOr;

/// Per-call send flags for [`Sender::push_frame`](super::Sender::push_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtpFlags(u32);

impl RtpFlags {
    pub const NONE: Self = Self(0);
    /// Take a private copy of the caller's buffer before sending.
    pub const COPY: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for RtpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
