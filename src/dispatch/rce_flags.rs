use std::ops::BitOr;

/// Receive-context flags passed to every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RceFlags(u32);

impl RceFlags {
    pub const NONE: Self = Self(0);
    /// Datagrams are SRTP protected. Primaries leave padding for the
    /// SRTP auxiliary to strip after decryption.
    pub const SRTP: Self = Self(1 << 0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for RceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
