use std::fmt;

/// Identifies a primary handler and its auxiliary chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerKey(u32);

impl HandlerKey {
    /// Returned when installation fails. Never names an entry.
    pub const INVALID: Self = Self(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
