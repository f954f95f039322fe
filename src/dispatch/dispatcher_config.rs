use std::time::Duration;

use crate::config::{Config, ConfigError};

/// Largest UDP payload. Smaller receive buffers would truncate datagrams.
pub const MIN_RECV_BUFFER: usize = 65_535;

/// Receive-side settings, `[dispatcher]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Largest datagram the receive loop can read. Never below
    /// [`MIN_RECV_BUFFER`].
    pub recv_buffer_size: usize,
    /// Upper bound on one blocking receive. Also bounds how long `stop`
    /// waits when a socket cannot be woken.
    pub read_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: 65_536,
            read_timeout: Duration::from_millis(100),
        }
    }
}

impl DispatcherConfig {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        if let Some(size) = cfg.get_parsed::<usize>("dispatcher", "recv_buffer_size")? {
            out.recv_buffer_size = size.max(MIN_RECV_BUFFER);
        }
        if let Some(ms) = cfg.get_parsed::<u64>("dispatcher", "read_timeout_ms")? {
            out.read_timeout = Duration::from_millis(ms);
        }
        Ok(out)
    }
}
