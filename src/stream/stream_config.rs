use crate::{
    config::{Config, ConfigError},
    dispatch::DispatcherConfig,
    queue::SenderConfig,
    srtp::SrtpSessionConfig,
};

/// Everything a [`MediaStream`](super::MediaStream) needs besides its socket.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    pub dispatcher: DispatcherConfig,
    pub sender: SenderConfig,
    /// SRTP keys for both directions. Plain RTP when `None`.
    pub srtp: Option<SrtpSessionConfig>,
}

impl StreamConfig {
    /// Reads `[dispatcher]` and `[sender]`. Keys are never read from files.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            dispatcher: DispatcherConfig::from_config(cfg)?,
            sender: SenderConfig::from_config(cfg)?,
            srtp: None,
        })
    }

    pub fn with_srtp(mut self, keys: SrtpSessionConfig) -> Self {
        self.srtp = Some(keys);
        self
    }
}
