use super::media_format::MediaFormat;
use crate::{
    config::{Config, ConfigError},
    frame::{MAX_PAYLOAD, RTP_HEADER_SIZE},
};

/// Send-side settings, `[sender]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    /// Largest datagram the sender writes, RTP header included.
    pub mtu: usize,
    pub send_queue_capacity: usize,
    /// Transmit from a background worker instead of inside `push_frame`.
    pub use_send_dispatcher: bool,
    pub payload_type: u8,
    pub clock_rate: u32,
    pub format: MediaFormat,
    /// Fixed SSRC. Random when unset.
    pub ssrc: Option<u32>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            mtu: RTP_HEADER_SIZE + MAX_PAYLOAD,
            send_queue_capacity: 64,
            use_send_dispatcher: false,
            payload_type: 96,
            clock_rate: 90_000,
            format: MediaFormat::Generic,
            ssrc: None,
        }
    }
}

impl SenderConfig {
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let mut out = Self::default();
        if let Some(mtu) = cfg.get_parsed::<usize>("sender", "mtu")? {
            out.mtu = mtu;
        }
        if let Some(cap) = cfg.get_parsed::<usize>("sender", "send_queue_capacity")? {
            out.send_queue_capacity = cap.max(1);
        }
        if let Some(on) = cfg.get_parsed::<bool>("sender", "use_send_dispatcher")? {
            out.use_send_dispatcher = on;
        }
        if let Some(pt) = cfg.get_parsed::<u8>("sender", "payload_type")? {
            if pt > 127 {
                return Err(ConfigError::InvalidValue {
                    section: "sender".into(),
                    key: "payload_type".into(),
                    value: pt.to_string(),
                });
            }
            out.payload_type = pt;
        }
        if let Some(rate) = cfg.get_parsed::<u32>("sender", "clock_rate")? {
            out.clock_rate = rate.max(1);
        }
        if let Some(format) = cfg.get_parsed::<MediaFormat>("sender", "format")? {
            out.format = format;
        }
        out.ssrc = cfg.get_parsed::<u32>("sender", "ssrc")?;
        Ok(out)
    }

    /// RTP payload budget per datagram after the header and `overhead`
    /// trailing bytes (the SRTP tag).
    pub fn max_payload(&self, overhead: usize) -> usize {
        self.mtu.saturating_sub(RTP_HEADER_SIZE + overhead)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn reads_sender_section() {
        let cfg = Config::parse(
            "[sender]\nmtu = 1200\nuse_send_dispatcher = true\nformat = pcm:2\npayload_type = 0\nclock_rate = 8000\nssrc = 42\n",
        );
        let sc = SenderConfig::from_config(&cfg).unwrap();
        assert_eq!(sc.mtu, 1200);
        assert!(sc.use_send_dispatcher);
        assert_eq!(sc.format, MediaFormat::Pcm { bytes_per_sample: 2 });
        assert_eq!((sc.payload_type, sc.clock_rate, sc.ssrc), (0, 8000, Some(42)));
        assert_eq!(sc.max_payload(10), 1200 - 12 - 10);
        assert_eq!(sc.send_queue_capacity, 64);
    }

    #[test]
    fn defaults_fit_one_max_payload() {
        let sc = SenderConfig::from_config(&Config::empty()).unwrap();
        assert_eq!(sc, SenderConfig::default());
        assert_eq!(sc.max_payload(0), MAX_PAYLOAD);
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "[sender]\npayload_type = 200\n",
            "[sender]\nformat = vp9\n",
            "[sender]\nuse_send_dispatcher = maybe\n",
        ] {
            assert!(SenderConfig::from_config(&Config::parse(text)).is_err(), "{text}");
        }
    }
}
