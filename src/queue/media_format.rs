use std::{fmt, str::FromStr};

/// How a pushed frame is cut into packets and timestamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaFormat {
    /// Fixed-size chunks sharing the frame timestamp.
    #[default]
    Generic,
    /// Annex-B access units, packetized per RFC 6184.
    H264,
    /// Raw samples. Each chunk is stamped with the time of its first sample.
    Pcm { bytes_per_sample: u16 },
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaFormat::Generic => write!(f, "generic"),
            MediaFormat::H264 => write!(f, "h264"),
            MediaFormat::Pcm { bytes_per_sample } => write!(f, "pcm:{bytes_per_sample}"),
        }
    }
}

impl FromStr for MediaFormat {
    type Err = String;

    /// Accepts `generic`, `h264` and `pcm:<bytes per sample>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "generic" => Ok(MediaFormat::Generic),
            "h264" => Ok(MediaFormat::H264),
            other => {
                let bps = other
                    .strip_prefix("pcm:")
                    .and_then(|n| n.parse::<u16>().ok())
                    .filter(|&n| n > 0)
                    .ok_or_else(|| format!("unknown media format '{other}'"))?;
                Ok(MediaFormat::Pcm {
                    bytes_per_sample: bps,
                })
            }
        }
    }
}
