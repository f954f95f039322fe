use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds between the NTP epoch (1900) and the Unix epoch.
const NTP_UNIX_EPOCH_DIFF: u64 = 2_208_988_800;

/// Current wall clock as an NTP timestamp `(seconds, fraction)`.
pub fn ntp_now() -> (u32, u32) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0));
    let secs = now.as_secs() + NTP_UNIX_EPOCH_DIFF;
    let frac = (u64::from(now.subsec_nanos()) << 32) / 1_000_000_000u64;
    (secs as u32, frac as u32)
}

/// Middle 32 bits of a 64-bit NTP timestamp, as used by LSR and DLSR.
pub fn ntp_compact(secs: u32, frac: u32) -> u32 {
    ((secs & 0xFFFF) << 16) | (frac >> 16)
}

pub fn now_ntp_compact() -> u32 {
    let (s, f) = ntp_now();
    ntp_compact(s, f)
}
