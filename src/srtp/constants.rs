// Key derivation labels (RFC 3711 §4.3.2)
pub const SRTP_LABEL_ENCRYPTION: u8 = 0x00;
pub const SRTP_LABEL_AUTH: u8 = 0x01;
pub const SRTP_LABEL_SALT: u8 = 0x02;

// SRTP_AES128_CM_SHA1_80
pub const MASTER_KEY_LEN: usize = 16;
pub const MASTER_SALT_LEN: usize = 14;
pub const SESSION_KEY_LEN: usize = 16;
pub const SESSION_AUTH_LEN: usize = 20;
pub const SESSION_SALT_LEN: usize = 14;
/// HMAC-SHA1 truncated to 80 bits.
pub const AUTH_TAG_LEN: usize = 10;

pub const REPLAY_WINDOW_SIZE: u64 = 64;
