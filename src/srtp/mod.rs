//! SRTP (RFC 3711), profile `SRTP_AES128_CM_SHA1_80`.

pub mod constants;
mod crypto;
mod replay_window;
pub mod session_keys;
pub mod srtp_context;
pub mod srtp_endpoint_keys;
pub mod srtp_error;
pub mod srtp_session_config;

pub use srtp_context::SrtpContext;
pub use srtp_endpoint_keys::SrtpEndpointKeys;
pub use srtp_error::SrtpError;
pub use srtp_session_config::SrtpSessionConfig;
