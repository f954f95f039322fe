//! A ready-made bidirectional stream: receive dispatcher with the built-in
//! handlers plus a sender, on one socket.

pub mod media_stream;
pub mod stream_config;

pub use media_stream::{MediaStream, StreamHandlers};
pub use stream_config::StreamConfig;
