use super::srtp_endpoint_keys::SrtpEndpointKeys;

/// Keying for both directions. Key exchange happens elsewhere.
#[derive(Debug, Clone)]
pub struct SrtpSessionConfig {
    pub outbound: SrtpEndpointKeys,
    pub inbound: SrtpEndpointKeys,
}

impl SrtpSessionConfig {
    pub fn new(outbound: SrtpEndpointKeys, inbound: SrtpEndpointKeys) -> Self {
        Self { outbound, inbound }
    }

    /// Configuration of the remote end: directions swapped.
    pub fn mirrored(&self) -> Self {
        Self {
            outbound: self.inbound.clone(),
            inbound: self.outbound.clone(),
        }
    }
}
