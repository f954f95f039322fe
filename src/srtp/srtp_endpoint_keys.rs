use super::{
    constants::{MASTER_KEY_LEN, MASTER_SALT_LEN},
    srtp_error::SrtpError,
};

/// Master key and salt for one direction of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrtpEndpointKeys {
    pub master_key: Vec<u8>,
    pub master_salt: Vec<u8>,
}

impl SrtpEndpointKeys {
    pub fn new(master_key: Vec<u8>, master_salt: Vec<u8>) -> Result<Self, SrtpError> {
        let keys = Self {
            master_key,
            master_salt,
        };
        keys.validate()?;
        Ok(keys)
    }

    pub fn validate(&self) -> Result<(), SrtpError> {
        if self.master_key.len() != MASTER_KEY_LEN {
            return Err(SrtpError::BadKeyLength {
                what: "master key",
                len: self.master_key.len(),
            });
        }
        if self.master_salt.len() != MASTER_SALT_LEN {
            return Err(SrtpError::BadKeyLength {
                what: "master salt",
                len: self.master_salt.len(),
            });
        }
        Ok(())
    }
}
