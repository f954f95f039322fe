use super::{
    constants::{
        SESSION_AUTH_LEN, SESSION_KEY_LEN, SESSION_SALT_LEN, SRTP_LABEL_AUTH,
        SRTP_LABEL_ENCRYPTION, SRTP_LABEL_SALT,
    },
    crypto::aes_cm_prf,
    srtp_endpoint_keys::SrtpEndpointKeys,
    srtp_error::SrtpError,
};

/// Session keys derived from one direction's master key and salt.
pub struct SessionKeys {
    pub(crate) enc_key: [u8; SESSION_KEY_LEN],
    pub(crate) auth_key: [u8; SESSION_AUTH_LEN],
    pub(crate) salt: [u8; SESSION_SALT_LEN],
}

impl SessionKeys {
    pub fn derive(master: &SrtpEndpointKeys) -> Result<Self, SrtpError> {
        master.validate()?;
        let mut keys = Self {
            enc_key: [0; SESSION_KEY_LEN],
            auth_key: [0; SESSION_AUTH_LEN],
            salt: [0; SESSION_SALT_LEN],
        };
        let (key, salt) = (&master.master_key, &master.master_salt);
        aes_cm_prf(key, salt, SRTP_LABEL_ENCRYPTION, &mut keys.enc_key)?;
        aes_cm_prf(key, salt, SRTP_LABEL_AUTH, &mut keys.auth_key)?;
        aes_cm_prf(key, salt, SRTP_LABEL_SALT, &mut keys.salt)?;
        Ok(keys)
    }
}
