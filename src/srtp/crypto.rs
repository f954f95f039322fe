use aes::Aes128;
use aes::cipher::{KeyIvInit, StreamCipher};
use byteorder::{BigEndian, ByteOrder};
use ctr::Ctr128BE;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::{constants::SESSION_SALT_LEN, srtp_error::SrtpError};

pub(super) type HmacSha1 = Hmac<Sha1>;
pub(super) type Aes128Ctr = Ctr128BE<Aes128>;

/// Compares without an early exit on the first mismatching byte.
pub(super) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// AES-CM key derivation (RFC 3711 §4.3.3) with a key derivation rate of 0.
pub(super) fn aes_cm_prf(
    master_key: &[u8],
    master_salt: &[u8],
    label: u8,
    out: &mut [u8],
) -> Result<(), SrtpError> {
    let mut iv = [0u8; 16];
    let n = master_salt.len().min(14);
    iv[..n].copy_from_slice(&master_salt[..n]);
    iv[7] ^= label;
    let mut cipher = Aes128Ctr::new_from_slices(master_key, &iv).map_err(|_| {
        SrtpError::BadKeyLength {
            what: "master key",
            len: master_key.len(),
        }
    })?;
    out.fill(0);
    cipher.apply_keystream(out);
    Ok(())
}

/// Counter-mode IV: salt XOR (ssrc << 64) XOR (index << 16).
pub(super) fn compute_iv(session_salt: &[u8; SESSION_SALT_LEN], ssrc: u32, index: u64) -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[..SESSION_SALT_LEN].copy_from_slice(session_salt);
    for (b, s) in iv[4..8].iter_mut().zip(ssrc.to_be_bytes()) {
        *b ^= s;
    }
    for (b, i) in iv[8..14].iter_mut().zip(&index.to_be_bytes()[2..]) {
        *b ^= i;
    }
    iv
}

pub(super) fn apply_keystream(
    enc_key: &[u8],
    iv: &[u8; 16],
    data: &mut [u8],
) -> Result<(), SrtpError> {
    let mut cipher =
        Aes128Ctr::new_from_slices(enc_key, iv).map_err(|_| SrtpError::BadKeyLength {
            what: "session key",
            len: enc_key.len(),
        })?;
    cipher.apply_keystream(data);
    Ok(())
}

/// Full HMAC-SHA1 over the authenticated portion followed by the ROC.
pub(super) fn auth_tag(auth_key: &[u8], content: &[u8], roc: u32) -> Result<[u8; 20], SrtpError> {
    let mut mac = HmacSha1::new_from_slice(auth_key).map_err(|_| SrtpError::BadKeyLength {
        what: "auth key",
        len: auth_key.len(),
    })?;
    mac.update(content);
    mac.update(&roc.to_be_bytes());
    let mut out = [0u8; 20];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Length of fixed header, CSRCs and extension.
pub(crate) fn rtp_header_len(packet: &[u8]) -> Result<usize, SrtpError> {
    if packet.len() < 12 {
        return Err(SrtpError::PacketTooShort(packet.len()));
    }
    let cc = usize::from(packet[0] & 0x0F);
    let mut len = 12 + cc * 4;
    if packet[0] & 0x10 != 0 {
        let ext = packet.get(len..len + 4).ok_or(SrtpError::HeaderTooShort)?;
        len += 4 + usize::from(BigEndian::read_u16(&ext[2..4])) * 4;
    }
    if packet.len() < len {
        return Err(SrtpError::HeaderTooShort);
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    // RFC 3711 Appendix B.3 key derivation test vectors
    const MASTER_KEY: [u8; 16] = [
        0xE1, 0xF9, 0x7A, 0x0D, 0x3E, 0x01, 0x8B, 0xE0, 0xD6, 0x4F, 0xA3, 0x2C, 0x06, 0xDE, 0x41,
        0x39,
    ];
    const MASTER_SALT: [u8; 14] = [
        0x0E, 0xC6, 0x75, 0xAD, 0x49, 0x8A, 0xFE, 0xEB, 0xB6, 0x96, 0x0B, 0x3A, 0xAB, 0xE6,
    ];

    #[test]
    fn prf_matches_rfc3711_vectors() {
        let mut enc = [0u8; 16];
        aes_cm_prf(&MASTER_KEY, &MASTER_SALT, 0x00, &mut enc).unwrap();
        assert_eq!(
            enc,
            [
                0xC6, 0x1E, 0x7A, 0x93, 0x74, 0x4F, 0x39, 0xEE, 0x10, 0x73, 0x4A, 0xFE, 0x3F,
                0xF7, 0xA0, 0x87
            ]
        );
        let mut salt = [0u8; 14];
        aes_cm_prf(&MASTER_KEY, &MASTER_SALT, 0x02, &mut salt).unwrap();
        assert_eq!(
            salt,
            [
                0x30, 0xCB, 0xBC, 0x08, 0x86, 0x3D, 0x8C, 0x85, 0xD4, 0x9D, 0xB3, 0x4A, 0x9A,
                0xE1
            ]
        );
    }

    #[test]
    fn short_key_is_an_error_not_a_panic() {
        let mut out = [0u8; 16];
        assert!(matches!(
            aes_cm_prf(&[1, 2, 3], &MASTER_SALT, 0, &mut out),
            Err(SrtpError::BadKeyLength { len: 3, .. })
        ));
    }

    #[test]
    fn header_len_counts_csrcs_and_extension() {
        let mut pkt = vec![0x80 | 0x10 | 2, 96, 0, 1, 0, 0, 0, 0, 0, 0, 0, 9];
        pkt.extend_from_slice(&[0; 8]); // two CSRCs
        pkt.extend_from_slice(&[0xBE, 0xDE, 0, 1, 1, 2, 3, 4]);
        pkt.extend_from_slice(b"payload");
        assert_eq!(rtp_header_len(&pkt).unwrap(), 12 + 8 + 8);
        assert_eq!(rtp_header_len(&pkt[..22]), Err(SrtpError::HeaderTooShort));
    }
}
