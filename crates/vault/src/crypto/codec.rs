//! AES-256-GCM sealing and opening of the confidential record field.
//!
//! **Nonce freshness is the security invariant of this module.** GCM nonce
//! reuse under one key breaks both confidentiality and authentication, so
//! every [`FieldCodec::seal`] call draws a fresh 96-bit nonce from the OS
//! CSPRNG. Never substitute a counter or a derived nonce here.

use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::key::FieldKey;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Errors produced by the codec.
///
/// Display strings never include key material, plaintext, or envelope bytes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The OS random source could not supply a nonce.
    #[error("secure random source unavailable")]
    Entropy,

    /// AES-GCM encryption failed internally.
    #[error("aead operation failed")]
    Aead,

    /// The envelope is not valid base64 or is shorter than nonce + tag.
    #[error("malformed envelope")]
    Format,

    /// Authentication tag verification failed (tampering, wrong key, or corruption).
    #[error("envelope failed authentication")]
    Integrity,
}

/// Stateless authenticated-encryption codec bound to one immutable key.
///
/// Envelope layout, applied once at seal time:
///
/// ```text
/// base64(nonce[12] || ciphertext[N] || tag[16])
/// ```
#[derive(Clone)]
pub struct FieldCodec {
    cipher: Aes256Gcm,
}

impl FieldCodec {
    /// Build a codec from validated key material.
    pub fn new(key: &FieldKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Encrypt `plaintext` into a self-contained envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Entropy`] if the OS random source fails. This is
    /// fatal and must not be retried with a fallback nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CodecError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|_| CodecError::Entropy)?;

        // aes-gcm appends the tag to the ciphertext.
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| CodecError::Aead)?;

        let mut raw = Vec::with_capacity(NONCE_LEN + sealed.len());
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&sealed);
        Ok(STANDARD.encode(raw))
    }

    /// Decode and authenticate an envelope, returning the original plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`] if the envelope is not valid base64 or
    /// decodes to fewer than `NONCE_LEN + TAG_LEN` bytes.
    /// Returns [`CodecError::Integrity`] if the authentication tag does not verify.
    pub fn open(&self, envelope: &str) -> Result<Vec<u8>, CodecError> {
        let raw = STANDARD.decode(envelope).map_err(|_| CodecError::Format)?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CodecError::Format);
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CodecError::Integrity)
    }
}

impl std::fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCodec([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::KEY_LEN;

    fn random_codec() -> FieldCodec {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        FieldCodec::new(&FieldKey::from_bytes(&key).unwrap())
    }

    #[test]
    fn seal_open_round_trip_across_lengths() {
        let codec = random_codec();
        for len in [0usize, 1, 15, 16, 17, 255, 1024, 2000] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let envelope = codec.seal(&plaintext).unwrap();
            assert_eq!(codec.open(&envelope).unwrap(), plaintext, "len {len}");
        }
    }

    #[test]
    fn envelope_is_nonce_ciphertext_tag() {
        let codec = random_codec();
        let envelope = codec.seal(b"2% organic").unwrap();
        let raw = STANDARD.decode(&envelope).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + b"2% organic".len() + TAG_LEN);
        assert!(!envelope.contains("2% organic"));
    }

    #[test]
    fn same_plaintext_seals_to_different_envelopes() {
        let codec = random_codec();
        let a = codec.seal(b"same").unwrap();
        let b = codec.seal(b"same").unwrap();
        assert_ne!(a, b);

        let nonce_a = STANDARD.decode(&a).unwrap()[..NONCE_LEN].to_vec();
        let nonce_b = STANDARD.decode(&b).unwrap()[..NONCE_LEN].to_vec();
        assert_ne!(nonce_a, nonce_b);
    }

    #[test]
    fn flipping_any_byte_fails_integrity() {
        let codec = random_codec();
        let raw = STANDARD.decode(codec.seal(b"tamper me").unwrap()).unwrap();
        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let result = codec.open(&STANDARD.encode(&tampered));
            assert!(
                matches!(result, Err(CodecError::Integrity)),
                "byte {i} flip was not detected"
            );
        }
    }

    #[test]
    fn wrong_key_fails_integrity() {
        let envelope = random_codec().seal(b"secret").unwrap();
        assert!(matches!(
            random_codec().open(&envelope),
            Err(CodecError::Integrity)
        ));
    }

    #[test]
    fn short_envelope_is_format_error() {
        let codec = random_codec();
        let short = STANDARD.encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        assert!(matches!(codec.open(&short), Err(CodecError::Format)));
        assert!(matches!(codec.open(""), Err(CodecError::Format)));
    }

    #[test]
    fn non_base64_envelope_is_format_error() {
        let codec = random_codec();
        assert!(matches!(codec.open("!!not base64!!"), Err(CodecError::Format)));
    }

    #[test]
    fn codec_is_redacted_in_debug() {
        let codec = FieldCodec::new(&FieldKey::from_bytes(&[0x42u8; KEY_LEN]).unwrap());
        assert_eq!(format!("{codec:?}"), "FieldCodec([REDACTED])");
    }
}
