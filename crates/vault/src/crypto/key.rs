//! [`FieldKey`]: the single static field-encryption key supplied at startup.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced while parsing key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The configured value is not valid base64.
    #[error("field key is not valid base64")]
    Encoding,

    /// The decoded key material has an unexpected length.
    #[error("field key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// The buffer is wiped when the key is dropped.
pub struct FieldKey(Zeroizing<[u8; KEY_LEN]>);

impl FieldKey {
    /// Copy raw key bytes into a new [`FieldKey`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if the slice has the wrong length.
    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, KeyError> {
        if key_bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(key_bytes.len()));
        }
        let mut buf = Zeroizing::new([0u8; KEY_LEN]);
        buf.copy_from_slice(key_bytes);
        Ok(Self(buf))
    }

    /// Parse the base64 form used in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Encoding`] for invalid base64 and
    /// [`KeyError::InvalidLength`] unless the value decodes to [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| KeyError::Encoding)?,
        );
        Self::from_bytes(&decoded)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("FieldKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base64_key() {
        let encoded = STANDARD.encode([0x42u8; KEY_LEN]);
        let key = FieldKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN]);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let encoded = format!(" {}\n", STANDARD.encode([0x01u8; KEY_LEN]));
        assert!(FieldKey::from_base64(&encoded).is_ok());
    }

    #[test]
    fn rejects_wrong_length() {
        let encoded = STANDARD.encode([0u8; 16]);
        assert!(matches!(
            FieldKey::from_base64(&encoded),
            Err(KeyError::InvalidLength(16))
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            FieldKey::from_base64("not*base64"),
            Err(KeyError::Encoding)
        ));
    }

    #[test]
    fn from_bytes_requires_exact_length() {
        assert!(matches!(
            FieldKey::from_bytes(&[0u8; KEY_LEN + 1]),
            Err(KeyError::InvalidLength(33))
        ));
        assert!(matches!(FieldKey::from_bytes(&[]), Err(KeyError::InvalidLength(0))));
        assert!(FieldKey::from_bytes(&[0u8; KEY_LEN]).is_ok());
    }

    #[test]
    fn key_bytes_are_held_in_a_zeroizing_buffer() {
        use zeroize::Zeroize;

        let mut key = FieldKey::from_bytes(&[0x5Au8; KEY_LEN]).unwrap();
        // The same wipe runs on drop.
        key.0.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);
    }

    #[test]
    fn key_redacted_in_debug() {
        let key = FieldKey::from_bytes(&[0xFFu8; KEY_LEN]).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
