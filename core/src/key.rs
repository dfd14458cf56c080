//! The document-encryption key.

use crate::{
    error::{Error, Result},
    rand,
    util::{FromBase64, ToBase64},
};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Number of bytes in a document-encryption key (256 bits)
pub const KEYBYTES: usize = 32;

/// 256-bit document-encryption key.
///
/// The key lives only in process memory: it is not `Clone`, not serializable,
/// and its bytes are overwritten when it is dropped. The only text form is
/// [`SymmetricKey::to_base64`], which returns a zeroizing string.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEYBYTES],
}

/// Implementation of Debug that doesn't print key to prevent accidental leaks via logging
impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl SymmetricKey {
    /// Generate a fresh key from the platform CSRNG
    pub fn generate() -> Result<Self, Error> {
        let mut key = Self {
            bytes: [0u8; KEYBYTES],
        };
        rand::fill_buf(&mut key.bytes)?;
        Ok(key)
    }

    /// Key from exactly KEYBYTES raw bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != KEYBYTES {
            return Err(Error::InvalidKeyMaterial(format!(
                "symmetric key must be {} bytes, got {}",
                KEYBYTES,
                bytes.len()
            )));
        }
        let mut key = Self {
            bytes: [0u8; KEYBYTES],
        };
        key.bytes.copy_from_slice(bytes);
        Ok(key)
    }

    /// Normalize a key as it arrives from a caller: either its base64 text
    /// form (optionally surrounded by whitespace) or the raw 32 bytes.
    ///
    /// Base64 is tried first. A raw 32-byte key never decodes to 32 bytes
    /// as base64, so the two forms cannot be confused.
    pub fn decode(input: &[u8]) -> Result<Self, Error> {
        if let Ok(decoded) = input.from_base64() {
            if decoded.len() == KEYBYTES {
                return Self::from_slice(&decoded);
            }
        }
        if input.len() == KEYBYTES {
            return Self::from_slice(input);
        }
        Err(Error::InvalidKeyMaterial(format!(
            "symmetric key must be {} raw bytes or their base64 form",
            KEYBYTES
        )))
    }

    pub fn as_bytes(&self) -> &[u8; KEYBYTES] {
        &self.bytes
    }

    /// Base64 text form, for handing the key to its holder
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(self.bytes.to_base64())
    }
}
