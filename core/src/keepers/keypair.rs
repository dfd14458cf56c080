//! RSA key pairs: generation, and parsing of caller-supplied PEM keys.

use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding},
    traits::PublicKeyParts,
    RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Smallest accepted modulus, for generated and supplied keys alike
pub const MIN_RSA_BITS: usize = 2048;
/// Largest modulus the `rsa` crate will parse back
pub const MAX_RSA_BITS: usize = RsaPublicKey::MAX_SIZE;

/// A freshly generated key pair.
///
/// `public_key` is SPKI PEM, to be persisted against the principal.
/// `private_key` is PKCS#8 PEM, handed to the principal exactly once and
/// wiped from memory when this value is dropped.
pub struct KeyPair {
    pub public_key: String,
    pub private_key: Zeroizing<String>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Generate an RSA key pair with a `bits` modulus.
/// Entropy comes from the OS CSRNG. Failure means a broken environment
/// and is not retried.
pub fn generate_keypair(bits: usize) -> Result<KeyPair, Error> {
    if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&bits) {
        return Err(Error::InvalidConfig(format!(
            "rsa modulus must be between {} and {} bits",
            MIN_RSA_BITS, MAX_RSA_BITS
        )));
    }
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| Error::KeyGeneration(format!("RSA key generation failed: {}", e)))?;
    let public = RsaPublicKey::from(&private);

    let public_key = public
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| Error::KeyGeneration(format!("public key encoding failed: {}", e)))?;
    let private_key = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| Error::KeyGeneration(format!("private key encoding failed: {}", e)))?;
    Ok(KeyPair {
        public_key,
        private_key,
    })
}

fn pem_text(bytes: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(bytes)
        .map(str::trim)
        .map_err(|_| Error::InvalidKeyMaterial("key file is not PEM text".to_string()))
}

fn check_size(bits: usize) -> Result<(), Error> {
    if bits < MIN_RSA_BITS {
        return Err(Error::InvalidKeyMaterial(format!(
            "{}-bit RSA key is below the {}-bit minimum",
            bits, MIN_RSA_BITS
        )));
    }
    Ok(())
}

/// Public key of a principal that may receive a wrapped key
#[derive(Clone, PartialEq, Eq)]
pub struct RecipientKey {
    pub(crate) key: RsaPublicKey,
}

impl fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientKey")
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl RecipientKey {
    /// Parse an SPKI (`BEGIN PUBLIC KEY`) or PKCS#1 (`BEGIN RSA PUBLIC KEY`) PEM
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|_| Error::InvalidKeyMaterial("unparsable RSA public key".to_string()))?;
        check_size(key.n().bits())?;
        Ok(Self { key })
    }

    /// Parse a public key from raw upload bytes
    pub fn from_pem_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_pem(pem_text(bytes)?)
    }

    /// SPKI PEM
    pub fn to_pem(&self) -> Result<String, Error> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::InvalidKeyMaterial(format!("public key encoding failed: {}", e)))
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.key.n().bits()
    }

    /// Modulus size in bytes
    pub(crate) fn size(&self) -> usize {
        self.key.size()
    }

    /// Lowercase hex SHA-256 of the SPKI DER encoding.
    /// Safe to log; identifies the key without revealing anything else.
    pub fn fingerprint(&self) -> String {
        match self.key.to_public_key_der() {
            Ok(der) => hex::encode(Sha256::digest(der.as_bytes())),
            Err(_) => String::from("unknown"),
        }
    }
}

/// A caller-supplied private key, held for one call.
///
/// The underlying key is zeroized on drop. There is no `Clone` and no way
/// to serialize it back out.
pub struct HolderKey {
    pub(crate) key: RsaPrivateKey,
}

impl fmt::Debug for HolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HolderKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl HolderKey {
    /// Parse a PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|_| Error::InvalidKeyMaterial("unparsable RSA private key".to_string()))?;
        check_size(key.n().bits())?;
        Ok(Self { key })
    }

    /// Parse a private key from raw upload bytes
    pub fn from_pem_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_pem(pem_text(bytes)?)
    }

    /// The public half of this key
    pub fn recipient(&self) -> RecipientKey {
        RecipientKey {
            key: RsaPublicKey::from(&self.key),
        }
    }
}
