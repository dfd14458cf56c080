//! RSA-OAEP key wrapping
//!
//! Wraps the raw 32 bytes of a [`SymmetricKey`] under a recipient's public key.
//! OAEP is randomized: wrapping the same key twice gives different ciphertexts.

use crate::{
    error::{Error, Result},
    keepers::keypair::{HolderKey, RecipientKey},
    key::{SymmetricKey, KEYBYTES},
    WrappedKey,
};
use rand::rngs::OsRng;
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use zeroize::Zeroizing;

/// Digest used for OAEP padding and its MGF1 mask.
///
/// `Sha1` is the default and matches key artifacts already issued by the
/// deployed system.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum OaepDigest {
    #[default]
    #[strum(to_string = "sha1", serialize = "sha-1")]
    Sha1,
    #[strum(to_string = "sha256", serialize = "sha-256")]
    Sha256,
}

impl OaepDigest {
    fn padding(self) -> Oaep {
        match self {
            OaepDigest::Sha1 => Oaep::new::<sha1::Sha1>(),
            OaepDigest::Sha256 => Oaep::new::<sha2::Sha256>(),
        }
    }

    /// digest output length in bytes
    pub fn output_len(self) -> usize {
        match self {
            OaepDigest::Sha1 => 20,
            OaepDigest::Sha256 => 32,
        }
    }

    /// Largest message OAEP can carry under a `modulus_bytes` key
    pub fn max_message_len(self, modulus_bytes: usize) -> usize {
        modulus_bytes.saturating_sub(2 * self.output_len() + 2)
    }
}

/// Encrypts the key under the recipient's public key.
pub fn wrap(
    key: &SymmetricKey,
    recipient: &RecipientKey,
    digest: OaepDigest,
) -> Result<WrappedKey, Error> {
    if KEYBYTES > digest.max_message_len(recipient.size()) {
        return Err(Error::InvalidKeyMaterial(format!(
            "{}-bit key cannot carry a {}-byte key with OAEP-{}",
            recipient.bits(),
            KEYBYTES,
            digest
        )));
    }
    let ciphertext = recipient
        .key
        .encrypt(&mut OsRng, digest.padding(), key.as_bytes())
        .map_err(|e| Error::EncryptionError(format!("RSA-OAEP encryption failed: {}", e)))?;
    Ok(WrappedKey { ciphertext })
}

/// Decrypts a wrapped key with the holder's private key.
///
/// Any failure (wrong key, corrupt ciphertext, bad padding, wrong length)
/// is reported as the same `UnwrapFailure`.
pub fn unwrap(
    wrapped: &WrappedKey,
    holder: &HolderKey,
    digest: OaepDigest,
) -> Result<SymmetricKey, Error> {
    let plain = holder
        .key
        .decrypt_blinded(&mut OsRng, digest.padding(), &wrapped.ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| Error::UnwrapFailure)?;
    SymmetricKey::from_slice(&plain).map_err(|_| Error::UnwrapFailure)
}

/// [`wrap`] with a PEM public key. A bad PEM is `InvalidKeyMaterial`.
pub fn wrap_pem(
    key: &SymmetricKey,
    recipient_pem: &str,
    digest: OaepDigest,
) -> Result<WrappedKey, Error> {
    wrap(key, &RecipientKey::from_pem(recipient_pem)?, digest)
}

/// [`unwrap`] with a PEM private key. An unusable private key is reported
/// as `UnwrapFailure` too, so the caller can't tell which input was bad.
pub fn unwrap_pem(
    wrapped: &WrappedKey,
    private_pem: &str,
    digest: OaepDigest,
) -> Result<SymmetricKey, Error> {
    let holder = HolderKey::from_pem(private_pem).map_err(|_| Error::UnwrapFailure)?;
    unwrap(wrapped, &holder, digest)
}
