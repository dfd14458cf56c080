//! # chacha20 cipher
//!
//! ChaCha20-Poly1305 (IETF, 96-bit nonce) document encryption
//!

use crate::{
    ciphers::envelope::DocumentEnvelope,
    error::{Error, Result},
    key::SymmetricKey,
    rand, AuthTag,
};
use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    ChaCha20Poly1305 as pchacha, Key, Nonce, Tag,
};
use std::fmt;
use zeroize::Zeroize;

pub use crate::key::KEYBYTES;
/// Number of bytes in nonce
pub const NONCEBYTES: usize = 12;
/// Number of bytes in auth integrity tag
pub const TAGBYTES: usize = 16;

/// ChaCha20-Poly1305 document cipher, bound to one borrowed key.
///
/// The cipher never owns key bytes: it borrows the [`SymmetricKey`] for the
/// duration of the call and builds the AEAD state per operation.
/// Encryption algorithm is a pure rust implementation by
/// [RustCrypto AEAD](https://github.com/RustCrypto/AEADs/tree/master/chacha20poly1305)
pub struct DocumentCipher<'k> {
    key: &'k SymmetricKey,
}

/// Implementation of Debug that doesn't print key to prevent accidental leaks via logging
impl fmt::Debug for DocumentCipher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCipher")
            .field("key", &self.key)
            .finish()
    }
}

impl<'k> DocumentCipher<'k> {
    pub fn new(key: &'k SymmetricKey) -> Self {
        Self { key }
    }

    fn aead(&self) -> pchacha {
        pchacha::new(Key::from_slice(self.key.as_bytes()))
    }

    /// Encrypts the document. A fresh nonce is drawn from the platform
    /// CSRNG on every call; there is no way to supply one.
    /// No associated data is used.
    pub fn seal(&self, plaintext: &[u8]) -> Result<DocumentEnvelope, Error> {
        let nonce: [u8; NONCEBYTES] = rand::random_array()?;
        let mut ciphertext = plaintext.to_vec();
        match self
            .aead()
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), &[], &mut ciphertext)
        {
            Ok(tag) => Ok(DocumentEnvelope::new(
                nonce,
                AuthTag::from_slice(tag.as_slice()),
                ciphertext,
            )),
            Err(_) => {
                ciphertext.zeroize();
                Err(Error::EncryptionError(format!(
                    "document of {} bytes could not be encrypted",
                    plaintext.len()
                )))
            }
        }
    }

    /// Verifies the tag and decrypts. On tag mismatch nothing is returned
    /// but `AuthenticationFailure`; the scratch buffer is wiped.
    pub fn open(&self, envelope: &DocumentEnvelope) -> Result<Vec<u8>, Error> {
        let mut buf = envelope.ciphertext().to_vec();
        match self.aead().decrypt_in_place_detached(
            Nonce::from_slice(envelope.nonce()),
            &[],
            &mut buf,
            Tag::from_slice(envelope.tag().get_slice()),
        ) {
            Ok(()) => Ok(buf),
            Err(_) => {
                buf.zeroize();
                Err(Error::AuthenticationFailure)
            }
        }
    }

    /// Decodes a stored base64 envelope and decrypts it.
    /// A blob shorter than the fixed header fails with `MalformedEnvelope`
    /// before any AEAD computation.
    pub fn open_stored(&self, blob: &str) -> Result<Vec<u8>, Error> {
        let envelope = DocumentEnvelope::from_base64(blob)?;
        self.open(&envelope)
    }
}

/// Encrypt `plaintext` under `key`
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<DocumentEnvelope, Error> {
    DocumentCipher::new(key).seal(plaintext)
}

/// Decrypt `envelope` with `key`
pub fn decrypt(envelope: &DocumentEnvelope, key: &SymmetricKey) -> Result<Vec<u8>, Error> {
    DocumentCipher::new(key).open(envelope)
}
