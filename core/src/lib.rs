//! # Record-Keeper
//!
//! Envelope encryption and key custody for confidential student records.
//!
//! Documents are encrypted with a 256-bit document key (ChaCha20-Poly1305).
//! The document key is never stored: it is wrapped with RSA-OAEP under the
//! public key of each principal allowed to hold it, and the wrapped form is
//! handed to that principal as a text artifact.
//! Private keys are supplied by the caller for a single call and are never
//! persisted.
//!
//! Two roles take part:
//! - the __owner__ creates the document key for an epoch and receives it
//!   wrapped under their own public key
//! - an __operator__ receives the same key re-wrapped by the owner under
//!   the operator's public key, and uses it to encrypt and read documents
//!
//! The crypto core ([`ciphers`], [`keepers`], [`custody`]) is synchronous and
//! performs no I/O. [`service::CustodyService`] wraps it with the lookups and
//! deliveries done by the collaborators in [`store`].
//!
//! ## Implementation notes
//!
//! Crypto algorithms used are implemented by other packages, notably
//! [RustCrypto](https://github.com/rustcrypto/), a pure-rust implemenation.
//!
//! ## Limitations
//!
//! There is no key rotation or revocation. Re-sharing the key for an epoch
//! re-wraps the same key value, so a principal who once received it can read
//! every document of that epoch.
//!

pub mod ciphers;
pub mod config;
pub mod custody;
pub mod error;
pub mod keepers;
pub mod key;
pub mod rand;
pub mod service;
pub mod store;
pub mod util;

pub use config::KeeperConfig;
pub use key::SymmetricKey;

use crate::{
    ciphers::chacha20::TAGBYTES,
    error::{Error, Result},
    util::{FromBase64, ToBase64},
};
use serde::{Deserialize, Serialize};

/// A WrappedKey is a document key encrypted under one principal's public key.
/// It is produced on demand and handed to the principal; it is never stored
/// by this crate.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct WrappedKey {
    /// RSA-OAEP ciphertext, as long as the recipient's modulus
    pub ciphertext: Vec<u8>,
}

impl WrappedKey {
    /// Wire form: base64 of the ciphertext
    pub fn to_base64(&self) -> String {
        self.ciphertext.to_base64()
    }

    /// Accept an artifact as uploaded: the base64 text form, or the raw
    /// ciphertext bytes. An unusable artifact is an `UnwrapFailure`.
    pub fn decode(input: &[u8]) -> Result<Self, Error> {
        let ciphertext = match input.from_base64() {
            Ok(decoded) if !decoded.is_empty() => decoded.to_vec(),
            _ if !input.is_empty() => input.to_vec(),
            _ => return Err(Error::UnwrapFailure),
        };
        Ok(Self { ciphertext })
    }
}

/// Poly1305 authentication tag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthTag(pub [u8; TAGBYTES]);

impl AuthTag {
    /// Copies the tag from a slice of exactly TAGBYTES
    pub(crate) fn from_slice(s: &[u8]) -> Self {
        let mut tag = [0u8; TAGBYTES];
        tag.copy_from_slice(s);
        AuthTag(tag)
    }

    pub fn get_slice(&self) -> &[u8] {
        &self.0
    }
}


#[cfg(test)]
mod test {
    use super::WrappedKey;
    use crate::error::Error;
    use record_keeper_test_util::random_bytes;

    #[test]
    fn wrapped_key_text_or_raw() -> Result<(), Error> {
        let wk = WrappedKey {
            ciphertext: random_bytes(256).to_vec(),
        };
        let text = format!("{}\n", wk.to_base64());
        assert_eq!(WrappedKey::decode(text.as_bytes())?, wk);
        assert_eq!(WrappedKey::decode(&wk.ciphertext)?, wk);
        assert!(matches!(
            WrappedKey::decode(b""),
            Err(Error::UnwrapFailure)
        ));
        Ok(())
    }
}
