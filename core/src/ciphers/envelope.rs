//! Storage layout of an encrypted document.
//!
//! ```text
//!  Offset   Size  Desc
//!   0-11     12    Nonce
//!   12-27    16    Tag
//!   28-      N     Ciphertext (same length as plaintext)
//! ```
//! The stored form is the base64 text of those bytes.

use crate::{
    ciphers::chacha20::{NONCEBYTES, TAGBYTES},
    error::{Error, Result},
    util::{FromBase64, ToBase64},
    AuthTag,
};

/// Length of the fixed header (nonce + tag)
pub const HEADERBYTES: usize = NONCEBYTES + TAGBYTES;

/// Nonce, tag, and ciphertext of one encrypted document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentEnvelope {
    nonce: [u8; NONCEBYTES],
    tag: AuthTag,
    ciphertext: Vec<u8>,
}

impl DocumentEnvelope {
    pub(crate) fn new(nonce: [u8; NONCEBYTES], tag: AuthTag, ciphertext: Vec<u8>) -> Self {
        Self {
            nonce,
            tag,
            ciphertext,
        }
    }

    pub fn nonce(&self) -> &[u8; NONCEBYTES] {
        &self.nonce
    }

    pub fn tag(&self) -> &AuthTag {
        &self.tag
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// `nonce || tag || ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADERBYTES + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(self.tag.get_slice());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split a stored blob at the fixed offsets.
    /// Anything shorter than the header is rejected.
    pub fn from_bytes(blob: &[u8]) -> Result<Self, Error> {
        if blob.len() < HEADERBYTES {
            return Err(Error::MalformedEnvelope(blob.len()));
        }
        let mut nonce = [0u8; NONCEBYTES];
        nonce.copy_from_slice(&blob[..NONCEBYTES]);
        Ok(Self {
            nonce,
            tag: AuthTag::from_slice(&blob[NONCEBYTES..HEADERBYTES]),
            ciphertext: blob[HEADERBYTES..].to_vec(),
        })
    }

    /// Text form for a text-oriented storage column
    pub fn to_base64(&self) -> String {
        self.to_bytes().to_base64()
    }

    pub fn from_base64(blob: &str) -> Result<Self, Error> {
        let bytes = blob
            .from_base64()
            .map_err(|_| Error::MalformedEnvelope(blob.len()))?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod test {
    use super::{DocumentEnvelope, HEADERBYTES};
    use crate::{
        error::{Error, Result},
        util::ToBase64,
    };

    #[test]
    fn header_size() {
        assert_eq!(HEADERBYTES, 28);
    }

    #[test]
    fn split_offsets() -> Result<(), Error> {
        let blob: Vec<u8> = (0u8..40).collect();
        let env = DocumentEnvelope::from_bytes(&blob)?;
        assert_eq!(env.nonce()[..], blob[..12]);
        assert_eq!(env.tag().get_slice(), &blob[12..28]);
        assert_eq!(env.ciphertext(), &blob[28..]);
        assert_eq!(env.to_bytes(), blob);
        Ok(())
    }

    #[test]
    fn header_only_is_empty_document() -> Result<(), Error> {
        let env = DocumentEnvelope::from_bytes(&[0u8; HEADERBYTES])?;
        assert!(env.ciphertext().is_empty());
        Ok(())
    }

    #[test]
    fn short_blobs_rejected() {
        for len in [0usize, 1, 12, 27] {
            let blob = vec![0u8; len];
            assert!(matches!(
                DocumentEnvelope::from_bytes(&blob),
                Err(Error::MalformedEnvelope(n)) if n == len
            ));
            assert!(matches!(
                DocumentEnvelope::from_base64(&blob.to_base64()),
                Err(Error::MalformedEnvelope(_))
            ));
        }
    }

    #[test]
    fn undecodable_text_rejected() {
        assert!(matches!(
            DocumentEnvelope::from_base64("%%% not base64 %%%"),
            Err(Error::MalformedEnvelope(_))
        ));
    }
}
