//! Key custody protocol for one epoch of a shared document key.
//!
//! ```text
//!  owner:    issue(owner_pub)                          -> owner artifact
//!  owner:    distribute(owner artifact, owner_priv,
//!                       operator_pub)                  -> operator artifact
//!  operator: recover(operator artifact, operator_priv) -> document key
//! ```
//!
//! Every step is a pure, in-memory computation. The document key exists in
//! plaintext only inside a single call, and private keys are borrowed from
//! the caller for that call. Nothing is remembered between calls: there is
//! no epoch id or revocation, and distributing twice to the same operator
//! wraps the same key value again.
//!
//! A step fails closed. `distribute` produces no output unless the owner's
//! artifact unwrapped cleanly.

use crate::{
    error::{Error, Result},
    keepers::{unwrap, wrap, HolderKey, OaepDigest, RecipientKey},
    key::SymmetricKey,
    WrappedKey,
};

/// Runs the custody steps with one OAEP digest
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyCustody {
    digest: OaepDigest,
}

impl KeyCustody {
    pub fn new(digest: OaepDigest) -> Self {
        Self { digest }
    }

    pub fn digest(&self) -> OaepDigest {
        self.digest
    }

    /// Start an epoch: generate a document key and wrap it for the owner.
    /// The plaintext key is dropped (and wiped) before this returns.
    pub fn issue(&self, owner: &RecipientKey) -> Result<WrappedKey, Error> {
        let key = SymmetricKey::generate()?;
        wrap(&key, owner, self.digest)
    }

    /// Re-wrap the owner's key for an operator.
    pub fn distribute(
        &self,
        owner_artifact: &WrappedKey,
        owner_private: &HolderKey,
        operator: &RecipientKey,
    ) -> Result<WrappedKey, Error> {
        let key = unwrap(owner_artifact, owner_private, self.digest)?;
        wrap(&key, operator, self.digest)
    }

    /// [`distribute`](Self::distribute) with the owner's inputs as uploaded:
    /// the artifact as base64 text or raw bytes, and the private key as PEM
    /// bytes. A bad private key or artifact is an `UnwrapFailure`.
    pub fn distribute_upload(
        &self,
        owner_artifact: &[u8],
        owner_private_pem: &[u8],
        operator: &RecipientKey,
    ) -> Result<WrappedKey, Error> {
        let artifact = WrappedKey::decode(owner_artifact)?;
        let holder = HolderKey::from_pem_bytes(owner_private_pem).map_err(|_| Error::UnwrapFailure)?;
        self.distribute(&artifact, &holder, operator)
    }

    /// Unwrap an artifact received by its holder.
    pub fn recover(&self, artifact: &WrappedKey, holder: &HolderKey) -> Result<SymmetricKey, Error> {
        unwrap(artifact, holder, self.digest)
    }

    /// [`recover`](Self::recover) with uploaded inputs, as for `distribute_upload`
    pub fn recover_upload(
        &self,
        artifact: &[u8],
        private_pem: &[u8],
    ) -> Result<SymmetricKey, Error> {
        let artifact = WrappedKey::decode(artifact)?;
        let holder = HolderKey::from_pem_bytes(private_pem).map_err(|_| Error::UnwrapFailure)?;
        self.recover(&artifact, &holder)
    }
}
