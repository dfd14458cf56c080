//! Crate error handling
//!
//! No variant carries key material, plaintext, or ciphertext. Messages that
//! describe a failing input name the problem, never the bytes.

pub use std::result::Result;
use thiserror::Error as ThisError;

/// Generic message for every key-unwrap failure, whatever the cause
pub(crate) const UNWRAP_FAILURE_MSG: &str = "private key incorrect or wrapped key invalid";

/// Error enum that rolls-up all error messages in this crate
#[derive(Debug, ThisError)]
pub enum Error {
    /// Unparsable PEM, wrong key size, or an unusable symmetric key encoding
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Wrong private key or corrupted wrapped key. Deliberately carries no detail.
    #[error("Key unwrap failed: {}", UNWRAP_FAILURE_MSG)]
    UnwrapFailure,

    /// AEAD tag mismatch on decrypt
    #[error("Decryption failed: document key incorrect or data corrupted")]
    AuthenticationFailure,

    /// Stored envelope is too short or not decodable; detected before any AEAD work
    #[error("Malformed document envelope ({0} bytes)")]
    MalformedEnvelope(usize),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    #[error("Random generation error: {0}")]
    Random(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Principal not found: {0}")]
    PrincipalNotFound(String),

    #[error("No public key registered for principal: {0}")]
    PublicKeyNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// How the request layer should report an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input from the caller. Not retried.
    Client,
    /// Stored data is corrupt
    DataIntegrity,
    NotFound,
    Forbidden,
    /// Broken runtime (entropy, library init). Not retried.
    Fatal,
    /// Failure reported by a store or courier
    Collaborator,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::InvalidKeyMaterial(_) | Error::UnwrapFailure | Error::AuthenticationFailure => {
                ErrorClass::Client
            }
            Error::MalformedEnvelope(_) => ErrorClass::DataIntegrity,
            Error::PrincipalNotFound(_)
            | Error::PublicKeyNotFound(_)
            | Error::DocumentNotFound(_) => ErrorClass::NotFound,
            Error::Forbidden(_) => ErrorClass::Forbidden,
            Error::KeyGeneration(_)
            | Error::Random(_)
            | Error::EncryptionError(_)
            | Error::InvalidConfig(_) => ErrorClass::Fatal,
            Error::Delivery(_) => ErrorClass::Collaborator,
        }
    }
}

impl From<getrandom::Error> for Error {
    fn from(_: getrandom::Error) -> Error {
        Error::Random(String::from("out of entropy"))
    }
}

#[cfg(test)]
mod test {
    use super::{Error, ErrorClass};

    #[test]
    fn unwrap_message_is_generic() {
        let msg = Error::UnwrapFailure.to_string();
        assert!(msg.contains("private key incorrect or wrapped key invalid"));
    }

    #[test]
    fn classes() {
        assert_eq!(Error::UnwrapFailure.class(), ErrorClass::Client);
        assert_eq!(Error::AuthenticationFailure.class(), ErrorClass::Client);
        assert_eq!(
            Error::InvalidKeyMaterial("x".into()).class(),
            ErrorClass::Client
        );
        assert_eq!(
            Error::MalformedEnvelope(3).class(),
            ErrorClass::DataIntegrity
        );
        assert_eq!(Error::Random("x".into()).class(), ErrorClass::Fatal);
        assert_eq!(Error::Forbidden("x".into()).class(), ErrorClass::Forbidden);
        assert_eq!(
            Error::Delivery("x".into()).class(),
            ErrorClass::Collaborator
        );
        assert_eq!(Error::InvalidConfig("x".into()).class(), ErrorClass::Fatal);
    }
}
