//! Collaborator seams: principal and public-key lookup, document storage,
//! and delivery of attachments.
//!
//! These are implemented outside the crypto core (database, mail, HTTP
//! response). [`memory`] has in-process implementations.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub mod memory;
pub use memory::{MemoryCourier, MemoryStore};

/// Identifier of a role-holding account (e.g. a staff or student number)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        PrincipalId(s.to_string())
    }
}

/// Role of a principal. The legacy names `jefe`, `staff`, and `estudiante`
/// are accepted when parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Role {
    #[strum(to_string = "owner", serialize = "jefe")]
    Owner,
    #[strum(to_string = "operator", serialize = "staff")]
    Operator,
    #[strum(to_string = "other", serialize = "estudiante")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    /// delivery address for attachments
    pub email: Option<String>,
}

impl Principal {
    pub fn new(id: &str, role: Role) -> Self {
        Self {
            id: PrincipalId::from(id),
            role,
            email: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document as persisted: the base64 envelope plus its metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: DocumentId,
    /// principal the record is about
    pub subject: PrincipalId,
    pub filename: String,
    /// base64( nonce || tag || ciphertext )
    pub blob: String,
}

/// A named file handed to a principal: by mail, or as a download.
/// The body is wiped when the attachment is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Attachment {
    pub filename: String,
    #[zeroize(skip)]
    pub media_type: &'static str,
    pub body: Vec<u8>,
}

pub const MEDIA_TEXT: &str = "text/plain";
pub const MEDIA_PDF: &str = "application/pdf";
pub const MEDIA_BINARY: &str = "application/octet-stream";

impl Attachment {
    pub fn new(filename: &str, media_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            media_type,
            body,
        }
    }

    /// media type guessed from the file extension
    pub fn media_type_for(filename: &str) -> &'static str {
        match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
            Some(ext) if ext == "pdf" => MEDIA_PDF,
            Some(ext) if ext == "txt" => MEDIA_TEXT,
            _ => MEDIA_BINARY,
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("media_type", &self.media_type)
            .field("len", &self.body.len())
            .finish()
    }
}

/// Principal directory and public-key storage
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn principal(&self, id: &PrincipalId) -> Result<Option<Principal>, Error>;

    /// PEM public key currently registered for the principal
    async fn get_public_key(&self, id: &PrincipalId) -> Result<Option<String>, Error>;

    /// Register (or replace) the principal's public key
    async fn store_public_key(&self, id: &PrincipalId, pem: &str) -> Result<(), Error>;
}

/// Storage of encrypted documents as opaque text
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store_document_envelope(
        &self,
        subject: &PrincipalId,
        filename: &str,
        blob: String,
    ) -> Result<DocumentId, Error>;

    async fn load_document_envelope(&self, id: DocumentId)
        -> Result<Option<StoredDocument>, Error>;
}

/// Delivers attachments to principals (mail, in the deployed system)
#[async_trait]
pub trait Courier: Send + Sync {
    async fn deliver(
        &self,
        recipient: &Principal,
        subject: &str,
        attachment: Attachment,
    ) -> Result<(), Error>;
}
