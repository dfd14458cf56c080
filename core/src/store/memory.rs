//! In-process store and courier, for tests and local tooling.

use crate::{
    error::{Error, Result},
    store::{
        Attachment, Courier, DocumentId, DocumentStore, KeyStore, Principal, PrincipalId,
        StoredDocument,
    },
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug)]
struct Account {
    principal: Principal,
    public_key: Option<String>,
}

#[derive(Debug, Default)]
struct Documents {
    next_id: u64,
    rows: BTreeMap<DocumentId, StoredDocument>,
}

/// Principals, public keys, and documents held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<PrincipalId, Account>>,
    documents: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a principal, without a public key
    pub async fn add_principal(&self, principal: Principal) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(
            principal.id.clone(),
            Account {
                principal,
                public_key: None,
            },
        );
    }

    pub async fn document_count(&self) -> usize {
        self.documents.read().await.rows.len()
    }

    /// Overwrite a stored blob, to simulate corruption at rest
    pub async fn replace_blob(&self, id: DocumentId, blob: String) -> Result<(), Error> {
        let mut docs = self.documents.write().await;
        let row = docs
            .rows
            .get_mut(&id)
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;
        row.blob = blob;
        Ok(())
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn principal(&self, id: &PrincipalId) -> Result<Option<Principal>, Error> {
        Ok(self
            .accounts
            .read()
            .await
            .get(id)
            .map(|a| a.principal.clone()))
    }

    async fn get_public_key(&self, id: &PrincipalId) -> Result<Option<String>, Error> {
        Ok(self
            .accounts
            .read()
            .await
            .get(id)
            .and_then(|a| a.public_key.clone()))
    }

    async fn store_public_key(&self, id: &PrincipalId, pem: &str) -> Result<(), Error> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| Error::PrincipalNotFound(id.to_string()))?;
        account.public_key = Some(pem.to_string());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn store_document_envelope(
        &self,
        subject: &PrincipalId,
        filename: &str,
        blob: String,
    ) -> Result<DocumentId, Error> {
        let mut docs = self.documents.write().await;
        docs.next_id += 1;
        let id = DocumentId(docs.next_id);
        docs.rows.insert(
            id,
            StoredDocument {
                id,
                subject: subject.clone(),
                filename: filename.to_string(),
                blob,
            },
        );
        Ok(id)
    }

    async fn load_document_envelope(
        &self,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, Error> {
        Ok(self.documents.read().await.rows.get(&id).cloned())
    }
}

/// A delivered attachment, as recorded by [`MemoryCourier`]
#[derive(Debug)]
pub struct Delivered {
    pub recipient: PrincipalId,
    pub subject: String,
    pub attachment: Attachment,
}

/// Courier that keeps every delivery in an outbox
#[derive(Debug, Default)]
pub struct MemoryCourier {
    outbox: Mutex<Vec<Delivered>>,
}

impl MemoryCourier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything delivered so far
    pub async fn take_outbox(&self) -> Vec<Delivered> {
        std::mem::take(&mut *self.outbox.lock().await)
    }
}

#[async_trait]
impl Courier for MemoryCourier {
    async fn deliver(
        &self,
        recipient: &Principal,
        subject: &str,
        attachment: Attachment,
    ) -> Result<(), Error> {
        if recipient.email.is_none() {
            return Err(Error::Delivery(format!(
                "no delivery address for {}",
                recipient.id
            )));
        }
        self.outbox.lock().await.push(Delivered {
            recipient: recipient.id.clone(),
            subject: subject.to_string(),
            attachment,
        });
        Ok(())
    }
}
