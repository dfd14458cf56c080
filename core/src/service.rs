//! Custody service: the key-handling request flows.
//!
//! Each operation checks the actor's role, does its store lookups, makes one
//! call into the synchronous core, and then stores or delivers the result.
//! Key material never goes into the store: only public keys and encrypted
//! documents do.

use crate::{
    ciphers::DocumentCipher,
    config::KeeperConfig,
    custody::KeyCustody,
    error::{Error, Result},
    keepers::{generate_keypair, RecipientKey},
    key::SymmetricKey,
    store::{
        Attachment, Courier, DocumentId, DocumentStore, KeyStore, Principal, PrincipalId, Role,
        MEDIA_BINARY, MEDIA_TEXT,
    },
};
use tracing::{debug, info, warn};

/// Mail subject used when delivering an operator's wrapped key
pub const SHARE_SUBJECT: &str = "Document encryption key";

pub struct CustodyService<S, C> {
    config: KeeperConfig,
    custody: KeyCustody,
    store: S,
    courier: C,
}

fn require(actor: &Principal, allowed: &[Role], action: &str) -> Result<(), Error> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    warn!(principal = %actor.id, role = %actor.role, action, "forbidden");
    Err(Error::Forbidden(format!("{} may not {}", actor.role, action)))
}

impl<S, C> CustodyService<S, C>
where
    S: KeyStore + DocumentStore,
    C: Courier,
{
    /// Build the service. The configuration is validated here, once.
    pub fn new(config: KeeperConfig, store: S, courier: C) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            custody: KeyCustody::new(config.oaep_digest),
            config,
            store,
            courier,
        })
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn courier(&self) -> &C {
        &self.courier
    }

    /// Stored public key of `id`, parsed
    async fn recipient(&self, id: &PrincipalId) -> Result<RecipientKey, Error> {
        let pem = self
            .store
            .get_public_key(id)
            .await?
            .ok_or_else(|| Error::PublicKeyNotFound(id.to_string()))?;
        let key = RecipientKey::from_pem(&pem)?;
        debug!(principal = %id, fingerprint = %key.fingerprint(), "loaded public key");
        Ok(key)
    }

    /// Generate a key pair for the actor. The public half replaces any
    /// previously registered key; the private half is returned once, as
    /// a download, and is not kept.
    pub async fn register_keypair(&self, actor: &Principal) -> Result<Attachment, Error> {
        require(actor, &[Role::Owner, Role::Operator], "generate key pairs")?;
        let bits = self.config.rsa_bits;
        let pair = tokio::task::spawn_blocking(move || generate_keypair(bits))
            .await
            .map_err(|e| Error::KeyGeneration(format!("key generation task failed: {}", e)))??;

        // must parse back before it replaces the principal's current key
        let fingerprint = RecipientKey::from_pem(&pair.public_key)?.fingerprint();
        self.store.store_public_key(&actor.id, &pair.public_key).await?;
        info!(principal = %actor.id, %fingerprint, bits, "registered public key");

        Ok(Attachment::new(
            &self.config.attachments.private_key,
            MEDIA_BINARY,
            pair.private_key.as_bytes().to_vec(),
        ))
    }

    /// Start a key epoch: a new document key, wrapped for the owner.
    pub async fn issue_epoch_key(&self, actor: &Principal) -> Result<Attachment, Error> {
        require(actor, &[Role::Owner], "generate document keys")?;
        let owner = self.recipient(&actor.id).await?;
        let wrapped = self.custody.issue(&owner)?;
        info!(principal = %actor.id, fingerprint = %owner.fingerprint(), "issued epoch key");

        Ok(Attachment::new(
            &self.config.attachments.owner_artifact,
            MEDIA_TEXT,
            wrapped.to_base64().into_bytes(),
        ))
    }

    /// Re-wrap the owner's epoch key for an operator and deliver it.
    ///
    /// `artifact` is the owner's wrapped key as issued (base64 text or raw);
    /// `owner_private_pem` is the owner's private key, used for this call only.
    pub async fn share_epoch_key(
        &self,
        actor: &Principal,
        operator_id: &PrincipalId,
        artifact: &[u8],
        owner_private_pem: &[u8],
    ) -> Result<(), Error> {
        require(actor, &[Role::Owner], "share document keys")?;
        let operator = match self.store.principal(operator_id).await? {
            Some(p) if p.role == Role::Operator => p,
            _ => return Err(Error::PrincipalNotFound(operator_id.to_string())),
        };
        let operator_key = self.recipient(operator_id).await?;

        let wrapped = self
            .custody
            .distribute_upload(artifact, owner_private_pem, &operator_key)
            .map_err(|e| {
                warn!(principal = %actor.id, operator = %operator_id, "owner key unwrap rejected");
                e
            })?;

        let attachment = Attachment::new(
            &self.config.attachments.operator_artifact(&operator_id.0),
            MEDIA_TEXT,
            wrapped.to_base64().into_bytes(),
        );
        self.courier
            .deliver(&operator, SHARE_SUBJECT, attachment)
            .await?;
        info!(
            principal = %actor.id,
            operator = %operator_id,
            fingerprint = %operator_key.fingerprint(),
            "shared epoch key"
        );
        Ok(())
    }

    /// Unwrap an operator's artifact and return the document key as a
    /// base64 download for that operator.
    pub async fn recover_epoch_key(
        &self,
        actor: &Principal,
        artifact: &[u8],
        private_pem: &[u8],
    ) -> Result<Attachment, Error> {
        require(actor, &[Role::Operator], "recover document keys")?;
        let key = self
            .custody
            .recover_upload(artifact, private_pem)
            .map_err(|e| {
                warn!(principal = %actor.id, "operator key unwrap rejected");
                e
            })?;
        info!(principal = %actor.id, "recovered epoch key");

        Ok(Attachment::new(
            &self.config.attachments.document_key,
            MEDIA_TEXT,
            key.to_base64().as_bytes().to_vec(),
        ))
    }

    /// Encrypt an uploaded document and store it for `subject`.
    /// `key_input` is the document key as raw bytes or base64 text.
    pub async fn ingest_document(
        &self,
        actor: &Principal,
        subject: &PrincipalId,
        filename: &str,
        document: &[u8],
        key_input: &[u8],
    ) -> Result<DocumentId, Error> {
        require(actor, &[Role::Owner, Role::Operator], "store documents")?;
        let key = SymmetricKey::decode(key_input)?;
        let blob = DocumentCipher::new(&key).seal(document)?.to_base64();
        drop(key);

        let id = self
            .store
            .store_document_envelope(subject, filename, blob)
            .await?;
        info!(
            principal = %actor.id,
            subject = %subject,
            document = %id,
            filename,
            len = document.len(),
            "stored encrypted document"
        );
        Ok(id)
    }

    /// Load and decrypt a stored document
    pub async fn retrieve_document(
        &self,
        actor: &Principal,
        id: DocumentId,
        key_input: &[u8],
    ) -> Result<Attachment, Error> {
        require(actor, &[Role::Owner, Role::Operator], "read documents")?;
        let key = SymmetricKey::decode(key_input)?;
        let doc = self
            .store
            .load_document_envelope(id)
            .await?
            .ok_or_else(|| Error::DocumentNotFound(id.to_string()))?;

        let plaintext = DocumentCipher::new(&key)
            .open_stored(&doc.blob)
            .map_err(|e| {
                warn!(principal = %actor.id, document = %id, error = %e, "document not readable");
                e
            })?;
        debug!(principal = %actor.id, document = %id, len = plaintext.len(), "decrypted document");

        Ok(Attachment::new(
            &doc.filename,
            Attachment::media_type_for(&doc.filename),
            plaintext,
        ))
    }
}
