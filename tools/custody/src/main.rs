//!
//! Key custody and document encryption using record-keeper
//!
//! # Syntax:
//!
//! ```text
//!  # Generate a key pair (public.pem, private-key.pem)
//!  $ custody keygen -o DIR [ -b BITS ]
//!
//!  # Start an epoch: new document key, wrapped for the owner
//!  $ custody epoch new --owner-public PEM -o FILE
//!
//!  # Re-wrap the owner's key for an operator
//!  $ custody epoch share --artifact FILE --owner-private PEM --operator-public PEM -o FILE
//!
//!  # Unwrap an artifact; writes the document key as base64
//!  $ custody epoch recover --artifact FILE --private PEM -o FILE
//!
//!  # Encrypt / decrypt a document
//!  $ custody doc seal --key FILE -o OUT FILE
//!  $ custody doc open --key FILE -o OUT FILE
//! ```
//!
//! Settings come from `RECORD_KEEPER_RSA_BITS` and `RECORD_KEEPER_OAEP_DIGEST`;
//! `--bits` and `--oaep-digest` override them. Log output goes to stderr and
//! follows `RUST_LOG`, or `-v` when that is unset.
//!

use clap::Parser;
mod options;
use options::{
    Command::{Doc, Epoch, Keygen},
    DocCommand::{Open, Seal},
    DocOptions,
    EpochCommand::{New, Recover, Share},
    KeygenOptions, Main, NewEpochOptions, RecoverOptions, ShareOptions,
};
use record_keeper::{
    ciphers::DocumentCipher,
    custody::KeyCustody,
    keepers::{generate_keypair, RecipientKey},
    KeeperConfig, SymmetricKey,
};
use std::path::Path;
use thiserror::Error as ThisError;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// file name of the public half written by `keygen`
const PUBLIC_KEY_FILE: &str = "public.pem";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Error> {
    let args = Main::parse();
    init_logging(args.verbose);

    let mut config = KeeperConfig::from_env()?;
    if let Some(digest) = args.oaep_digest {
        config.oaep_digest = digest;
    }
    debug!(?config, "settings");

    match args.command {
        Keygen(opt) => keygen(&opt, config).await,
        Epoch(e) => {
            let custody = KeyCustody::new(config.oaep_digest);
            match e.command {
                New(opt) => new_epoch(&opt, &custody).await,
                Share(opt) => share_epoch(&opt, &custody).await,
                Recover(opt) => recover_epoch(&opt, &custody).await,
            }
        }
        Doc(d) => match d.command {
            Seal(opt) => seal_document(&opt).await,
            Open(opt) => open_document(&opt).await,
        },
    }
}

#[derive(Debug, ThisError)]
pub(crate) enum Error {
    #[error("{0}")]
    IOError(std::io::Error),

    #[error("{0}")]
    LibError(#[from] record_keeper::error::Error),

    #[error("{0}: {1}")]
    InvalidFile(String, String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e)
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    tokio::fs::read(path)
        .await
        .map_err(|e| Error::InvalidFile(path.display().to_string(), e.to_string()))
}

#[cfg(unix)]
fn owner_only(options: &mut OpenOptions) {
    options.mode(0o600);
}

#[cfg(not(unix))]
fn owner_only(_: &mut OpenOptions) {}

/// Write `data` to `path`. Key material and decrypted documents are created owner-only.
async fn write_file(path: &Path, data: &[u8], secret: bool) -> Result<(), Error> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if secret {
        owner_only(&mut options);
    }
    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?; // flush file and metadata to disk before returning
    Ok(())
}

/// Generate a key pair, writing both halves to the output directory
pub(crate) async fn keygen(opt: &KeygenOptions, mut config: KeeperConfig) -> Result<(), Error> {
    if let Some(bits) = opt.bits {
        config.rsa_bits = bits;
    }
    config.validate()?;
    let bits = config.rsa_bits;
    let pair = tokio::task::spawn_blocking(move || generate_keypair(bits))
        .await
        .map_err(|e| {
            record_keeper::error::Error::KeyGeneration(format!("key generation task failed: {}", e))
        })??;

    // nothing is written unless the public half parses back
    let fingerprint = RecipientKey::from_pem(&pair.public_key)?.fingerprint();
    tokio::fs::create_dir_all(&opt.output).await?;
    write_file(
        &opt.output.join(PUBLIC_KEY_FILE),
        pair.public_key.as_bytes(),
        false,
    )
    .await?;
    write_file(
        &opt.output.join(&config.attachments.private_key),
        pair.private_key.as_bytes(),
        true,
    )
    .await?;
    info!(%fingerprint, bits, "generated key pair");
    println!("{}", fingerprint);
    Ok(())
}

/// Issue a new epoch key, wrapped for the owner
pub(crate) async fn new_epoch(opt: &NewEpochOptions, custody: &KeyCustody) -> Result<(), Error> {
    let owner = RecipientKey::from_pem_bytes(&read_file(&opt.owner_public).await?)?;
    let wrapped = custody.issue(&owner)?;
    write_file(&opt.output, wrapped.to_base64().as_bytes(), false).await?;
    info!(fingerprint = %owner.fingerprint(), "issued epoch key");
    Ok(())
}

/// Re-wrap the owner's artifact for an operator
pub(crate) async fn share_epoch(opt: &ShareOptions, custody: &KeyCustody) -> Result<(), Error> {
    let artifact = read_file(&opt.artifact).await?;
    let owner_private = zeroize::Zeroizing::new(read_file(&opt.owner_private).await?);
    let operator = RecipientKey::from_pem_bytes(&read_file(&opt.operator_public).await?)?;

    let wrapped = custody.distribute_upload(&artifact, &owner_private, &operator)?;
    write_file(&opt.output, wrapped.to_base64().as_bytes(), false).await?;
    info!(fingerprint = %operator.fingerprint(), "shared epoch key");
    Ok(())
}

/// Unwrap an artifact and write the document key as base64
pub(crate) async fn recover_epoch(
    opt: &RecoverOptions,
    custody: &KeyCustody,
) -> Result<(), Error> {
    let artifact = read_file(&opt.artifact).await?;
    let private = zeroize::Zeroizing::new(read_file(&opt.private).await?);

    let key = custody.recover_upload(&artifact, &private)?;
    write_file(&opt.output, key.to_base64().as_bytes(), true).await?;
    info!("recovered epoch key");
    Ok(())
}

async fn load_key(path: &Path) -> Result<SymmetricKey, Error> {
    let input = zeroize::Zeroizing::new(read_file(path).await?);
    Ok(SymmetricKey::decode(&input)?)
}

/// Encrypt a file, writing the base64 envelope
pub(crate) async fn seal_document(opt: &DocOptions) -> Result<(), Error> {
    let key = load_key(&opt.key).await?;
    let plaintext = read_file(&opt.file).await?;
    let blob = DocumentCipher::new(&key).seal(&plaintext)?.to_base64();
    write_file(&opt.output, blob.as_bytes(), false).await?;
    info!(len = plaintext.len(), "sealed document");
    Ok(())
}

/// Decrypt a base64 envelope file
pub(crate) async fn open_document(opt: &DocOptions) -> Result<(), Error> {
    let key = load_key(&opt.key).await?;
    let blob = read_file(&opt.file).await?;
    let blob = String::from_utf8(blob).map_err(|_| {
        Error::InvalidFile(
            opt.file.display().to_string(),
            "envelope is not base64 text".to_string(),
        )
    })?;
    let plaintext = zeroize::Zeroizing::new(DocumentCipher::new(&key).open_stored(blob.trim())?);
    write_file(&opt.output, &plaintext, true).await?;
    info!(len = plaintext.len(), "opened document");
    Ok(())
}

#[cfg(test)]
mod test;
