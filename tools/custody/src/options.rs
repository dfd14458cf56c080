use clap::{ArgAction, Args, Parser, Subcommand};
use record_keeper::keepers::OaepDigest;
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(name = "custody", version)]
// derive version from Cargo.toml
pub struct Main {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// OAEP digest for wrapping keys (sha1 or sha256).
    /// Defaults to RECORD_KEEPER_OAEP_DIGEST, or sha1.
    #[arg(long, global = true)]
    pub oaep_digest: Option<OaepDigest>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Generate an RSA key pair
    #[command(name = "keygen")]
    Keygen(KeygenOptions),

    /// Issue, share, and recover epoch keys
    #[command(name = "epoch")]
    Epoch(Epoch),

    /// Encrypt and decrypt documents
    #[command(name = "doc")]
    Doc(Doc),
}

#[derive(Args, Clone, Debug)]
pub struct KeygenOptions {
    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Modulus size. Defaults to RECORD_KEEPER_RSA_BITS, or 2048.
    #[arg(short, long)]
    pub bits: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct Epoch {
    #[command(subcommand)]
    pub command: EpochCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum EpochCommand {
    /// New document key, wrapped for the owner
    #[command(name = "new")]
    New(NewEpochOptions),

    /// Re-wrap the owner's key for an operator
    #[command(name = "share")]
    Share(ShareOptions),

    /// Unwrap a key artifact; writes the document key as base64
    #[command(name = "recover")]
    Recover(RecoverOptions),
}

#[derive(Args, Clone, Debug)]
pub struct NewEpochOptions {
    /// Owner's public key (PEM)
    #[arg(long)]
    pub owner_public: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct ShareOptions {
    /// Owner's key artifact
    #[arg(long)]
    pub artifact: PathBuf,

    /// Owner's private key (PEM)
    #[arg(long)]
    pub owner_private: PathBuf,

    /// Operator's public key (PEM)
    #[arg(long)]
    pub operator_public: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct RecoverOptions {
    /// Key artifact
    #[arg(long)]
    pub artifact: PathBuf,

    /// Private key of the artifact's holder (PEM)
    #[arg(long)]
    pub private: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct Doc {
    #[command(subcommand)]
    pub command: DocCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum DocCommand {
    /// Encrypt a document; writes the base64 envelope
    #[command(name = "seal")]
    Seal(DocOptions),

    /// Decrypt a base64 envelope
    #[command(name = "open")]
    Open(DocOptions),
}

#[derive(Args, Clone, Debug)]
pub struct DocOptions {
    /// Document key, base64 or raw
    #[arg(short, long)]
    pub key: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Input file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
