//! Key pairs and key wrapping.
//!
//! A document key is never stored. It is wrapped (RSA-OAEP) under the public
//! key of whoever may hold it, and unwrapped with a private key the caller
//! supplies for the duration of one call. Private keys are never persisted
//! by this crate.
pub mod keypair;
pub use keypair::{
    generate_keypair, HolderKey, KeyPair, RecipientKey, MAX_RSA_BITS, MIN_RSA_BITS,
};

pub mod rsa;
pub use self::rsa::{unwrap, unwrap_pem, wrap, wrap_pem, OaepDigest};
