//! Document encryption

pub mod chacha20;
pub use chacha20::{decrypt, encrypt, DocumentCipher};

mod envelope;
pub use envelope::{DocumentEnvelope, HEADERBYTES};
