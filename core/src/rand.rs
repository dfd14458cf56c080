//! CSRNG based on platform (OS) CSRNG.
//!
//! Used for nonce generation and symmetric key generation. RSA key generation
//! and OAEP padding draw from `rand::rngs::OsRng`, which is backed by the
//! same platform source.
//!
use crate::error::{Error, Result};

/// Fill the buffer with random bytes
/// Currently implemented using `getrandom` crate, which uses
/// native OS/platform implementations.
pub fn fill_buf(buf: &mut [u8]) -> Result<(), Error> {
    getrandom::getrandom(buf)?;
    Ok(())
}

/// Returns a fixed-size array of fresh random bytes
pub fn random_array<const N: usize>() -> Result<[u8; N], Error> {
    let mut buf = [0u8; N];
    fill_buf(&mut buf)?;
    Ok(buf)
}
