use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

/// Types convertible to a standard (padded) base64 string.
/// This is the text form of wrapped keys, symmetric keys, and stored envelopes.
pub trait ToBase64 {
    fn to_base64(&self) -> String;
}

/// Base64 text that can be decoded into a byte vector.
/// ASCII whitespace anywhere in the input is ignored, so wrapped or
/// newline-terminated upload files decode the same as a bare string.
pub trait FromBase64 {
    fn from_base64(&self) -> Result<Zeroizing<Vec<u8>>, Error>;
}

impl ToBase64 for [u8] {
    fn to_base64(&self) -> String {
        STANDARD.encode(self)
    }
}

impl ToBase64 for Vec<u8> {
    fn to_base64(&self) -> String {
        STANDARD.encode(self)
    }
}

impl FromBase64 for [u8] {
    fn from_base64(&self) -> Result<Zeroizing<Vec<u8>>, Error> {
        let compact: Zeroizing<Vec<u8>> = Zeroizing::new(
            self.iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect(),
        );
        STANDARD
            .decode(compact.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| Error::InvalidKeyMaterial("not valid base64".to_string()))
    }
}

impl FromBase64 for str {
    fn from_base64(&self) -> Result<Zeroizing<Vec<u8>>, Error> {
        self.as_bytes().from_base64()
    }
}

impl FromBase64 for String {
    fn from_base64(&self) -> Result<Zeroizing<Vec<u8>>, Error> {
        self.as_bytes().from_base64()
    }
}
