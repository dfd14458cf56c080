//! test utilities

use bytes::BytesMut;
use random_fast_rng::{FastRng, Random};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// RSA key pairs generated once with openssl, so tests don't pay for
/// key generation in debug builds.
///
/// - `OWNER_*` private key is PKCS#1 (`BEGIN RSA PRIVATE KEY`), like the
///   key files issued by the earlier deployment
/// - `OPERATOR_*` and `STRANGER_*` private keys are PKCS#8
/// - `WEAK_PUBLIC` is a 1024-bit key that must be rejected
pub mod fixtures {
    pub const OWNER_PUBLIC: &str = include_str!("../fixtures/owner_public.pem");
    pub const OWNER_PRIVATE: &str = include_str!("../fixtures/owner_private.pem");
    pub const OPERATOR_PUBLIC: &str = include_str!("../fixtures/operator_public.pem");
    pub const OPERATOR_PUBLIC_PKCS1: &str =
        include_str!("../fixtures/operator_public_pkcs1.pem");
    pub const OPERATOR_PRIVATE: &str = include_str!("../fixtures/operator_private.pem");
    pub const STRANGER_PUBLIC: &str = include_str!("../fixtures/stranger_public.pem");
    pub const STRANGER_PRIVATE: &str = include_str!("../fixtures/stranger_private.pem");
    pub const WEAK_PUBLIC: &str = include_str!("../fixtures/weak_public.pem");
    /// 2047-bit modulus: 256 bytes long, one bit short of the minimum
    pub const SHORT_PUBLIC: &str = include_str!("../fixtures/short_public.pem");
}

/// compare two arrays for equality
/// Returns true if arrays have the same length and corresponding elements are "equal"
/// ```
/// use record_keeper_test_util::arrays_eq;
/// let first: Vec<u8> = vec![1,2,3,4,5];
/// let mut second: Vec<u8> = Vec::new();
/// second.extend_from_slice(&first);
/// assert!(arrays_eq(&first, &second));
/// ```
pub fn arrays_eq<T: PartialEq>(a1: &[T], a2: &[T]) -> bool {
    a1.len() == a2.len() && a1.iter().zip(a2.iter()).all(|(a, b)| a == b)
}

/// Create a BytesMut buffer and fill with random data.
/// This does not generate cryptographically secure RNGs. Do NOT use this to generate keys,
/// except for unit tests.
/// ```
/// use record_keeper_test_util::random_bytes;
/// const BUF_LEN:usize = 128;
/// let data = random_bytes(BUF_LEN);
/// assert!(data.len() == BUF_LEN);
/// ```
pub fn random_bytes(len: usize) -> BytesMut {
    let mut buf = BytesMut::zeroed(len);
    FastRng::new().fill_bytes(buf.as_mut());
    buf
}

/// Fill buffer with random (English) word-like text
/// ```
/// use record_keeper_test_util::random_fill_text;
/// use random_fast_rng::FastRng;
/// let mut rng = FastRng::new();
/// let mut buf = [0u8; 256];
/// random_fill_text(&mut rng, &mut buf);
/// ```
pub fn random_fill_text(rng: &mut FastRng, buf: &mut [u8]) {
    // this string must be 32 chars (or longer) for bitmask below to work
    const ENGLISH_TEXT_CHARS: &[u8] = b"abcdefghijklmnoprstuvwxyz   etao";
    for b in buf.iter_mut() {
        *b = ENGLISH_TEXT_CHARS[rng.get_u8() as usize & 31]
    }
}

/// Build a byte buffer that starts like a PDF file, followed by pseudo-text.
/// Used as a stand-in for uploaded transcripts.
pub fn fake_pdf(len: usize) -> Vec<u8> {
    const HEADER: &[u8] = b"%PDF-1.7\n";
    let mut buf = vec![0u8; len.max(HEADER.len())];
    buf[..HEADER.len()].copy_from_slice(HEADER);
    random_fill_text(&mut FastRng::new(), &mut buf[HEADER.len()..]);
    buf
}

pub enum TestDataKind {
    Binary,
    PseudoText,
}

/// Creates file with random data. Returns temp file.
/// ```
/// use record_keeper_test_util::{create_test_file, TestDataKind::Binary};
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on( async {
/// const FSIZE:usize = 1024;
/// let f = create_test_file(FSIZE, Binary).await.expect("create");
/// let flen = tokio::fs::metadata(f.as_path()).await.expect("metadata").len();
/// assert_eq!(FSIZE, flen as usize);
/// # });
/// ```
pub async fn create_test_file(
    len: usize,
    contents: TestDataKind,
) -> Result<mktemp::Temp, std::io::Error> {
    const BUF_LEN: usize = 8192;
    let mut rng = FastRng::new();

    let tmpfile = mktemp::Temp::new_path();
    let mut test_out = File::create(&tmpfile).await?;
    let mut copy_buf = BytesMut::zeroed(BUF_LEN);
    let mut written: usize = 0;

    while written < len {
        let count: usize = std::cmp::min(BUF_LEN, len - written);
        match &contents {
            TestDataKind::Binary => rng.fill_bytes(&mut copy_buf[..count]),
            TestDataKind::PseudoText => random_fill_text(&mut rng, &mut copy_buf[..count]),
        }
        test_out.write_all(&copy_buf[..count]).await?;
        written += count;
    }
    test_out.sync_all().await?;
    Ok(tmpfile)
}
