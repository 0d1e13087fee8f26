//! Content digests for archive verification
//!
//! Release archives ship a `checksum.txt` entry holding the SHA-1 hex
//! digest of the binary, optionally followed by a file name.

use crate::error::{Result, UpdateError};
use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 digest of `bytes`
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compare the digest of `bytes` against `expected`, ignoring hex case
pub fn verify(bytes: &[u8], expected: &str) -> Result<String> {
    let actual = digest(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(actual)
    } else {
        Err(UpdateError::ChecksumMismatch {
            expected: expected.trim().to_string(),
            actual,
        })
    }
}

/// Extract the expected digest from checksum file content: the first
/// whitespace-separated token. `None` when the content is blank.
pub fn parse_checksum_file(content: &str) -> Option<&str> {
    content.split_whitespace().next()
}
