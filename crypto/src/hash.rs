//! Blake2b hashing for content and addresses, SHA-256 for method selectors.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha2::Sha256;
use sidequest_types::ContentHash;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a quest description to its recorded `ContentHash`.
pub fn hash_description(description: &str) -> ContentHash {
    ContentHash::new(blake2b_256(description.as_bytes()))
}

/// The 8-byte instruction selector for a settlement method.
///
/// First 8 bytes of `SHA-256("global:<method_name>")`, matching the ledger
/// program's dispatch rule so the gateway and the program agree without a
/// shared IDL.
pub fn method_selector(method: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(b"global:");
    hasher.update(method.as_bytes());
    let digest = hasher.finalize();
    let mut selector = [0u8; 8];
    selector.copy_from_slice(&digest[..8]);
    selector
}
