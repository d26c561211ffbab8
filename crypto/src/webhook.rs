//! HMAC-SHA256 webhook signatures.
//!
//! Re-trigger webhooks carry `x-webhook-signature`: the hex-encoded
//! HMAC-SHA256 of the raw request body under the shared secret. Verification
//! happens before the body is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded HMAC-SHA256 signature for a raw body.
pub fn sign_webhook_body(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded signature against the raw body.
///
/// The comparison is byte-for-byte on the hex encodings; malformed hex in
/// the presented signature simply fails to match.
pub fn verify_webhook_signature(secret: &[u8], body: &[u8], signature: &str) -> bool {
    sign_webhook_body(secret, body) == signature
}
