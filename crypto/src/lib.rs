//! Cryptographic primitives for the Sidequest protocol.
//!
//! - **Ed25519** for the settlement identity's transaction signing
//! - **Blake2b** for content hashes and deterministic address derivation
//! - **SHA-256** for ledger instruction method selectors
//! - **HMAC-SHA256** for webhook re-trigger signatures
//! - Address derivation with `sq_` prefix and base32 encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod webhook;

pub use address::{
    decode_address, derive_address, derive_program_address, validate_address,
};
pub use hash::{blake2b_256, blake2b_256_multi, hash_description, method_selector};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
pub use webhook::{sign_webhook_body, verify_webhook_signature};
