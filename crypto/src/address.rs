//! Address derivation: wallet addresses from public keys, program addresses
//! from seed lists.
//!
//! Address format: `sq_` + base32(key material, 52 chars) + base32(checksum, 8 chars)
//!
//! Checksum: first 5 bytes of Blake2b-256(key material).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).
//! Total address length: 3 (prefix) + 52 + 8 = 63 characters.
//!
//! Program-derived addresses hash a domain tag, the program identity, and
//! the seed list into 32 bytes of key material, so any component can
//! recompute a quest/escrow/claim address without a lookup.

use sidequest_types::{Address, PublicKey};

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Expected length of the encoded part (after `sq_`): 52 key + 8 checksum.
const ENCODED_LEN: usize = 60;
/// Prefix for all Sidequest addresses.
const PREFIX: &str = "sq_";
/// Number of base32 characters for the key material (256 bits → 52).
const KEY_CHARS: usize = 52;
/// Domain separation tag for program-derived addresses.
const PDA_TAG: &[u8] = b"sidequest_pda";

/// Encode a byte slice as base32 using the Sidequest alphabet.
fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    // Remaining bits (padded with zeros on the right).
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

/// Decode a base32 string into a fixed-size byte array. Returns `None` on
/// invalid characters or wrong length. Zero-allocation.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos < N {
                result[pos] = (buffer >> bits_in_buffer) as u8;
                pos += 1;
            }
        }
    }

    if pos < N {
        return None;
    }
    Some(result)
}

/// Encode 32 bytes of key material into an `sq_` address.
fn encode_key_material(material: &[u8; 32]) -> Address {
    let key_encoded = encode_base32(material);
    let hash = crate::blake2b_256(material);
    let checksum_encoded = encode_base32(&hash[..5]);
    Address::new(format!("{PREFIX}{key_encoded}{checksum_encoded}"))
}

/// Derive an `sq_`-prefixed wallet address from an Ed25519 public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    encode_key_material(public_key.as_bytes())
}

/// Derive a program address from the program identity and a seed list.
///
/// The same (program, seeds) always yields the same address; distinct seed
/// lists yield distinct addresses. Seeds are length-prefixed before hashing
/// so `["ab", "c"]` and `["a", "bc"]` cannot collide.
pub fn derive_program_address(program: &Address, seeds: &[&[u8]]) -> Address {
    let mut parts: Vec<Vec<u8>> = Vec::with_capacity(2 + seeds.len() * 2);
    parts.push(PDA_TAG.to_vec());
    parts.push(program.as_str().as_bytes().to_vec());
    for seed in seeds {
        parts.push((seed.len() as u64).to_le_bytes().to_vec());
        parts.push(seed.to_vec());
    }
    let refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
    let material = crate::blake2b_256_multi(&refs);
    encode_key_material(&material)
}

/// Extract the 32 bytes of key material from a valid Sidequest address.
///
/// Returns `None` if the address is malformed or has an invalid checksum.
pub fn decode_address(address: &str) -> Option<[u8; 32]> {
    if !address.starts_with(PREFIX) {
        return None;
    }
    let encoded = &address[PREFIX.len()..];
    if encoded.len() != ENCODED_LEN {
        return None;
    }

    let key_encoded = &encoded[..KEY_CHARS];
    let checksum_encoded = &encoded[KEY_CHARS..];

    let key_bytes: [u8; 32] = decode_base32_fixed(key_encoded)?;
    let checksum_bytes: [u8; 5] = decode_base32_fixed(checksum_encoded)?;

    let expected_checksum = &crate::blake2b_256(&key_bytes)[..5];
    if checksum_bytes != *expected_checksum {
        return None;
    }

    Some(key_bytes)
}

/// Validate that an address string is well-formed and its checksum is correct.
pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}
