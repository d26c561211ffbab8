//! Deterministic account address derivation.
//!
//! Every settlement-relevant account is derived from stable seeds so any
//! component — registry, claim ledger, crank, or an external cranker — can
//! recompute it without a lookup:
//!
//! - config:  `("config")`
//! - quest:   `("quest", sequence as LE u64)`
//! - escrow:  `("escrow", quest address)`
//! - claim:   `("claim", quest address, claimer wallet)`

use sidequest_crypto::derive_program_address;
use sidequest_types::Address;

/// The protocol configuration account.
pub fn config_address(program: &Address) -> Address {
    derive_program_address(program, &[b"config"])
}

/// The quest account for a given on-chain sequence number.
pub fn quest_address(program: &Address, sequence: u64) -> Address {
    derive_program_address(program, &[b"quest", &sequence.to_le_bytes()])
}

/// The escrow token account backing a quest.
pub fn escrow_address(program: &Address, quest: &Address) -> Address {
    derive_program_address(program, &[b"escrow", quest.as_str().as_bytes()])
}

/// The claim account for a claimer on a quest.
pub fn claim_address(program: &Address, quest: &Address, claimer: &Address) -> Address {
    derive_program_address(
        program,
        &[
            b"claim",
            quest.as_str().as_bytes(),
            claimer.as_str().as_bytes(),
        ],
    )
}
