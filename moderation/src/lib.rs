//! Static content-policy gate for quest descriptions.
//!
//! A pure check with no I/O: length bounds plus a case-insensitive blocklist
//! substring scan. Runs before any quest is persisted.

use thiserror::Error;

/// Minimum description length in characters.
pub const MIN_DESCRIPTION_LEN: usize = 1;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 280;

/// Terms that reject a description outright, matched case-insensitively as
/// substrings.
const BLOCKLIST: &[&str] = &[
    "kill", "murder", "suicide", "bomb", "terror",
    "child", "minor", "underage",
    "doxx", "swat",
    "nude", "naked", "sex",
    "racist", "slur",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModerationError {
    #[error("description must be {MIN_DESCRIPTION_LEN}-{MAX_DESCRIPTION_LEN} characters")]
    LengthOutOfRange,

    #[error("contains prohibited content: {term}")]
    ProhibitedTerm { term: String },
}

/// All blocklist terms present in the text, in blocklist order.
pub fn flagged_terms(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    BLOCKLIST
        .iter()
        .copied()
        .filter(|term| lower.contains(term))
        .collect()
}

/// Check a quest description against the content policy.
pub fn check_description(description: &str) -> Result<(), ModerationError> {
    let len = description.chars().count();
    if !(MIN_DESCRIPTION_LEN..=MAX_DESCRIPTION_LEN).contains(&len) {
        return Err(ModerationError::LengthOutOfRange);
    }

    let flagged = flagged_terms(description);
    if !flagged.is_empty() {
        return Err(ModerationError::ProhibitedTerm {
            term: flagged.join(", "),
        });
    }

    Ok(())
}
