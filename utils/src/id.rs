//! Random entity identifiers.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random portion of generated ids.
const ID_LEN: usize = 21;

/// Generate a prefixed, url-safe random identifier, e.g. `qst_h3k9...`.
pub fn generate_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect();
    format!("{prefix}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix_and_length() {
        let id = generate_id("qst");
        assert!(id.starts_with("qst_"));
        assert_eq!(id.len(), 4 + ID_LEN);
    }

    #[test]
    fn ids_are_unique_enough() {
        let a = generate_id("clm");
        let b = generate_id("clm");
        assert_ne!(a, b);
    }
}
