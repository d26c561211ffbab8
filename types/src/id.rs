//! Opaque string identifiers for ledger entities.
//!
//! Ids are generated by the store backend (random url-safe strings) and are
//! never interpreted; the newtypes exist so a claim id cannot be passed where
//! a quest id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a quest record.
    QuestId
);
string_id!(
    /// Identifier of a claim record.
    ClaimId
);
string_id!(
    /// Identifier of a proof record.
    ProofId
);
string_id!(
    /// Identifier of a verification job record.
    JobId
);
string_id!(
    /// Identifier of a user record.
    UserId
);
string_id!(
    /// Identifier of the reward asset (token mint).
    AssetId
);
string_id!(
    /// A confirmed ledger transaction signature, as returned by the RPC node.
    TxSignature
);
