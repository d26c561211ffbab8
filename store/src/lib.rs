//! Abstract storage traits for the Sidequest ledger.
//!
//! Every storage backend implements these traits; the engines depend only on
//! the traits. Records live next to the trait that owns them.

pub mod claim;
pub mod error;
pub mod job;
pub mod proof;
pub mod quest;
pub mod user;

pub use claim::{ClaimRecord, ClaimStore};
pub use error::StoreError;
pub use job::{JobStore, VerificationJobRecord};
pub use proof::{ProofRecord, ProofStore};
pub use quest::{QuestFilter, QuestRecord, QuestStore};
pub use user::{UserRecord, UserStore};

/// Everything the engines need from a backend, in one bound. Backends are
/// shared across the request path, the queue consumer, and the crank task.
pub trait Store:
    QuestStore + ClaimStore + ProofStore + JobStore + UserStore + Send + Sync
{
}

impl<T: QuestStore + ClaimStore + ProofStore + JobStore + UserStore + Send + Sync> Store for T {}
