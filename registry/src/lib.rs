//! Quest registry — owns the quest lifecycle.
//!
//! Creation runs the moderation gate and type/reward/capacity validation,
//! allocates the on-chain sequence number, derives the quest and escrow
//! addresses, and persists the quest `Active`. Cancellation is restricted to
//! the creator while no claims exist. Listings are filtered, paginated, and
//! newest-first.

pub mod error;
pub mod registry;

pub use error::RegistryError;
pub use registry::{CreateQuestInput, QuestQuery, QuestRegistry};
