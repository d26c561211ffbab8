//! Quest storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use sidequest_types::{
    Address, AssetId, ContentHash, QuestId, QuestStatus, QuestType, Timestamp, TokenAmount, UserId,
};

/// A quest as recorded in the off-chain ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestRecord {
    pub id: QuestId,
    /// Value of the on-chain quest counter at creation; seeds the quest address.
    pub sequence: u64,
    pub creator: UserId,
    pub creator_wallet: Address,
    pub description: String,
    pub description_hash: ContentHash,
    pub quest_type: QuestType,
    pub status: QuestStatus,
    pub reward_amount: TokenAmount,
    pub reward_asset: AssetId,
    /// Required claimer wallet for direct quests.
    pub target_wallet: Option<Address>,
    pub max_claimers: u32,
    pub current_claimers: u32,
    pub deadline: Option<Timestamp>,
    pub quest_address: Address,
    pub escrow_address: Address,
    pub created_at: Timestamp,
}

/// Filters for quest listings. `limit`/`offset` are applied after filtering,
/// newest first.
#[derive(Clone, Debug, Default)]
pub struct QuestFilter {
    pub status: Option<QuestStatus>,
    pub quest_type: Option<QuestType>,
    pub creator: Option<UserId>,
    pub limit: usize,
    pub offset: usize,
}

/// Trait for quest storage operations.
///
/// Slot accounting (`try_reserve_slot` / `release_slot`) and status changes
/// (`set_quest_status`) are single atomic operations in the backend: callers
/// never read-modify-write a quest's claimer count or status themselves.
pub trait QuestStore {
    fn put_quest(&self, quest: &QuestRecord) -> Result<(), StoreError>;

    fn get_quest(&self, id: &QuestId) -> Result<QuestRecord, StoreError>;

    /// List quests matching the filter, ordered by creation time descending.
    fn list_quests(&self, filter: &QuestFilter) -> Result<Vec<QuestRecord>, StoreError>;

    /// Compare-and-set the quest status. Fails with `StatusConflict` if the
    /// current status is not `from`, and with `Backend` if the transition is
    /// not in the quest transition table. Returns the updated record.
    fn set_quest_status(
        &self,
        id: &QuestId,
        from: QuestStatus,
        to: QuestStatus,
    ) -> Result<QuestRecord, StoreError>;

    /// Atomically increment `current_claimers`, flipping the status to
    /// `Claimed` when the last slot fills. Fails with `SlotsExhausted` when
    /// the quest is full and `StatusConflict` when it is not `Active`.
    /// Returns the updated record.
    fn try_reserve_slot(&self, id: &QuestId) -> Result<QuestRecord, StoreError>;

    /// Atomically decrement `current_claimers` (never below zero), reopening
    /// a `Claimed` quest to `Active`. Returns the updated record.
    fn release_slot(&self, id: &QuestId) -> Result<QuestRecord, StoreError>;

    /// Active quests whose deadline has passed with no claimers.
    fn stale_quests(&self, now: Timestamp) -> Result<Vec<QuestRecord>, StoreError>;

    /// Allocate the next value of the monotonically increasing quest
    /// sequence counter.
    fn next_sequence(&self) -> Result<u64, StoreError>;
}
