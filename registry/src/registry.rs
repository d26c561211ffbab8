//! Quest creation, cancellation, and listing.

use crate::error::RegistryError;
use sidequest_crypto::hash_description;
use sidequest_settlement::pda;
use sidequest_store::quest::{QuestFilter, QuestRecord};
use sidequest_store::Store;
use sidequest_types::{
    Address, AssetId, ProtocolParams, QuestId, QuestStatus, QuestType, Timestamp, TokenAmount,
    UserId,
};
use std::sync::Arc;

/// Input for quest creation, as resolved by the API layer.
#[derive(Clone, Debug)]
pub struct CreateQuestInput {
    pub creator: UserId,
    pub creator_wallet: Address,
    pub description: String,
    pub reward_amount: TokenAmount,
    pub reward_asset: AssetId,
    pub quest_type: QuestType,
    pub target_wallet: Option<Address>,
    pub max_claimers: Option<u32>,
    pub time_limit_hours: Option<u64>,
}

/// Listing filters; page bounds are clamped against the protocol params.
#[derive(Clone, Debug, Default)]
pub struct QuestQuery {
    pub status: Option<QuestStatus>,
    pub quest_type: Option<QuestType>,
    pub creator: Option<UserId>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Owns the quest lifecycle.
pub struct QuestRegistry {
    store: Arc<dyn Store>,
    params: ProtocolParams,
    program: Address,
}

impl QuestRegistry {
    pub fn new(store: Arc<dyn Store>, params: ProtocolParams, program: Address) -> Self {
        Self {
            store,
            params,
            program,
        }
    }

    /// Validate and persist a new quest.
    ///
    /// Runs the moderation gate before anything is persisted, allocates the
    /// next on-chain sequence number, and derives the quest and escrow
    /// addresses from it.
    pub fn create_quest(
        &self,
        input: CreateQuestInput,
        now: Timestamp,
    ) -> Result<QuestRecord, RegistryError> {
        sidequest_moderation::check_description(&input.description)?;

        if input.quest_type == QuestType::Direct {
            let target = input
                .target_wallet
                .as_ref()
                .ok_or(RegistryError::MissingTarget)?;
            if *target == input.creator_wallet {
                return Err(RegistryError::SelfTarget);
            }
        }

        if input.reward_amount < self.params.min_reward {
            return Err(RegistryError::RewardTooLow {
                minimum: self.params.min_reward,
            });
        }

        let max_claimers = input.max_claimers.unwrap_or(1);
        if max_claimers < 1 || max_claimers > self.params.max_claimers_limit {
            return Err(RegistryError::InvalidMaxClaimers {
                limit: self.params.max_claimers_limit,
            });
        }

        let sequence = self.store.next_sequence()?;
        let quest_address = pda::quest_address(&self.program, sequence);
        let escrow_address = pda::escrow_address(&self.program, &quest_address);
        let deadline = input.time_limit_hours.map(|h| now.plus_secs(h * 3600));

        let quest = QuestRecord {
            id: QuestId::new(sidequest_utils::generate_id("qst")),
            sequence,
            creator: input.creator.clone(),
            creator_wallet: input.creator_wallet,
            description_hash: hash_description(&input.description),
            description: input.description,
            quest_type: input.quest_type,
            status: QuestStatus::Active,
            reward_amount: input.reward_amount,
            reward_asset: input.reward_asset,
            target_wallet: input.target_wallet,
            max_claimers,
            current_claimers: 0,
            deadline,
            quest_address,
            escrow_address,
            created_at: now,
        };

        self.store.put_quest(&quest)?;
        self.store.incr_quests_posted(&input.creator)?;

        tracing::info!(
            quest = %quest.id,
            sequence,
            reward = %quest.reward_amount,
            "quest created"
        );
        Ok(quest)
    }

    /// Cancel a quest: creator only, `Active` only, zero claimers only.
    pub fn cancel_quest(&self, id: &QuestId, actor: &UserId) -> Result<QuestRecord, RegistryError> {
        let quest = self.store.get_quest(id)?;
        if &quest.creator != actor {
            return Err(RegistryError::NotCreator);
        }
        if quest.status != QuestStatus::Active {
            return Err(RegistryError::NotActive);
        }
        if quest.current_claimers > 0 {
            return Err(RegistryError::HasClaimers);
        }

        // Compare-and-set: a claim racing in after the check above flips the
        // status and this fails instead of cancelling a claimed quest.
        let cancelled = self
            .store
            .set_quest_status(id, QuestStatus::Active, QuestStatus::Cancelled)
            .map_err(|err| match err {
                sidequest_store::StoreError::StatusConflict { .. } => RegistryError::NotActive,
                other => other.into(),
            })?;

        tracing::info!(quest = %id, "quest cancelled");
        Ok(cancelled)
    }

    pub fn get_quest(&self, id: &QuestId) -> Result<QuestRecord, RegistryError> {
        Ok(self.store.get_quest(id)?)
    }

    /// List quests, newest first. Page size defaults to
    /// `params.default_page_size` and is capped at `params.max_page_size`.
    pub fn list_quests(&self, query: &QuestQuery) -> Result<Vec<QuestRecord>, RegistryError> {
        let limit = query
            .limit
            .unwrap_or(self.params.default_page_size)
            .clamp(1, self.params.max_page_size);

        let filter = QuestFilter {
            status: query.status,
            quest_type: query.quest_type,
            creator: query.creator.clone(),
            limit: limit as usize,
            offset: query.offset.unwrap_or(0) as usize,
        };
        Ok(self.store.list_quests(&filter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidequest_moderation::ModerationError;
    use sidequest_store::user::UserRecord;
    use sidequest_store::{QuestStore, UserStore};
    use sidequest_store_memory::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, QuestRegistry) {
        let store = Arc::new(MemoryStore::new());
        store
            .put_user(&UserRecord::new(
                UserId::new("creator"),
                Address::new("sq_creator"),
                Timestamp::new(0),
            ))
            .unwrap();
        let registry = QuestRegistry::new(
            store.clone(),
            ProtocolParams::default(),
            Address::new("sq_program"),
        );
        (store, registry)
    }

    fn input() -> CreateQuestInput {
        CreateQuestInput {
            creator: UserId::new("creator"),
            creator_wallet: Address::new("sq_creator"),
            description: "Do 50 pushups in the park".into(),
            reward_amount: TokenAmount::new(5_000_000),
            reward_asset: AssetId::new("mint"),
            quest_type: QuestType::Open,
            target_wallet: None,
            max_claimers: Some(3),
            time_limit_hours: None,
        }
    }

    #[test]
    fn create_persists_active_quest_and_counts_it() {
        let (store, registry) = setup();
        let quest = registry.create_quest(input(), Timestamp::new(1000)).unwrap();

        assert_eq!(quest.status, QuestStatus::Active);
        assert_eq!(quest.current_claimers, 0);
        assert_eq!(quest.sequence, 0);
        assert!(quest.quest_address.as_str().starts_with("sq_"));
        assert!(!quest.description_hash.is_zero());

        let stored = store.get_quest(&quest.id).unwrap();
        assert_eq!(stored.escrow_address, quest.escrow_address);
        assert_eq!(store.get_user(&UserId::new("creator")).unwrap().quests_posted, 1);
    }

    #[test]
    fn sequences_and_addresses_advance_per_quest() {
        let (_, registry) = setup();
        let a = registry.create_quest(input(), Timestamp::new(1000)).unwrap();
        let b = registry.create_quest(input(), Timestamp::new(1001)).unwrap();
        assert_eq!(a.sequence, 0);
        assert_eq!(b.sequence, 1);
        assert_ne!(a.quest_address, b.quest_address);
        assert_ne!(a.escrow_address, b.escrow_address);
    }

    #[test]
    fn moderation_gate_runs_before_persistence() {
        let (store, registry) = setup();
        let mut bad = input();
        bad.description = "murder someone".into();

        let err = registry.create_quest(bad, Timestamp::new(1000)).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Moderation(ModerationError::ProhibitedTerm { .. })
        ));
        assert!(store.list_quests(&QuestFilter::default()).unwrap().is_empty());
        assert_eq!(store.get_user(&UserId::new("creator")).unwrap().quests_posted, 0);
    }

    #[test]
    fn direct_quest_requires_target() {
        let (_, registry) = setup();
        let mut direct = input();
        direct.quest_type = QuestType::Direct;
        assert!(matches!(
            registry.create_quest(direct, Timestamp::new(1000)),
            Err(RegistryError::MissingTarget)
        ));
    }

    #[test]
    fn direct_quest_rejects_self_target() {
        let (_, registry) = setup();
        let mut direct = input();
        direct.quest_type = QuestType::Direct;
        direct.target_wallet = Some(Address::new("sq_creator"));
        assert!(matches!(
            registry.create_quest(direct, Timestamp::new(1000)),
            Err(RegistryError::SelfTarget)
        ));
    }

    #[test]
    fn reward_floor_is_enforced() {
        let (_, registry) = setup();
        let mut cheap = input();
        cheap.reward_amount = TokenAmount::new(999_999);
        assert!(matches!(
            registry.create_quest(cheap, Timestamp::new(1000)),
            Err(RegistryError::RewardTooLow { .. })
        ));
    }

    #[test]
    fn max_claimers_bounds() {
        let (_, registry) = setup();
        for bad in [0u32, 101] {
            let mut i = input();
            i.max_claimers = Some(bad);
            assert!(matches!(
                registry.create_quest(i, Timestamp::new(1000)),
                Err(RegistryError::InvalidMaxClaimers { .. })
            ));
        }
        let mut ok = input();
        ok.max_claimers = Some(100);
        assert!(registry.create_quest(ok, Timestamp::new(1000)).is_ok());
    }

    #[test]
    fn max_claimers_defaults_to_one() {
        let (_, registry) = setup();
        let mut i = input();
        i.max_claimers = None;
        let quest = registry.create_quest(i, Timestamp::new(1000)).unwrap();
        assert_eq!(quest.max_claimers, 1);
    }

    #[test]
    fn time_limit_becomes_absolute_deadline() {
        let (_, registry) = setup();
        let mut i = input();
        i.time_limit_hours = Some(2);
        let quest = registry.create_quest(i, Timestamp::new(1000)).unwrap();
        assert_eq!(quest.deadline, Some(Timestamp::new(1000 + 7200)));
    }

    #[test]
    fn cancel_requires_creator_active_and_empty() {
        let (store, registry) = setup();
        let quest = registry.create_quest(input(), Timestamp::new(1000)).unwrap();

        assert!(matches!(
            registry.cancel_quest(&quest.id, &UserId::new("stranger")),
            Err(RegistryError::NotCreator)
        ));

        store.try_reserve_slot(&quest.id).unwrap();
        assert!(matches!(
            registry.cancel_quest(&quest.id, &UserId::new("creator")),
            Err(RegistryError::HasClaimers)
        ));

        store.release_slot(&quest.id).unwrap();
        let cancelled = registry
            .cancel_quest(&quest.id, &UserId::new("creator"))
            .unwrap();
        assert_eq!(cancelled.status, QuestStatus::Cancelled);

        assert!(matches!(
            registry.cancel_quest(&quest.id, &UserId::new("creator")),
            Err(RegistryError::NotActive)
        ));
    }

    #[test]
    fn cancel_missing_quest_is_not_found() {
        let (_, registry) = setup();
        assert!(matches!(
            registry.cancel_quest(&QuestId::new("missing"), &UserId::new("creator")),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn listing_clamps_page_size() {
        let (_, registry) = setup();
        for i in 0..60 {
            let mut q = input();
            q.max_claimers = Some(1);
            registry.create_quest(q, Timestamp::new(1000 + i)).unwrap();
        }

        let default_page = registry.list_quests(&QuestQuery::default()).unwrap();
        assert_eq!(default_page.len(), 20);

        let oversized = registry
            .list_quests(&QuestQuery {
                limit: Some(500),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(oversized.len(), 50);

        // Newest first.
        assert!(default_page[0].created_at >= default_page[1].created_at);
    }

    #[test]
    fn listing_filters_by_status() {
        let (_, registry) = setup();
        let quest = registry.create_quest(input(), Timestamp::new(1000)).unwrap();
        registry.cancel_quest(&quest.id, &UserId::new("creator")).unwrap();
        registry.create_quest(input(), Timestamp::new(1001)).unwrap();

        let active = registry
            .list_quests(&QuestQuery {
                status: Some(QuestStatus::Active),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(active.len(), 1);
        let cancelled = registry
            .list_quests(&QuestQuery {
                status: Some(QuestStatus::Cancelled),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(cancelled.len(), 1);
    }
}
