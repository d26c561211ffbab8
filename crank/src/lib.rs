//! Reconciliation crank.
//!
//! A periodic sweep that advances state machines past time-based deadlines
//! when no interested party acts: expiring overdue claims, auto-approving
//! stalled reviews, and retiring unclaimed quests whose deadline passed.
//!
//! Every item is processed inside its own error boundary — one failure is
//! recorded in the report and the sweep moves on. Sweeps are safe to re-run
//! and to race ordinary traffic: the first store operation per item is a
//! status compare-and-set, so an item that already moved on is skipped.

use sidequest_claims::{ClaimError, ClaimLedger};
use sidequest_settlement::SettlementGateway;
use sidequest_store::claim::ClaimRecord;
use sidequest_store::{Store, StoreError};
use sidequest_types::{ClaimStatus, DecidedBy, QuestStatus, Timestamp};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrankError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// What one crank run did.
#[derive(Clone, Debug, Default)]
pub struct CrankReport {
    /// Claims moved `Active → Expired`.
    pub expired_claims: u32,
    /// Claims auto-approved past their review deadline.
    pub auto_approved: u32,
    /// Quests retired `Active → Expired`.
    pub expired_quests: u32,
    /// Candidates that had already transitioned when processed.
    pub skipped: u32,
    /// Per-item failures; the sweep continued past each.
    pub failures: Vec<CrankFailure>,
}

#[derive(Clone, Debug)]
pub struct CrankFailure {
    pub item: String,
    pub error: String,
}

/// The periodic reconciliation sweep.
pub struct Crank {
    store: Arc<dyn Store>,
    gateway: Arc<SettlementGateway>,
    ledger: Arc<ClaimLedger>,
}

impl Crank {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<SettlementGateway>,
        ledger: Arc<ClaimLedger>,
    ) -> Self {
        Self {
            store,
            gateway,
            ledger,
        }
    }

    /// Run every sweep once against `now`.
    pub async fn run_once(&self, now: Timestamp) -> Result<CrankReport, CrankError> {
        let mut report = CrankReport::default();
        self.expire_overdue_claims(now, &mut report).await?;
        self.approve_stalled_reviews(now, &mut report).await?;
        self.expire_stale_quests(now, &mut report)?;

        tracing::info!(
            expired_claims = report.expired_claims,
            auto_approved = report.auto_approved,
            expired_quests = report.expired_quests,
            skipped = report.skipped,
            failures = report.failures.len(),
            "crank run complete"
        );
        Ok(report)
    }

    /// Sweep 1: claims still `Active` past their proof deadline.
    async fn expire_overdue_claims(
        &self,
        now: Timestamp,
        report: &mut CrankReport,
    ) -> Result<(), CrankError> {
        for claim in self.store.claims_past_proof_deadline(now)? {
            match self.expire_one_claim(&claim).await {
                Ok(true) => report.expired_claims += 1,
                Ok(false) => report.skipped += 1,
                Err(error) => report.failures.push(CrankFailure {
                    item: claim.id.to_string(),
                    error,
                }),
            }
        }
        Ok(())
    }

    /// Expire a single claim. Returns `Ok(false)` when the claim had
    /// already left `Active`.
    async fn expire_one_claim(&self, claim: &ClaimRecord) -> Result<bool, String> {
        // Compare-and-set first: exactly one sweep (or abandon racing in)
        // wins, so counters move once.
        match self
            .store
            .set_claim_status(&claim.id, ClaimStatus::Active, ClaimStatus::Expired)
        {
            Ok(_) => {}
            Err(StoreError::StatusConflict { .. }) => return Ok(false),
            Err(other) => return Err(other.to_string()),
        }

        let quest = self.store.get_quest(&claim.quest).map_err(|e| e.to_string())?;

        // Best effort: the on-chain side may already reflect expiry or can
        // be cranked again later. Local state advances regardless.
        if let Err(err) = self
            .gateway
            .expire_claim(&quest, claim, &claim.claimer_wallet)
            .await
        {
            tracing::warn!(claim = %claim.id, %err, "on-chain expiry pending");
        }

        self.store
            .release_slot(&claim.quest)
            .map_err(|e| e.to_string())?;
        self.store
            .decr_active_claims(&claim.claimer)
            .map_err(|e| e.to_string())?;

        tracing::info!(claim = %claim.id, quest = %claim.quest, "claim expired");
        Ok(true)
    }

    /// Sweep 2: claims `Submitted` whose review window lapsed; the claim
    /// ledger's timeout path settles via `auto_approve` and stamps the
    /// proof `approved`/`timeout`.
    async fn approve_stalled_reviews(
        &self,
        now: Timestamp,
        report: &mut CrankReport,
    ) -> Result<(), CrankError> {
        for claim in self.store.claims_past_review_deadline(now)? {
            match self
                .ledger
                .finalize_approval(&claim.id, DecidedBy::Timeout)
                .await
            {
                Ok(_) => {
                    tracing::info!(claim = %claim.id, "stalled review auto-approved");
                    report.auto_approved += 1;
                }
                Err(ClaimError::ClaimNotSubmitted) => report.skipped += 1,
                Err(err) => report.failures.push(CrankFailure {
                    item: claim.id.to_string(),
                    error: err.to_string(),
                }),
            }
        }
        Ok(())
    }

    /// Sweep 3: active quests past their deadline with nobody claiming.
    fn expire_stale_quests(
        &self,
        now: Timestamp,
        report: &mut CrankReport,
    ) -> Result<(), CrankError> {
        for quest in self.store.stale_quests(now)? {
            match self
                .store
                .set_quest_status(&quest.id, QuestStatus::Active, QuestStatus::Expired)
            {
                Ok(_) => {
                    tracing::info!(quest = %quest.id, "quest expired unclaimed");
                    report.expired_quests += 1;
                }
                Err(StoreError::StatusConflict { .. }) => report.skipped += 1,
                Err(other) => report.failures.push(CrankFailure {
                    item: quest.id.to_string(),
                    error: other.to_string(),
                }),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidequest_claims::{NullSink, ProofEvidence};
    use sidequest_crypto::{derive_address, keypair_from_seed};
    use sidequest_settlement::NullLedgerClient;
    use sidequest_store::quest::QuestRecord;
    use sidequest_store::user::UserRecord;
    use sidequest_store::{ClaimStore, ProofStore, QuestStore, UserStore};
    use sidequest_store_memory::MemoryStore;
    use sidequest_types::{
        Address, AssetId, ContentHash, ProofDecision, ProtocolParams, QuestId, QuestType,
        TokenAmount, UserId,
    };
    use std::time::Duration;

    const T0: Timestamp = Timestamp::EPOCH;

    struct Setup {
        store: Arc<MemoryStore>,
        client: Arc<NullLedgerClient>,
        ledger: Arc<ClaimLedger>,
        crank: Crank,
    }

    fn wallet(seed: u8) -> Address {
        derive_address(&keypair_from_seed(&[seed; 32]).public)
    }

    fn setup() -> Setup {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(NullLedgerClient::new());
        let program = wallet(200);
        let gateway = Arc::new(SettlementGateway::new(
            client.clone(),
            keypair_from_seed(&[201; 32]),
            program.clone(),
            wallet(202),
            Duration::from_secs(5),
        ));
        let ledger = Arc::new(ClaimLedger::new(
            store.clone(),
            gateway.clone(),
            ProtocolParams::default(),
            program,
        ));
        let crank = Crank::new(store.clone(), gateway, ledger.clone());

        for (id, seed) in [("creator", 1u8), ("alice", 2)] {
            store
                .put_user(&UserRecord::new(UserId::new(id), wallet(seed), T0))
                .unwrap();
        }

        Setup {
            store,
            client,
            ledger,
            crank,
        }
    }

    fn put_quest(s: &Setup, id: &str, deadline: Option<Timestamp>) -> QuestId {
        let quest = QuestRecord {
            id: QuestId::new(id),
            sequence: 0,
            creator: UserId::new("creator"),
            creator_wallet: wallet(1),
            description: "quest".into(),
            description_hash: ContentHash::ZERO,
            quest_type: QuestType::Open,
            status: sidequest_types::QuestStatus::Active,
            reward_amount: TokenAmount::new(100),
            reward_asset: AssetId::new("mint"),
            target_wallet: None,
            max_claimers: 1,
            current_claimers: 0,
            deadline,
            quest_address: wallet(240),
            escrow_address: wallet(241),
            created_at: T0,
        };
        s.store.put_quest(&quest).unwrap();
        quest.id
    }

    fn claim_quest(s: &Setup, quest: &QuestId) -> sidequest_store::claim::ClaimRecord {
        s.ledger
            .create_claim(quest, &UserId::new("alice"), TokenAmount::new(5), T0)
            .unwrap()
    }

    fn submit_proof(s: &Setup, claim: &sidequest_types::ClaimId) {
        s.ledger
            .submit_proof(
                claim,
                &UserId::new("alice"),
                ProofEvidence {
                    video_url: "https://cdn/videos/alice/v1".into(),
                    video_hash: "hash".into(),
                    duration_secs: 10,
                },
                T0.plus_secs(60),
                &NullSink::new(),
            )
            .unwrap();
    }

    // ── Sweep 1: expire overdue claims ─────────────────────────────────

    #[tokio::test]
    async fn overdue_claim_expires_and_reopens_quest() {
        let s = setup();
        let quest = put_quest(&s, "q1", None);
        let claim = claim_quest(&s, &quest);

        let after_deadline = T0.plus_secs(24 * 3600 + 1);
        let report = s.crank.run_once(after_deadline).await.unwrap();

        assert_eq!(report.expired_claims, 1);
        assert!(report.failures.is_empty());

        assert_eq!(
            s.store.get_claim(&claim.id).unwrap().status,
            ClaimStatus::Expired
        );
        let quest = s.store.get_quest(&quest).unwrap();
        assert_eq!(quest.status, sidequest_types::QuestStatus::Active);
        assert_eq!(quest.current_claimers, 0);
        assert_eq!(s.store.get_user(&UserId::new("alice")).unwrap().active_claims, 0);

        assert!(s.client.submitted()[0].instruction().is_method("expire_claim"));
    }

    #[tokio::test]
    async fn expire_sweep_is_idempotent() {
        let s = setup();
        let quest = put_quest(&s, "q1", None);
        claim_quest(&s, &quest);

        let later = T0.plus_secs(24 * 3600 + 1);
        s.crank.run_once(later).await.unwrap();
        let quest_after_first = s.store.get_quest(&quest).unwrap();
        let user_after_first = s.store.get_user(&UserId::new("alice")).unwrap();

        let report = s.crank.run_once(later).await.unwrap();
        assert_eq!(report.expired_claims, 0);

        let quest_after_second = s.store.get_quest(&quest).unwrap();
        assert_eq!(quest_after_second.current_claimers, quest_after_first.current_claimers);
        assert_eq!(quest_after_second.status, quest_after_first.status);
        assert_eq!(
            s.store.get_user(&UserId::new("alice")).unwrap().active_claims,
            user_after_first.active_claims
        );
    }

    #[tokio::test]
    async fn settlement_outage_does_not_block_expiry() {
        let s = setup();
        let quest = put_quest(&s, "q1", None);
        let claim = claim_quest(&s, &quest);

        s.client.set_failing(true);
        let report = s.crank.run_once(T0.plus_secs(24 * 3600 + 1)).await.unwrap();

        assert_eq!(report.expired_claims, 1);
        assert_eq!(
            s.store.get_claim(&claim.id).unwrap().status,
            ClaimStatus::Expired
        );
    }

    #[tokio::test]
    async fn claim_before_deadline_is_untouched() {
        let s = setup();
        let quest = put_quest(&s, "q1", None);
        let claim = claim_quest(&s, &quest);

        let report = s.crank.run_once(T0.plus_secs(3600)).await.unwrap();
        assert_eq!(report.expired_claims, 0);
        assert_eq!(
            s.store.get_claim(&claim.id).unwrap().status,
            ClaimStatus::Active
        );
    }

    // ── Sweep 2: auto-approve stalled reviews ──────────────────────────

    #[tokio::test]
    async fn stalled_review_auto_approves_via_timeout_path() {
        let s = setup();
        let quest = put_quest(&s, "q1", None);
        let claim = claim_quest(&s, &quest);
        submit_proof(&s, &claim.id);

        // Review deadline is T0+60+24h; run before it first.
        let before = T0.plus_secs(3600);
        let report = s.crank.run_once(before).await.unwrap();
        assert_eq!(report.auto_approved, 0);
        assert_eq!(
            s.store.get_claim(&claim.id).unwrap().status,
            ClaimStatus::Submitted
        );

        let after = T0.plus_secs(60 + 24 * 3600 + 1);
        let report = s.crank.run_once(after).await.unwrap();
        assert_eq!(report.auto_approved, 1);

        assert_eq!(
            s.store.get_claim(&claim.id).unwrap().status,
            ClaimStatus::Approved
        );
        assert_eq!(
            s.store.get_quest(&quest).unwrap().status,
            sidequest_types::QuestStatus::Completed
        );

        let proof = s.store.get_proof_by_claim(&claim.id).unwrap();
        assert_eq!(proof.final_decision, Some(ProofDecision::Approved));
        assert_eq!(proof.decided_by, Some(DecidedBy::Timeout));
        assert!(proof.settlement_tx.is_some());

        let user = s.store.get_user(&UserId::new("alice")).unwrap();
        assert_eq!(user.quests_completed, 1);
        assert_eq!(user.active_claims, 0);

        assert!(s.client.submitted()[0].instruction().is_method("auto_approve"));
    }

    #[tokio::test]
    async fn auto_approve_sweep_is_idempotent() {
        let s = setup();
        let quest = put_quest(&s, "q1", None);
        let claim = claim_quest(&s, &quest);
        submit_proof(&s, &claim.id);

        let after = T0.plus_secs(60 + 24 * 3600 + 1);
        s.crank.run_once(after).await.unwrap();
        let report = s.crank.run_once(after).await.unwrap();

        assert_eq!(report.auto_approved, 0);
        assert_eq!(s.client.submission_count(), 1);
        assert_eq!(
            s.store.get_user(&UserId::new("alice")).unwrap().quests_completed,
            1
        );
    }

    // ── Sweep 3: stale quests ──────────────────────────────────────────

    #[tokio::test]
    async fn unclaimed_quest_past_deadline_expires() {
        let s = setup();
        let quest = put_quest(&s, "q1", Some(T0.plus_secs(3600)));

        let report = s.crank.run_once(T0.plus_secs(3601)).await.unwrap();
        assert_eq!(report.expired_quests, 1);
        assert_eq!(
            s.store.get_quest(&quest).unwrap().status,
            sidequest_types::QuestStatus::Expired
        );
    }

    #[tokio::test]
    async fn claimed_quest_past_deadline_is_left_alone() {
        let s = setup();
        let quest = put_quest(&s, "q1", Some(T0.plus_secs(3600)));
        claim_quest(&s, &quest);

        // The claim occupies the slot, so the quest is not stale; the claim
        // itself is not yet past its proof deadline.
        let report = s.crank.run_once(T0.plus_secs(3601)).await.unwrap();
        assert_eq!(report.expired_quests, 0);
    }

    // ── Per-item isolation ─────────────────────────────────────────────

    #[tokio::test]
    async fn one_broken_item_does_not_abort_the_sweep() {
        let s = setup();

        // A healthy overdue claim.
        let quest = put_quest(&s, "q1", None);
        let good = claim_quest(&s, &quest);

        // A claim pointing at a quest that no longer exists.
        let orphan = sidequest_store::claim::ClaimRecord {
            id: sidequest_types::ClaimId::new("orphan"),
            quest: QuestId::new("ghost"),
            claimer: UserId::new("alice"),
            claimer_wallet: wallet(2),
            status: ClaimStatus::Active,
            stake_amount: TokenAmount::new(5),
            proof_deadline: T0.plus_secs(10),
            review_deadline: None,
            claim_address: wallet(250),
            created_at: T0,
        };
        s.store.put_claim(&orphan).unwrap();

        let report = s.crank.run_once(T0.plus_secs(24 * 3600 + 1)).await.unwrap();

        assert_eq!(report.expired_claims, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item, "orphan");
        assert_eq!(
            s.store.get_claim(&good.id).unwrap().status,
            ClaimStatus::Expired
        );
    }
}
