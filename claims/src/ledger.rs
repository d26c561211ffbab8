//! The claim ledger engine.

use crate::error::ClaimError;
use crate::sink::ProofSink;
use sidequest_settlement::{pda, SettlementGateway};
use sidequest_store::claim::ClaimRecord;
use sidequest_store::job::VerificationJobRecord;
use sidequest_store::proof::ProofRecord;
use sidequest_store::quest::QuestRecord;
use sidequest_store::{Store, StoreError};
use sidequest_types::{
    Address, ClaimId, ClaimStatus, DecidedBy, JobId, JobStatus, ProofDecision, ProofId,
    ProtocolParams, QuestId, QuestStatus, Timestamp, TokenAmount, UserId,
};
use std::sync::Arc;

/// Evidence accompanying a proof submission.
#[derive(Clone, Debug)]
pub struct ProofEvidence {
    pub video_url: String,
    pub video_hash: String,
    pub duration_secs: u32,
}

/// Owns the claim lifecycle.
pub struct ClaimLedger {
    store: Arc<dyn Store>,
    gateway: Arc<SettlementGateway>,
    params: ProtocolParams,
    program: Address,
}

impl ClaimLedger {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<SettlementGateway>,
        params: ProtocolParams,
        program: Address,
    ) -> Self {
        Self {
            store,
            gateway,
            params,
            program,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Check every eligibility rule against current state, in order: quest
    /// exists and is active, deadline not passed, quest not full, claimer is
    /// not the creator, active-claim cap, forfeit throttle, stake floor,
    /// direct targeting, no open claim on this quest already.
    ///
    /// Each call re-reads state; nothing is cached across calls.
    pub fn validate_claim(
        &self,
        quest_id: &QuestId,
        claimer: &UserId,
        stake: TokenAmount,
        now: Timestamp,
    ) -> Result<QuestRecord, ClaimError> {
        let quest = self
            .store
            .get_quest(quest_id)
            .map_err(|_| ClaimError::QuestNotFound(quest_id.clone()))?;

        if quest.status != QuestStatus::Active {
            return Err(ClaimError::QuestNotActive);
        }
        if quest.deadline.is_some_and(|d| d.is_past(now)) {
            return Err(ClaimError::QuestDeadlinePassed);
        }
        if quest.current_claimers >= quest.max_claimers {
            return Err(ClaimError::QuestFull);
        }
        if &quest.creator == claimer {
            return Err(ClaimError::OwnQuest);
        }

        let active = self
            .store
            .count_claims_by_status(claimer, ClaimStatus::Active)?;
        if active >= self.params.max_active_claims {
            return Err(ClaimError::TooManyActiveClaims {
                limit: self.params.max_active_claims,
            });
        }

        let window_start =
            Timestamp::new(now.as_secs().saturating_sub(self.params.forfeit_window_secs));
        let forfeits = self.store.count_recent_forfeits(claimer, window_start)?;
        if forfeits >= self.params.max_recent_forfeits {
            return Err(ClaimError::RecentForfeits { count: forfeits });
        }

        let minimum = self.params.min_stake(quest.reward_amount);
        if stake < minimum {
            return Err(ClaimError::StakeTooLow {
                minimum,
                provided: stake,
            });
        }

        if quest.quest_type == sidequest_types::QuestType::Direct {
            let claimer_wallet = self.store.get_user(claimer)?.wallet;
            if quest.target_wallet.as_ref() != Some(&claimer_wallet) {
                return Err(ClaimError::NotTargeted);
            }
        }

        if self.store.open_claim_for(quest_id, claimer)?.is_some() {
            return Err(ClaimError::AlreadyClaimed);
        }

        Ok(quest)
    }

    /// Validate, atomically reserve a quest slot, and persist the claim.
    ///
    /// The slot reservation is a single compare-and-increment in the store:
    /// two claimers racing for the last slot cannot both win, and the loser
    /// surfaces as `QuestFull`.
    pub fn create_claim(
        &self,
        quest_id: &QuestId,
        claimer: &UserId,
        stake: TokenAmount,
        now: Timestamp,
    ) -> Result<ClaimRecord, ClaimError> {
        let quest = self.validate_claim(quest_id, claimer, stake, now)?;
        let claimer_wallet = self.store.get_user(claimer)?.wallet;

        let reserved = self.store.try_reserve_slot(quest_id).map_err(|err| match err {
            StoreError::SlotsExhausted(_) => ClaimError::QuestFull,
            StoreError::StatusConflict { .. } => ClaimError::QuestNotActive,
            other => ClaimError::Store(other),
        })?;

        let quest_address = pda::quest_address(&self.program, quest.sequence);
        let claim = ClaimRecord {
            id: ClaimId::new(sidequest_utils::generate_id("clm")),
            quest: quest_id.clone(),
            claimer: claimer.clone(),
            claimer_wallet: claimer_wallet.clone(),
            status: ClaimStatus::Active,
            stake_amount: stake,
            proof_deadline: now.plus_secs(self.params.proof_deadline_secs),
            review_deadline: None,
            claim_address: pda::claim_address(&self.program, &quest_address, &claimer_wallet),
            created_at: now,
        };

        self.store.put_claim(&claim)?;
        self.store.incr_active_claims(claimer)?;

        tracing::info!(
            claim = %claim.id,
            quest = %quest_id,
            claimers = reserved.current_claimers,
            "claim created"
        );
        Ok(claim)
    }

    /// Record a proof, move the claim to `Submitted`, open the review
    /// window, create the verification job, and enqueue it.
    pub fn submit_proof(
        &self,
        claim_id: &ClaimId,
        actor: &UserId,
        evidence: ProofEvidence,
        now: Timestamp,
        sink: &dyn ProofSink,
    ) -> Result<ProofRecord, ClaimError> {
        let claim = self
            .store
            .get_claim(claim_id)
            .map_err(|_| ClaimError::ClaimNotFound(claim_id.clone()))?;

        if &claim.claimer != actor {
            return Err(ClaimError::NotClaimOwner);
        }
        if claim.status != ClaimStatus::Active {
            return Err(ClaimError::ClaimNotActive);
        }
        if claim.proof_deadline.is_past(now) {
            return Err(ClaimError::ProofDeadlinePassed);
        }
        if evidence.video_url.is_empty() {
            return Err(ClaimError::MissingEvidence("video_url"));
        }
        if evidence.video_hash.is_empty() {
            return Err(ClaimError::MissingEvidence("video_hash"));
        }

        let proof = ProofRecord {
            id: ProofId::new(sidequest_utils::generate_id("prf")),
            claim: claim_id.clone(),
            video_url: evidence.video_url,
            video_hash: evidence.video_hash,
            duration_secs: evidence.duration_secs,
            transcript: None,
            ai_confidence: None,
            ai_decision: None,
            ai_reasoning: None,
            detected_actions: Vec::new(),
            safety_flags: Vec::new(),
            final_decision: None,
            decided_by: None,
            settlement_tx: None,
            created_at: now,
        };
        self.store.put_proof(&proof)?;

        self.store
            .mark_submitted(claim_id, now.plus_secs(self.params.review_deadline_secs))
            .map_err(|err| match err {
                StoreError::StatusConflict { .. } => ClaimError::ClaimNotActive,
                other => ClaimError::Store(other),
            })?;

        self.store.put_job(&VerificationJobRecord {
            id: JobId::new(sidequest_utils::generate_id("job")),
            proof: proof.id.clone(),
            status: JobStatus::Pending,
            attempt: 1,
            error: None,
            started_at: None,
            completed_at: None,
            created_at: now,
        })?;

        sink.enqueue(&proof.id).map_err(ClaimError::Queue)?;

        tracing::info!(claim = %claim_id, proof = %proof.id, "proof submitted");
        Ok(proof)
    }

    /// Walk away from an active claim. The on-chain stake forfeiture is the
    /// ledger program's business; locally the slot reopens.
    pub fn abandon_claim(&self, claim_id: &ClaimId, actor: &UserId) -> Result<(), ClaimError> {
        let claim = self
            .store
            .get_claim(claim_id)
            .map_err(|_| ClaimError::ClaimNotFound(claim_id.clone()))?;

        if &claim.claimer != actor {
            return Err(ClaimError::NotClaimOwner);
        }

        self.store
            .set_claim_status(claim_id, ClaimStatus::Active, ClaimStatus::Abandoned)
            .map_err(|err| match err {
                StoreError::StatusConflict { .. } => ClaimError::ClaimNotActive,
                other => ClaimError::Store(other),
            })?;

        self.store.release_slot(&claim.quest)?;
        self.store.decr_active_claims(actor)?;

        tracing::info!(claim = %claim_id, quest = %claim.quest, "claim abandoned");
        Ok(())
    }

    /// The quest creator's verdict on an escalated proof.
    pub async fn resolve_review(
        &self,
        claim_id: &ClaimId,
        actor: &UserId,
        approve: bool,
    ) -> Result<ClaimRecord, ClaimError> {
        let claim = self
            .store
            .get_claim(claim_id)
            .map_err(|_| ClaimError::ClaimNotFound(claim_id.clone()))?;
        if claim.status != ClaimStatus::Submitted {
            return Err(ClaimError::ClaimNotSubmitted);
        }

        let quest = self.store.get_quest(&claim.quest)?;
        if &quest.creator != actor {
            return Err(ClaimError::NotQuestCreator);
        }

        if approve {
            self.finalize_approval(claim_id, DecidedBy::Creator).await
        } else {
            // A creator rejection is never safety-flagged.
            self.finalize_rejection(claim_id, DecidedBy::Creator, false)
                .await
        }
    }

    /// Approve a submitted claim: record the proof decision, settle
    /// on-chain (best effort), complete the quest, and update the claimer's
    /// counters.
    ///
    /// The status compare-and-set runs first and admits exactly one winner,
    /// so the pipeline, the crank, and creator review can all race here
    /// safely. `DecidedBy::Timeout` settles through the permissionless
    /// `auto_approve` path; the others through `approve_completion`.
    ///
    /// A settlement failure is logged and leaves the transaction reference
    /// empty — the local outcome stands ("decision made, settlement
    /// pending").
    pub async fn finalize_approval(
        &self,
        claim_id: &ClaimId,
        decided_by: DecidedBy,
    ) -> Result<ClaimRecord, ClaimError> {
        let claim = self
            .store
            .set_claim_status(claim_id, ClaimStatus::Submitted, ClaimStatus::Approved)
            .map_err(|err| match err {
                StoreError::StatusConflict { .. } => ClaimError::ClaimNotSubmitted,
                StoreError::NotFound(_) => ClaimError::ClaimNotFound(claim_id.clone()),
                other => ClaimError::Store(other),
            })?;

        let quest = self.store.get_quest(&claim.quest)?;
        let proof = self.store.get_proof_by_claim(claim_id)?;
        self.store
            .record_decision(&proof.id, ProofDecision::Approved, decided_by)?;

        let settlement = match decided_by {
            DecidedBy::Timeout => {
                self.gateway
                    .auto_approve(&quest, &claim, &claim.claimer_wallet)
                    .await
            }
            DecidedBy::Ai | DecidedBy::Creator => {
                self.gateway
                    .approve_completion(&quest, &claim, &claim.claimer_wallet)
                    .await
            }
        };
        match settlement {
            Ok(tx) => self.store.set_settlement_tx(&proof.id, &tx)?,
            Err(err) => {
                tracing::warn!(claim = %claim_id, %err, "approval settlement pending");
            }
        }

        self.transition_quest(&claim.quest, QuestStatus::Completed)?;
        self.store.incr_quests_completed(&claim.claimer)?;
        self.store.decr_active_claims(&claim.claimer)?;

        tracing::info!(claim = %claim_id, ?decided_by, "claim approved");
        Ok(claim)
    }

    /// Reject a submitted claim. Mirrors [`finalize_approval`]; a
    /// safety-flagged rejection additionally raises the claimer's abuse
    /// flag count.
    pub async fn finalize_rejection(
        &self,
        claim_id: &ClaimId,
        decided_by: DecidedBy,
        safety_flagged: bool,
    ) -> Result<ClaimRecord, ClaimError> {
        let claim = self
            .store
            .set_claim_status(claim_id, ClaimStatus::Submitted, ClaimStatus::Rejected)
            .map_err(|err| match err {
                StoreError::StatusConflict { .. } => ClaimError::ClaimNotSubmitted,
                StoreError::NotFound(_) => ClaimError::ClaimNotFound(claim_id.clone()),
                other => ClaimError::Store(other),
            })?;

        let quest = self.store.get_quest(&claim.quest)?;
        let proof = self.store.get_proof_by_claim(claim_id)?;
        self.store
            .record_decision(&proof.id, ProofDecision::Rejected, decided_by)?;

        match self
            .gateway
            .reject_completion(&quest, &claim, &claim.claimer_wallet, safety_flagged)
            .await
        {
            Ok(tx) => self.store.set_settlement_tx(&proof.id, &tx)?,
            Err(err) => {
                tracing::warn!(claim = %claim_id, %err, "rejection settlement pending");
            }
        }

        self.transition_quest(&claim.quest, QuestStatus::Failed)?;
        self.store.decr_active_claims(&claim.claimer)?;
        if safety_flagged {
            self.store.incr_flags(&claim.claimer)?;
        }

        tracing::info!(claim = %claim_id, ?decided_by, safety_flagged, "claim rejected");
        Ok(claim)
    }

    /// Move a quest to `to` from whatever non-terminal status it holds,
    /// retrying the compare-and-set if a slot operation races in between.
    fn transition_quest(&self, quest_id: &QuestId, to: QuestStatus) -> Result<(), ClaimError> {
        for _ in 0..3 {
            let current = self.store.get_quest(quest_id)?.status;
            if current == to {
                return Ok(());
            }
            match self.store.set_quest_status(quest_id, current, to) {
                Ok(_) => return Ok(()),
                Err(StoreError::StatusConflict { .. }) => continue,
                Err(other) => return Err(ClaimError::Store(other)),
            }
        }
        Err(ClaimError::Store(StoreError::Backend(format!(
            "quest {quest_id} kept changing status"
        ))))
    }
}
