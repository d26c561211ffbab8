//! Thread-safe in-memory storage backend.
//!
//! Backs the node in dev mode and every test in the workspace. Each entity
//! map sits behind its own mutex; operations that must be atomic (slot
//! reservation, status compare-and-set, counter updates) hold the relevant
//! lock across the whole check-and-write.

use sidequest_store::claim::{ClaimRecord, ClaimStore};
use sidequest_store::job::{JobStore, VerificationJobRecord};
use sidequest_store::proof::{ProofRecord, ProofStore};
use sidequest_store::quest::{QuestFilter, QuestRecord, QuestStore};
use sidequest_store::user::{UserRecord, UserStore};
use sidequest_store::StoreError;
use sidequest_types::{
    AiDecision, ClaimId, ClaimStatus, DecidedBy, JobId, JobStatus, ProofDecision, ProofId,
    QuestId, QuestStatus, Timestamp, TxSignature, UserId,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory store implementing every storage trait.
pub struct MemoryStore {
    quests: Mutex<HashMap<QuestId, QuestRecord>>,
    sequence: Mutex<u64>,
    claims: Mutex<HashMap<ClaimId, ClaimRecord>>,
    proofs: Mutex<HashMap<ProofId, ProofRecord>>,
    jobs: Mutex<HashMap<JobId, VerificationJobRecord>>,
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            quests: Mutex::new(HashMap::new()),
            sequence: Mutex::new(0),
            claims: Mutex::new(HashMap::new()),
            proofs: Mutex::new(HashMap::new()),
            jobs: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestStore for MemoryStore {
    fn put_quest(&self, quest: &QuestRecord) -> Result<(), StoreError> {
        self.quests
            .lock()
            .unwrap()
            .insert(quest.id.clone(), quest.clone());
        Ok(())
    }

    fn get_quest(&self, id: &QuestId) -> Result<QuestRecord, StoreError> {
        self.quests
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_quests(&self, filter: &QuestFilter) -> Result<Vec<QuestRecord>, StoreError> {
        let quests = self.quests.lock().unwrap();
        let mut matched: Vec<QuestRecord> = quests
            .values()
            .filter(|q| filter.status.is_none_or(|s| q.status == s))
            .filter(|q| filter.quest_type.is_none_or(|t| q.quest_type == t))
            .filter(|q| filter.creator.as_ref().is_none_or(|c| &q.creator == c))
            .cloned()
            .collect();
        // Newest first; id as a tie-breaker for a stable order.
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let limit = if filter.limit == 0 {
            matched.len()
        } else {
            filter.limit
        };
        Ok(matched.into_iter().skip(filter.offset).take(limit).collect())
    }

    fn set_quest_status(
        &self,
        id: &QuestId,
        from: QuestStatus,
        to: QuestStatus,
    ) -> Result<QuestRecord, StoreError> {
        let mut quests = self.quests.lock().unwrap();
        let quest = quests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if quest.status != from {
            return Err(StoreError::StatusConflict {
                entity: format!("quest {id}"),
                expected: from.to_string(),
                actual: quest.status.to_string(),
            });
        }
        if !from.can_transition(to) {
            return Err(StoreError::Backend(format!(
                "quest transition {from} -> {to} not allowed"
            )));
        }
        quest.status = to;
        Ok(quest.clone())
    }

    fn try_reserve_slot(&self, id: &QuestId) -> Result<QuestRecord, StoreError> {
        let mut quests = self.quests.lock().unwrap();
        let quest = quests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if quest.status != QuestStatus::Active {
            return Err(StoreError::StatusConflict {
                entity: format!("quest {id}"),
                expected: QuestStatus::Active.to_string(),
                actual: quest.status.to_string(),
            });
        }
        if quest.current_claimers >= quest.max_claimers {
            return Err(StoreError::SlotsExhausted(id.to_string()));
        }
        quest.current_claimers += 1;
        if quest.current_claimers >= quest.max_claimers {
            quest.status = QuestStatus::Claimed;
        }
        Ok(quest.clone())
    }

    fn release_slot(&self, id: &QuestId) -> Result<QuestRecord, StoreError> {
        let mut quests = self.quests.lock().unwrap();
        let quest = quests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        quest.current_claimers = quest.current_claimers.saturating_sub(1);
        if quest.status == QuestStatus::Claimed {
            quest.status = QuestStatus::Active;
        }
        Ok(quest.clone())
    }

    fn stale_quests(&self, now: Timestamp) -> Result<Vec<QuestRecord>, StoreError> {
        Ok(self
            .quests
            .lock()
            .unwrap()
            .values()
            .filter(|q| q.status == QuestStatus::Active)
            .filter(|q| q.deadline.is_some_and(|d| d.is_past(now)))
            .filter(|q| q.current_claimers == 0)
            .cloned()
            .collect())
    }

    fn next_sequence(&self) -> Result<u64, StoreError> {
        let mut seq = self.sequence.lock().unwrap();
        let value = *seq;
        *seq += 1;
        Ok(value)
    }
}

impl ClaimStore for MemoryStore {
    fn put_claim(&self, claim: &ClaimRecord) -> Result<(), StoreError> {
        self.claims
            .lock()
            .unwrap()
            .insert(claim.id.clone(), claim.clone());
        Ok(())
    }

    fn get_claim(&self, id: &ClaimId) -> Result<ClaimRecord, StoreError> {
        self.claims
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn set_claim_status(
        &self,
        id: &ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
    ) -> Result<ClaimRecord, StoreError> {
        let mut claims = self.claims.lock().unwrap();
        let claim = claims
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if claim.status != from {
            return Err(StoreError::StatusConflict {
                entity: format!("claim {id}"),
                expected: from.to_string(),
                actual: claim.status.to_string(),
            });
        }
        if !from.can_transition(to) {
            return Err(StoreError::Backend(format!(
                "claim transition {from} -> {to} not allowed"
            )));
        }
        claim.status = to;
        Ok(claim.clone())
    }

    fn mark_submitted(
        &self,
        id: &ClaimId,
        review_deadline: Timestamp,
    ) -> Result<ClaimRecord, StoreError> {
        let mut claims = self.claims.lock().unwrap();
        let claim = claims
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if claim.status != ClaimStatus::Active {
            return Err(StoreError::StatusConflict {
                entity: format!("claim {id}"),
                expected: ClaimStatus::Active.to_string(),
                actual: claim.status.to_string(),
            });
        }
        claim.status = ClaimStatus::Submitted;
        claim.review_deadline = Some(review_deadline);
        Ok(claim.clone())
    }

    fn open_claim_for(
        &self,
        quest: &QuestId,
        claimer: &UserId,
    ) -> Result<Option<ClaimRecord>, StoreError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .values()
            .find(|c| &c.quest == quest && &c.claimer == claimer && !c.status.is_terminal())
            .cloned())
    }

    fn count_claims_by_status(
        &self,
        claimer: &UserId,
        status: ClaimStatus,
    ) -> Result<u32, StoreError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .values()
            .filter(|c| &c.claimer == claimer && c.status == status)
            .count() as u32)
    }

    fn count_recent_forfeits(
        &self,
        claimer: &UserId,
        since: Timestamp,
    ) -> Result<u32, StoreError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .values()
            .filter(|c| &c.claimer == claimer)
            .filter(|c| matches!(c.status, ClaimStatus::Expired | ClaimStatus::Abandoned))
            .filter(|c| c.created_at > since)
            .count() as u32)
    }

    fn claims_past_proof_deadline(&self, now: Timestamp) -> Result<Vec<ClaimRecord>, StoreError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == ClaimStatus::Active && c.proof_deadline.is_past(now))
            .cloned()
            .collect())
    }

    fn claims_past_review_deadline(
        &self,
        now: Timestamp,
    ) -> Result<Vec<ClaimRecord>, StoreError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == ClaimStatus::Submitted)
            .filter(|c| c.review_deadline.is_some_and(|d| d.is_past(now)))
            .cloned()
            .collect())
    }
}

impl ProofStore for MemoryStore {
    fn put_proof(&self, proof: &ProofRecord) -> Result<(), StoreError> {
        let mut proofs = self.proofs.lock().unwrap();
        if proofs.values().any(|p| p.claim == proof.claim) {
            return Err(StoreError::Duplicate(format!(
                "proof for claim {}",
                proof.claim
            )));
        }
        proofs.insert(proof.id.clone(), proof.clone());
        Ok(())
    }

    fn get_proof(&self, id: &ProofId) -> Result<ProofRecord, StoreError> {
        self.proofs
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_proof_by_claim(&self, claim: &ClaimId) -> Result<ProofRecord, StoreError> {
        self.proofs
            .lock()
            .unwrap()
            .values()
            .find(|p| &p.claim == claim)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proof for claim {claim}")))
    }

    fn set_transcript(&self, id: &ProofId, transcript: &str) -> Result<(), StoreError> {
        self.with_proof(id, |p| p.transcript = Some(transcript.to_string()))
    }

    fn record_analysis(
        &self,
        id: &ProofId,
        confidence: u8,
        decision: AiDecision,
        reasoning: &str,
        detected_actions: &[String],
        safety_flags: &[String],
    ) -> Result<(), StoreError> {
        self.with_proof(id, |p| {
            p.ai_confidence = Some(confidence);
            p.ai_decision = Some(decision);
            p.ai_reasoning = Some(reasoning.to_string());
            p.detected_actions = detected_actions.to_vec();
            p.safety_flags = safety_flags.to_vec();
        })
    }

    fn record_decision(
        &self,
        id: &ProofId,
        decision: ProofDecision,
        decided_by: DecidedBy,
    ) -> Result<(), StoreError> {
        self.with_proof(id, |p| {
            p.final_decision = Some(decision);
            p.decided_by = Some(decided_by);
        })
    }

    fn set_settlement_tx(&self, id: &ProofId, tx: &TxSignature) -> Result<(), StoreError> {
        self.with_proof(id, |p| p.settlement_tx = Some(tx.clone()))
    }
}

impl MemoryStore {
    fn with_proof(
        &self,
        id: &ProofId,
        f: impl FnOnce(&mut ProofRecord),
    ) -> Result<(), StoreError> {
        let mut proofs = self.proofs.lock().unwrap();
        let proof = proofs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(proof);
        Ok(())
    }
}

impl JobStore for MemoryStore {
    fn put_job(&self, job: &VerificationJobRecord) -> Result<(), StoreError> {
        self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
        Ok(())
    }

    fn get_job(&self, id: &JobId) -> Result<VerificationJobRecord, StoreError> {
        self.jobs
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_job_by_proof(&self, proof: &ProofId) -> Result<VerificationJobRecord, StoreError> {
        self.jobs
            .lock()
            .unwrap()
            .values()
            .find(|j| &j.proof == proof)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("job for proof {proof}")))
    }

    fn set_job_status(
        &self,
        id: &JobId,
        to: JobStatus,
        now: Timestamp,
    ) -> Result<VerificationJobRecord, StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !job.status.can_transition(to) {
            return Err(StoreError::Backend(format!(
                "job transition {} -> {to} not allowed",
                job.status
            )));
        }
        job.status = to;
        if to == JobStatus::Transcribing && job.started_at.is_none() {
            job.started_at = Some(now);
        }
        if to.is_terminal() {
            job.completed_at = Some(now);
        }
        Ok(job.clone())
    }

    fn increment_attempt(&self, id: &JobId) -> Result<u32, StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        job.attempt += 1;
        Ok(job.attempt)
    }

    fn set_job_error(&self, id: &JobId, error: &str) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        job.error = Some(error.to_string());
        Ok(())
    }
}

impl UserStore for MemoryStore {
    fn put_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        self.users
            .lock()
            .unwrap()
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, id: &UserId) -> Result<UserRecord, StoreError> {
        self.users
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn incr_quests_posted(&self, id: &UserId) -> Result<(), StoreError> {
        self.with_user(id, |u| u.quests_posted += 1)
    }

    fn incr_quests_completed(&self, id: &UserId) -> Result<(), StoreError> {
        self.with_user(id, |u| u.quests_completed += 1)
    }

    fn incr_active_claims(&self, id: &UserId) -> Result<(), StoreError> {
        self.with_user(id, |u| u.active_claims += 1)
    }

    fn decr_active_claims(&self, id: &UserId) -> Result<(), StoreError> {
        self.with_user(id, |u| u.active_claims = u.active_claims.saturating_sub(1))
    }

    fn incr_flags(&self, id: &UserId) -> Result<(), StoreError> {
        self.with_user(id, |u| u.flags += 1)
    }
}

impl MemoryStore {
    fn with_user(&self, id: &UserId, f: impl FnOnce(&mut UserRecord)) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        f(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidequest_types::{Address, AssetId, ContentHash, QuestType, TokenAmount};
    use std::sync::Arc;

    fn quest(id: &str, max_claimers: u32) -> QuestRecord {
        QuestRecord {
            id: QuestId::new(id),
            sequence: 0,
            creator: UserId::new("creator"),
            creator_wallet: Address::new("sq_creator"),
            description: "test quest".into(),
            description_hash: ContentHash::ZERO,
            quest_type: QuestType::Open,
            status: QuestStatus::Active,
            reward_amount: TokenAmount::new(100),
            reward_asset: AssetId::new("mint"),
            target_wallet: None,
            max_claimers,
            current_claimers: 0,
            deadline: None,
            quest_address: Address::new("sq_quest"),
            escrow_address: Address::new("sq_escrow"),
            created_at: Timestamp::new(1000),
        }
    }

    fn claim(id: &str, quest: &str, claimer: &str, status: ClaimStatus) -> ClaimRecord {
        ClaimRecord {
            id: ClaimId::new(id),
            quest: QuestId::new(quest),
            claimer: UserId::new(claimer),
            claimer_wallet: Address::new("sq_claimer"),
            status,
            stake_amount: TokenAmount::new(5),
            proof_deadline: Timestamp::new(2000),
            review_deadline: None,
            claim_address: Address::new("sq_claim"),
            created_at: Timestamp::new(1000),
        }
    }

    #[test]
    fn reserve_slot_flips_to_claimed_when_full() {
        let store = MemoryStore::new();
        store.put_quest(&quest("q1", 2)).unwrap();

        let after = store.try_reserve_slot(&QuestId::new("q1")).unwrap();
        assert_eq!(after.current_claimers, 1);
        assert_eq!(after.status, QuestStatus::Active);

        let after = store.try_reserve_slot(&QuestId::new("q1")).unwrap();
        assert_eq!(after.current_claimers, 2);
        assert_eq!(after.status, QuestStatus::Claimed);

        let err = store.try_reserve_slot(&QuestId::new("q1")).unwrap_err();
        assert!(matches!(err, StoreError::StatusConflict { .. }));
    }

    #[test]
    fn reserve_slot_rejects_when_exhausted_but_active() {
        // A quest can sit at the cap while still Active only transiently, but
        // the exhaustion guard must hold regardless of the status flip.
        let store = MemoryStore::new();
        let mut q = quest("q1", 1);
        q.current_claimers = 1;
        store.put_quest(&q).unwrap();
        let err = store.try_reserve_slot(&QuestId::new("q1")).unwrap_err();
        assert!(matches!(err, StoreError::SlotsExhausted(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_reservations_never_exceed_capacity() {
        let store = Arc::new(MemoryStore::new());
        store.put_quest(&quest("q1", 3)).unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.try_reserve_slot(&QuestId::new("q1")).is_ok()
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }

        assert_eq!(wins, 3);
        let q = store.get_quest(&QuestId::new("q1")).unwrap();
        assert_eq!(q.current_claimers, 3);
        assert_eq!(q.status, QuestStatus::Claimed);
    }

    #[test]
    fn release_slot_reopens_claimed_quest() {
        let store = MemoryStore::new();
        store.put_quest(&quest("q1", 1)).unwrap();
        store.try_reserve_slot(&QuestId::new("q1")).unwrap();

        let after = store.release_slot(&QuestId::new("q1")).unwrap();
        assert_eq!(after.current_claimers, 0);
        assert_eq!(after.status, QuestStatus::Active);
    }

    #[test]
    fn release_slot_never_goes_negative() {
        let store = MemoryStore::new();
        store.put_quest(&quest("q1", 1)).unwrap();
        let after = store.release_slot(&QuestId::new("q1")).unwrap();
        assert_eq!(after.current_claimers, 0);
    }

    #[test]
    fn cas_rejects_wrong_expected_status() {
        let store = MemoryStore::new();
        store.put_quest(&quest("q1", 1)).unwrap();
        let err = store
            .set_quest_status(&QuestId::new("q1"), QuestStatus::Claimed, QuestStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StoreError::StatusConflict { .. }));
    }

    #[test]
    fn cas_rejects_illegal_transition() {
        let store = MemoryStore::new();
        store.put_quest(&quest("q1", 1)).unwrap();
        let err = store
            .set_quest_status(&QuestId::new("q1"), QuestStatus::Active, QuestStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn listing_is_newest_first_with_offset() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut q = quest(&format!("q{i}"), 1);
            q.created_at = Timestamp::new(1000 + i);
            store.put_quest(&q).unwrap();
        }

        let page = store
            .list_quests(&QuestFilter {
                limit: 2,
                offset: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id.as_str(), "q3");
        assert_eq!(page[1].id.as_str(), "q2");
    }

    #[test]
    fn second_proof_for_same_claim_is_rejected() {
        let store = MemoryStore::new();
        let p = ProofRecord {
            id: ProofId::new("p1"),
            claim: ClaimId::new("c1"),
            video_url: "https://cdn/videos/u/f".into(),
            video_hash: "abc".into(),
            duration_secs: 30,
            transcript: None,
            ai_confidence: None,
            ai_decision: None,
            ai_reasoning: None,
            detected_actions: Vec::new(),
            safety_flags: Vec::new(),
            final_decision: None,
            decided_by: None,
            settlement_tx: None,
            created_at: Timestamp::new(1000),
        };
        store.put_proof(&p).unwrap();

        let mut p2 = p.clone();
        p2.id = ProofId::new("p2");
        assert!(matches!(
            store.put_proof(&p2).unwrap_err(),
            StoreError::Duplicate(_)
        ));
    }

    #[test]
    fn forfeit_count_respects_window_and_status() {
        let store = MemoryStore::new();
        let claimer = UserId::new("alice");

        let mut old = claim("c1", "q1", "alice", ClaimStatus::Expired);
        old.created_at = Timestamp::new(100);
        store.put_claim(&old).unwrap();

        let mut recent = claim("c2", "q2", "alice", ClaimStatus::Abandoned);
        recent.created_at = Timestamp::new(900);
        store.put_claim(&recent).unwrap();

        let mut approved = claim("c3", "q3", "alice", ClaimStatus::Approved);
        approved.created_at = Timestamp::new(950);
        store.put_claim(&approved).unwrap();

        assert_eq!(
            store
                .count_recent_forfeits(&claimer, Timestamp::new(500))
                .unwrap(),
            1
        );
    }

    #[test]
    fn deadline_selectors_filter_by_status() {
        let store = MemoryStore::new();
        let now = Timestamp::new(3000);

        store.put_claim(&claim("c1", "q1", "a", ClaimStatus::Active)).unwrap();
        let mut submitted = claim("c2", "q2", "b", ClaimStatus::Submitted);
        submitted.review_deadline = Some(Timestamp::new(2500));
        store.put_claim(&submitted).unwrap();
        let mut resolved = claim("c3", "q3", "c", ClaimStatus::Approved);
        resolved.review_deadline = Some(Timestamp::new(2500));
        store.put_claim(&resolved).unwrap();

        let due = store.claims_past_proof_deadline(now).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id.as_str(), "c1");

        let reviews = store.claims_past_review_deadline(now).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id.as_str(), "c2");
    }

    #[test]
    fn job_stamps_start_and_completion() {
        let store = MemoryStore::new();
        store
            .put_job(&VerificationJobRecord {
                id: JobId::new("j1"),
                proof: ProofId::new("p1"),
                status: JobStatus::Pending,
                attempt: 1,
                error: None,
                started_at: None,
                completed_at: None,
                created_at: Timestamp::new(1000),
            })
            .unwrap();

        let id = JobId::new("j1");
        let job = store
            .set_job_status(&id, JobStatus::Transcribing, Timestamp::new(1001))
            .unwrap();
        assert_eq!(job.started_at, Some(Timestamp::new(1001)));

        store
            .set_job_status(&id, JobStatus::Analyzing, Timestamp::new(1002))
            .unwrap();
        store
            .set_job_status(&id, JobStatus::Deciding, Timestamp::new(1003))
            .unwrap();
        let job = store
            .set_job_status(&id, JobStatus::Complete, Timestamp::new(1004))
            .unwrap();
        assert_eq!(job.started_at, Some(Timestamp::new(1001)));
        assert_eq!(job.completed_at, Some(Timestamp::new(1004)));
    }

    #[test]
    fn job_cannot_leave_terminal_status() {
        let store = MemoryStore::new();
        store
            .put_job(&VerificationJobRecord {
                id: JobId::new("j1"),
                proof: ProofId::new("p1"),
                status: JobStatus::Failed,
                attempt: 3,
                error: Some("boom".into()),
                started_at: None,
                completed_at: Some(Timestamp::new(1)),
                created_at: Timestamp::new(0),
            })
            .unwrap();

        assert!(store
            .set_job_status(&JobId::new("j1"), JobStatus::Transcribing, Timestamp::new(2))
            .is_err());
    }

    #[test]
    fn user_counters_saturate_at_zero() {
        let store = MemoryStore::new();
        let id = UserId::new("u1");
        store
            .put_user(&UserRecord::new(
                id.clone(),
                Address::new("sq_u1"),
                Timestamp::new(0),
            ))
            .unwrap();

        store.decr_active_claims(&id).unwrap();
        assert_eq!(store.get_user(&id).unwrap().active_claims, 0);

        store.incr_active_claims(&id).unwrap();
        store.incr_flags(&id).unwrap();
        let u = store.get_user(&id).unwrap();
        assert_eq!(u.active_claims, 1);
        assert_eq!(u.flags, 1);
    }

    #[test]
    fn sequence_is_monotonic() {
        let store = MemoryStore::new();
        assert_eq!(store.next_sequence().unwrap(), 0);
        assert_eq!(store.next_sequence().unwrap(), 1);
        assert_eq!(store.next_sequence().unwrap(), 2);
    }
}
