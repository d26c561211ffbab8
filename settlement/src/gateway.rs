//! The four settlement operations.

use crate::client::LedgerClient;
use crate::error::SettlementError;
use crate::instruction::{
    approve_completion, auto_approve, expire_claim, reject_completion, ApproveAccounts,
    AutoApproveAccounts, ExpireAccounts, Instruction, RejectAccounts,
};
use crate::pda;
use crate::transaction::{sign_transaction, Transaction};
use sidequest_crypto::derive_address;
use sidequest_store::claim::ClaimRecord;
use sidequest_store::quest::QuestRecord;
use sidequest_types::{Address, KeyPair, TxSignature};
use std::sync::Arc;
use std::time::Duration;

/// Stateless façade over the ledger.
///
/// Each operation derives its accounts from stable seeds, signs with the
/// settlement identity, and submits under a hard timeout. The claimer's
/// wallet is always an explicit input, sourced by the caller from its own
/// records — the gateway never looks identities up.
pub struct SettlementGateway {
    client: Arc<dyn LedgerClient>,
    signer: KeyPair,
    program: Address,
    treasury: Address,
    timeout: Duration,
}

impl SettlementGateway {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        signer: KeyPair,
        program: Address,
        treasury: Address,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            signer,
            program,
            treasury,
            timeout,
        }
    }

    /// The settlement identity's wallet address (authority / cranker).
    pub fn authority(&self) -> Address {
        derive_address(&self.signer.public)
    }

    /// Release escrow to the claimer after an approved proof.
    pub async fn approve_completion(
        &self,
        quest: &QuestRecord,
        claim: &ClaimRecord,
        claimer_wallet: &Address,
    ) -> Result<TxSignature, SettlementError> {
        let quest_addr = pda::quest_address(&self.program, quest.sequence);
        let ix = approve_completion(
            self.program.clone(),
            ApproveAccounts {
                config: pda::config_address(&self.program),
                claim: pda::claim_address(&self.program, &quest_addr, claimer_wallet),
                escrow: pda::escrow_address(&self.program, &quest_addr),
                quest: quest_addr,
                claimer_account: claimer_wallet.clone(),
                treasury: self.treasury.clone(),
                authority: self.authority(),
            },
        );
        self.submit("approve_completion", &claim.id.to_string(), ix)
            .await
    }

    /// Refund escrow to the creator after a rejected proof. A safety-flagged
    /// rejection additionally forfeits the claimer's stake on-chain.
    pub async fn reject_completion(
        &self,
        quest: &QuestRecord,
        claim: &ClaimRecord,
        claimer_wallet: &Address,
        safety_flagged: bool,
    ) -> Result<TxSignature, SettlementError> {
        let quest_addr = pda::quest_address(&self.program, quest.sequence);
        let ix = reject_completion(
            self.program.clone(),
            RejectAccounts {
                config: pda::config_address(&self.program),
                claim: pda::claim_address(&self.program, &quest_addr, claimer_wallet),
                escrow: pda::escrow_address(&self.program, &quest_addr),
                quest: quest_addr,
                creator_account: quest.creator_wallet.clone(),
                claimer_account: claimer_wallet.clone(),
                authority: self.authority(),
            },
            safety_flagged,
        );
        self.submit("reject_completion", &claim.id.to_string(), ix)
            .await
    }

    /// Expire a claim whose proof deadline lapsed. Permissionless on-chain;
    /// the settlement identity acts as cranker.
    pub async fn expire_claim(
        &self,
        quest: &QuestRecord,
        claim: &ClaimRecord,
        claimer_wallet: &Address,
    ) -> Result<TxSignature, SettlementError> {
        let quest_addr = pda::quest_address(&self.program, quest.sequence);
        let ix = expire_claim(
            self.program.clone(),
            ExpireAccounts {
                claim: pda::claim_address(&self.program, &quest_addr, claimer_wallet),
                escrow: pda::escrow_address(&self.program, &quest_addr),
                quest: quest_addr,
                creator_account: quest.creator_wallet.clone(),
                cranker: self.authority(),
            },
        );
        self.submit("expire_claim", &claim.id.to_string(), ix).await
    }

    /// Approve a claim whose review window lapsed without a creator verdict.
    pub async fn auto_approve(
        &self,
        quest: &QuestRecord,
        claim: &ClaimRecord,
        claimer_wallet: &Address,
    ) -> Result<TxSignature, SettlementError> {
        let quest_addr = pda::quest_address(&self.program, quest.sequence);
        let ix = auto_approve(
            self.program.clone(),
            AutoApproveAccounts {
                config: pda::config_address(&self.program),
                claim: pda::claim_address(&self.program, &quest_addr, claimer_wallet),
                escrow: pda::escrow_address(&self.program, &quest_addr),
                quest: quest_addr,
                claimer_account: claimer_wallet.clone(),
                treasury: self.treasury.clone(),
                cranker: self.authority(),
            },
        );
        self.submit("auto_approve", &claim.id.to_string(), ix).await
    }

    async fn submit(
        &self,
        method: &str,
        claim_id: &str,
        instruction: Instruction,
    ) -> Result<TxSignature, SettlementError> {
        let tx = Transaction::new(instruction, self.authority());
        let signed = sign_transaction(tx, &self.signer)?;

        let result = tokio::time::timeout(self.timeout, self.client.submit(&signed))
            .await
            .map_err(|_| SettlementError::Timeout {
                method: method.to_string(),
                secs: self.timeout.as_secs(),
            })?;

        match &result {
            Ok(sig) => {
                tracing::info!(method, claim = claim_id, tx = %sig, "settlement confirmed");
            }
            Err(err) => {
                tracing::warn!(method, claim = claim_id, %err, "settlement failed");
            }
        }
        result
    }
}
