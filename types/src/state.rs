//! Status enums for quests, claims, proofs, and verification jobs.
//!
//! Every status change in the system goes through these transition tables.
//! The tables are exhaustive matches so adding a variant forces every
//! mutation site to be reconsidered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a quest is open to anyone or targets a specific wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    /// Targeted at one wallet; only that wallet may claim.
    Direct,
    /// Open to any eligible claimer.
    Open,
}

/// Lifecycle state of a quest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    /// Accepting claims.
    Active,
    /// All claimer slots are filled.
    Claimed,
    /// A claim was approved; escrow released.
    Completed,
    /// A claim was rejected; escrow refunded.
    Failed,
    /// Cancelled by the creator before any claim.
    Cancelled,
    /// Deadline passed with no claimers.
    Expired,
}

impl QuestStatus {
    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired
        )
    }

    /// The quest transition table.
    ///
    /// `Claimed → Active` is the slot-release path (abandon / proof-deadline
    /// expiry reopening a full quest).
    pub fn can_transition(&self, to: QuestStatus) -> bool {
        use QuestStatus::*;
        match (self, to) {
            (Active, Claimed) => true,
            (Active, Completed) | (Active, Failed) => true,
            (Active, Cancelled) | (Active, Expired) => true,
            (Claimed, Active) => true,
            (Claimed, Completed) | (Claimed, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Claimed => "claimed",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Claimed, proof not yet submitted.
    Active,
    /// Proof submitted, awaiting a verdict.
    Submitted,
    /// Verdict: completed. Terminal.
    Approved,
    /// Verdict: not completed. Terminal.
    Rejected,
    /// Walked away before submitting. Terminal.
    Abandoned,
    /// Proof deadline passed without a submission. Terminal.
    Expired,
}

impl ClaimStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::Abandoned | Self::Expired
        )
    }

    /// The claim transition table — strictly acyclic.
    pub fn can_transition(&self, to: ClaimStatus) -> bool {
        use ClaimStatus::*;
        match (self, to) {
            (Active, Submitted) | (Active, Abandoned) | (Active, Expired) => true,
            (Submitted, Approved) | (Submitted, Rejected) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Abandoned => "abandoned",
            Self::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// The raw verdict returned by the multimodal analysis collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiDecision {
    Approve,
    Reject,
    Uncertain,
}

/// The final decision recorded on a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofDecision {
    Approved,
    Rejected,
}

/// Who made the final decision on a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecidedBy {
    /// The AI pipeline decided at a confidence boundary.
    Ai,
    /// The quest creator decided during the review window.
    Creator,
    /// The review window lapsed and the crank auto-approved.
    Timeout,
}

/// Progress of a verification job through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Transcribing,
    Analyzing,
    Deciding,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// The job transition table.
    ///
    /// A retry restarts a non-terminal job at `Transcribing`, so every
    /// in-flight stage may transition back to it.
    pub fn can_transition(&self, to: JobStatus) -> bool {
        use JobStatus::*;
        match (self, to) {
            (Pending, Transcribing) => true,
            (Transcribing, Analyzing) => true,
            (Analyzing, Deciding) => true,
            (Deciding, Complete) => true,
            (Transcribing | Analyzing | Deciding, Transcribing) => true,
            (Pending | Transcribing | Analyzing | Deciding, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Transcribing => "transcribing",
            Self::Analyzing => "analyzing",
            Self::Deciding => "deciding",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
