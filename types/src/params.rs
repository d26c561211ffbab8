//! Protocol parameters — every policy constant in one governable struct.

use crate::amount::TokenAmount;
use serde::{Deserialize, Serialize};

/// All lifecycle policy parameters.
///
/// Engines take these by reference so tests can tighten windows without
/// touching the clock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolParams {
    // ── Deadlines ────────────────────────────────────────────────────────
    /// Seconds a claimer has to submit proof after claiming. Default: 24h.
    pub proof_deadline_secs: u64,

    /// Seconds the creator has to review an escalated proof. Default: 24h.
    pub review_deadline_secs: u64,

    // ── Stake policy ─────────────────────────────────────────────────────
    /// Minimum stake as basis points of the reward (500 = 5%).
    /// The floor is `ceil(reward * min_stake_bps / 10_000)`.
    pub min_stake_bps: u32,

    // ── Anti-abuse ───────────────────────────────────────────────────────
    /// Maximum concurrently active claims per claimer.
    pub max_active_claims: u32,

    /// Trailing window for counting expired/abandoned claims. Default: 7 days.
    pub forfeit_window_secs: u64,

    /// Claimers with this many expired/abandoned claims inside the window
    /// are throttled.
    pub max_recent_forfeits: u32,

    // ── Quest creation ───────────────────────────────────────────────────
    /// Minimum reward (1_000_000 raw = 1 whole token).
    pub min_reward: TokenAmount,

    /// Upper bound on `max_claimers` per quest.
    pub max_claimers_limit: u32,

    // ── Verification thresholds ──────────────────────────────────────────
    /// Confidence at or above which an unflagged proof auto-approves.
    pub auto_approve_confidence: u8,

    /// Confidence at or below which a proof auto-rejects.
    pub auto_reject_confidence: u8,

    // ── Listing ──────────────────────────────────────────────────────────
    /// Default page size for quest listings.
    pub default_page_size: u32,

    /// Hard cap on page size for quest listings.
    pub max_page_size: u32,
}

impl ProtocolParams {
    /// The intended live configuration.
    pub fn sidequest_defaults() -> Self {
        Self {
            proof_deadline_secs: 24 * 3600,
            review_deadline_secs: 24 * 3600,
            min_stake_bps: 500, // 5%
            max_active_claims: 5,
            forfeit_window_secs: 7 * 24 * 3600,
            max_recent_forfeits: 2,
            min_reward: TokenAmount::new(1_000_000),
            max_claimers_limit: 100,
            auto_approve_confidence: 80,
            auto_reject_confidence: 20,
            default_page_size: 20,
            max_page_size: 50,
        }
    }

    /// The minimum stake a claimer must post for the given reward.
    pub fn min_stake(&self, reward: TokenAmount) -> TokenAmount {
        reward.bps_ceil(self.min_stake_bps)
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self::sidequest_defaults()
    }
}
