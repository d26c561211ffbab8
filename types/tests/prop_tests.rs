//! Property tests for amount arithmetic and the status transition tables.

use proptest::prelude::*;
use sidequest_types::{ClaimStatus, QuestStatus, TokenAmount};

proptest! {
    /// The stake floor is always at least 5% of the reward and never more
    /// than one raw unit above it.
    #[test]
    fn stake_floor_brackets_five_percent(reward in 0u64..=u64::MAX / 10_000) {
        let floor = TokenAmount::new(reward).bps_ceil(500).raw();
        let exact_times_10k = reward as u128 * 500;
        prop_assert!(floor as u128 * 10_000 >= exact_times_10k);
        prop_assert!((floor as u128).saturating_sub(1) * 10_000 < exact_times_10k || floor == 0);
    }

    /// bps_ceil is monotone in the reward.
    #[test]
    fn stake_floor_is_monotone(a in 0u64..1_000_000_000, b in 0u64..1_000_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            TokenAmount::new(lo).bps_ceil(500) <= TokenAmount::new(hi).bps_ceil(500)
        );
    }
}

#[test]
fn no_transition_escapes_a_terminal_claim() {
    let all = [
        ClaimStatus::Active,
        ClaimStatus::Submitted,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
        ClaimStatus::Abandoned,
        ClaimStatus::Expired,
    ];
    for from in all.iter().filter(|s| s.is_terminal()) {
        for to in all {
            assert!(!from.can_transition(to), "{from:?} -> {to:?} must be denied");
        }
    }
}

#[test]
fn every_non_terminal_quest_status_has_an_exit() {
    let all = [
        QuestStatus::Active,
        QuestStatus::Claimed,
        QuestStatus::Completed,
        QuestStatus::Failed,
        QuestStatus::Cancelled,
        QuestStatus::Expired,
    ];
    for from in all.iter().filter(|s| !s.is_terminal()) {
        assert!(
            all.iter().any(|to| from.can_transition(*to)),
            "{from:?} is stuck"
        );
    }
}
