//! User ledger projection storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use sidequest_types::{Address, Timestamp, UserId};

/// The slice of a user the lifecycle engine maintains: wallet identity plus
/// outcome counters. Profile data lives with the authentication collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub wallet: Address,
    pub quests_completed: u32,
    pub quests_posted: u32,
    pub active_claims: u32,
    /// Abuse flags from safety-flagged rejections. Accounts are suspended at
    /// three flags by the authentication collaborator.
    pub flags: u32,
    pub created_at: Timestamp,
}

impl UserRecord {
    /// A fresh record with zeroed counters.
    pub fn new(id: UserId, wallet: Address, now: Timestamp) -> Self {
        Self {
            id,
            wallet,
            quests_completed: 0,
            quests_posted: 0,
            active_claims: 0,
            flags: 0,
            created_at: now,
        }
    }
}

/// Trait for user storage operations. Counter updates are atomic in the
/// backend; decrements saturate at zero.
pub trait UserStore {
    fn put_user(&self, user: &UserRecord) -> Result<(), StoreError>;

    fn get_user(&self, id: &UserId) -> Result<UserRecord, StoreError>;

    fn incr_quests_posted(&self, id: &UserId) -> Result<(), StoreError>;

    fn incr_quests_completed(&self, id: &UserId) -> Result<(), StoreError>;

    fn incr_active_claims(&self, id: &UserId) -> Result<(), StoreError>;

    fn decr_active_claims(&self, id: &UserId) -> Result<(), StoreError>;

    fn incr_flags(&self, id: &UserId) -> Result<(), StoreError>;
}
