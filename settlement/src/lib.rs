//! Settlement gateway — the oracle side of the protocol.
//!
//! Turns local lifecycle decisions into ledger transactions: escrow release
//! on approval, refund on rejection, stake handling on expiry. Stateless; it
//! derives every account address from stable seeds, builds one instruction
//! per operation, signs with the service's settlement identity, and submits
//! for confirmation.
//!
//! The gateway does not guard against double submission. Callers (claim
//! ledger, crank) check local claim status before calling.

pub mod client;
pub mod error;
pub mod gateway;
pub mod instruction;
pub mod pda;
pub mod transaction;

pub use client::{HttpLedgerClient, LedgerClient, NullLedgerClient};
pub use error::SettlementError;
pub use gateway::SettlementGateway;
pub use instruction::{AccountMeta, Instruction};
pub use pda::{claim_address, config_address, escrow_address, quest_address};
pub use transaction::{sign_transaction, SignedTransaction, Transaction};
