//! Ledger instruction construction.
//!
//! An instruction is an 8-byte method selector (SHA-256 of
//! `"global:<method>"`, truncated — the ledger program's dispatch rule),
//! optional argument bytes, and a typed account list with fixed signer and
//! writable roles per method.

use serde::{Deserialize, Serialize};
use sidequest_crypto::method_selector;
use sidequest_types::Address;

/// One account referenced by an instruction, with its access roles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub address: Address,
    pub signer: bool,
    pub writable: bool,
}

impl AccountMeta {
    pub fn writable(address: Address) -> Self {
        Self {
            address,
            signer: false,
            writable: true,
        }
    }

    pub fn signer(address: Address) -> Self {
        Self {
            address,
            signer: true,
            writable: true,
        }
    }
}

/// A single ledger instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program: Address,
    pub accounts: Vec<AccountMeta>,
    /// Selector followed by argument bytes.
    pub data: Vec<u8>,
}

impl Instruction {
    fn new(program: Address, method: &str, accounts: Vec<AccountMeta>) -> Self {
        Self {
            program,
            accounts,
            data: method_selector(method).to_vec(),
        }
    }

    /// Whether this instruction dispatches to `method`.
    pub fn is_method(&self, method: &str) -> bool {
        self.data.len() >= 8 && self.data[..8] == method_selector(method)
    }
}

/// Accounts for `approve_completion`: release escrow to the claimer, fee to
/// the treasury. The settlement authority signs.
pub struct ApproveAccounts {
    pub config: Address,
    pub quest: Address,
    pub claim: Address,
    pub escrow: Address,
    pub claimer_account: Address,
    pub treasury: Address,
    pub authority: Address,
}

pub fn approve_completion(program: Address, accounts: ApproveAccounts) -> Instruction {
    Instruction::new(
        program,
        "approve_completion",
        vec![
            AccountMeta::writable(accounts.config),
            AccountMeta::writable(accounts.quest),
            AccountMeta::writable(accounts.claim),
            AccountMeta::writable(accounts.escrow),
            AccountMeta::writable(accounts.claimer_account),
            AccountMeta::writable(accounts.treasury),
            AccountMeta::signer(accounts.authority),
        ],
    )
}

/// Accounts for `reject_completion`: refund escrow to the creator; the
/// claimer's stake goes back unless the rejection was safety-flagged.
pub struct RejectAccounts {
    pub config: Address,
    pub quest: Address,
    pub claim: Address,
    pub escrow: Address,
    pub creator_account: Address,
    pub claimer_account: Address,
    pub authority: Address,
}

pub fn reject_completion(
    program: Address,
    accounts: RejectAccounts,
    safety_flagged: bool,
) -> Instruction {
    let mut ix = Instruction::new(
        program,
        "reject_completion",
        vec![
            AccountMeta::writable(accounts.config),
            AccountMeta::writable(accounts.quest),
            AccountMeta::writable(accounts.claim),
            AccountMeta::writable(accounts.escrow),
            AccountMeta::writable(accounts.creator_account),
            AccountMeta::writable(accounts.claimer_account),
            AccountMeta::signer(accounts.authority),
        ],
    );
    ix.data.push(safety_flagged as u8);
    ix
}

/// Accounts for `expire_claim`: permissionless; any cranker signs.
pub struct ExpireAccounts {
    pub quest: Address,
    pub claim: Address,
    pub escrow: Address,
    pub creator_account: Address,
    pub cranker: Address,
}

pub fn expire_claim(program: Address, accounts: ExpireAccounts) -> Instruction {
    Instruction::new(
        program,
        "expire_claim",
        vec![
            AccountMeta::writable(accounts.quest),
            AccountMeta::writable(accounts.claim),
            AccountMeta::writable(accounts.escrow),
            AccountMeta::writable(accounts.creator_account),
            AccountMeta::signer(accounts.cranker),
        ],
    )
}

/// Accounts for `auto_approve`: permissionless timeout approval.
pub struct AutoApproveAccounts {
    pub config: Address,
    pub quest: Address,
    pub claim: Address,
    pub escrow: Address,
    pub claimer_account: Address,
    pub treasury: Address,
    pub cranker: Address,
}

pub fn auto_approve(program: Address, accounts: AutoApproveAccounts) -> Instruction {
    Instruction::new(
        program,
        "auto_approve",
        vec![
            AccountMeta::writable(accounts.config),
            AccountMeta::writable(accounts.quest),
            AccountMeta::writable(accounts.claim),
            AccountMeta::writable(accounts.escrow),
            AccountMeta::writable(accounts.claimer_account),
            AccountMeta::writable(accounts.treasury),
            AccountMeta::signer(accounts.cranker),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(format!("sq_{s}"))
    }

    fn approve_ix() -> Instruction {
        approve_completion(
            addr("program"),
            ApproveAccounts {
                config: addr("config"),
                quest: addr("quest"),
                claim: addr("claim"),
                escrow: addr("escrow"),
                claimer_account: addr("claimer"),
                treasury: addr("treasury"),
                authority: addr("authority"),
            },
        )
    }

    #[test]
    fn selector_prefixes_data() {
        let ix = approve_ix();
        assert_eq!(ix.data.len(), 8);
        assert!(ix.is_method("approve_completion"));
        assert!(!ix.is_method("auto_approve"));
    }

    #[test]
    fn only_the_authority_signs_approval() {
        let ix = approve_ix();
        let signers: Vec<_> = ix.accounts.iter().filter(|a| a.signer).collect();
        assert_eq!(signers.len(), 1);
        assert_eq!(signers[0].address, addr("authority"));
    }

    #[test]
    fn reject_appends_safety_flag_byte() {
        let accounts = || RejectAccounts {
            config: addr("config"),
            quest: addr("quest"),
            claim: addr("claim"),
            escrow: addr("escrow"),
            creator_account: addr("creator"),
            claimer_account: addr("claimer"),
            authority: addr("authority"),
        };
        let flagged = reject_completion(addr("program"), accounts(), true);
        let clean = reject_completion(addr("program"), accounts(), false);
        assert_eq!(flagged.data.len(), 9);
        assert_eq!(flagged.data[8], 1);
        assert_eq!(clean.data[8], 0);
        assert_eq!(flagged.data[..8], clean.data[..8]);
    }

    #[test]
    fn expire_claim_has_five_accounts_cranker_signs() {
        let ix = expire_claim(
            addr("program"),
            ExpireAccounts {
                quest: addr("quest"),
                claim: addr("claim"),
                escrow: addr("escrow"),
                creator_account: addr("creator"),
                cranker: addr("cranker"),
            },
        );
        assert_eq!(ix.accounts.len(), 5);
        assert!(ix.accounts.last().unwrap().signer);
        assert!(ix.is_method("expire_claim"));
    }

    #[test]
    fn auto_approve_mirrors_approve_with_cranker() {
        let ix = auto_approve(
            addr("program"),
            AutoApproveAccounts {
                config: addr("config"),
                quest: addr("quest"),
                claim: addr("claim"),
                escrow: addr("escrow"),
                claimer_account: addr("claimer"),
                treasury: addr("treasury"),
                cranker: addr("cranker"),
            },
        );
        assert_eq!(ix.accounts.len(), 7);
        assert!(ix.is_method("auto_approve"));
        assert_eq!(
            ix.accounts.iter().filter(|a| a.signer).count(),
            1
        );
    }
}
