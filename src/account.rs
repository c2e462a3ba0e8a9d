//! Betting account record and address derivation.
//!
//! One canonical record type with every field always present. The ledger
//! exclusively owns all fields except `locked_funds`, which is written only
//! through the wagering-collaborator surface on [`crate::BettingLedger`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Derive the deterministic account address for an owner key.
///
/// `BET_` + first 20 bytes of SHA-256(owner) as uppercase hex, the external
/// lookup key a hosting chain would realize as a program-derived address.
pub fn derive_account_address(owner: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"betting_account");
    hasher.update(owner.as_bytes());
    let hash = hasher.finalize();

    let address_hash: String = hash
        .iter()
        .take(20)
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .to_uppercase();

    format!("BET_{}", address_hash)
}

/// Stored betting account state. `available_balance` is never a field here;
/// it is recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingAccount {
    /// Owner identity (public key / account id). Immutable.
    pub owner: String,

    /// Derived account address. Immutable.
    pub address: String,

    /// Balance in lamports. Invariant: `balance >= locked_funds`.
    pub balance: u64,

    /// Lamports committed to pending wagers, unavailable for withdrawal.
    pub locked_funds: u64,

    /// Cumulative lamports ever deposited. Monotone.
    pub total_deposited: u64,

    /// Cumulative lamports ever withdrawn. Monotone.
    pub total_withdrawn: u64,

    pub deposit_count: u64,
    pub withdrawal_count: u64,

    /// Unix timestamp of the most recent successful withdrawal; `None`
    /// before the first one.
    pub last_withdrawal_time: Option<u64>,

    /// Unix timestamp of account creation.
    pub created_at: u64,

    /// Unix timestamp of the most recent successful create/deposit/withdraw.
    pub last_activity: u64,
}

impl BettingAccount {
    /// Fresh zeroed account for `owner`.
    pub fn new(owner: String, now: u64) -> Self {
        let address = derive_account_address(&owner);
        Self {
            owner,
            address,
            balance: 0,
            locked_funds: 0,
            total_deposited: 0,
            total_withdrawn: 0,
            deposit_count: 0,
            withdrawal_count: 0,
            last_withdrawal_time: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// Lamports withdrawable right now: `balance - locked_funds`.
    #[inline]
    pub fn available_balance(&self) -> u64 {
        self.balance - self.locked_funds
    }

    /// Read-only view with the computed available balance attached.
    pub fn view(&self) -> AccountView {
        AccountView {
            owner: self.owner.clone(),
            address: self.address.clone(),
            balance: self.balance,
            locked_funds: self.locked_funds,
            available_balance: self.available_balance(),
            total_deposited: self.total_deposited,
            total_withdrawn: self.total_withdrawn,
            deposit_count: self.deposit_count,
            withdrawal_count: self.withdrawal_count,
            last_withdrawal_time: self.last_withdrawal_time,
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }
}

/// What queries return: the stored fields plus `available_balance`,
/// computed at read time and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub owner: String,
    pub address: String,
    pub balance: u64,
    pub locked_funds: u64,
    pub available_balance: u64,
    pub total_deposited: u64,
    pub total_withdrawn: u64,
    pub deposit_count: u64,
    pub withdrawal_count: u64,
    pub last_withdrawal_time: Option<u64>,
    pub created_at: u64,
    pub last_activity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_derivation_is_deterministic() {
        let a = derive_account_address("alice_pubkey");
        let b = derive_account_address("alice_pubkey");
        assert_eq!(a, b, "same owner must derive the same address");
        assert!(a.starts_with("BET_"));
        assert_eq!(a.len(), 4 + 40, "BET_ prefix + 40 hex chars");
    }

    #[test]
    fn address_derivation_is_unique_per_owner() {
        assert_ne!(
            derive_account_address("alice_pubkey"),
            derive_account_address("bob_pubkey")
        );
    }

    #[test]
    fn new_account_is_zeroed() {
        let acct = BettingAccount::new("alice".to_string(), 1_700_000_000);
        assert_eq!(acct.balance, 0);
        assert_eq!(acct.locked_funds, 0);
        assert_eq!(acct.total_deposited, 0);
        assert_eq!(acct.total_withdrawn, 0);
        assert_eq!(acct.deposit_count, 0);
        assert_eq!(acct.withdrawal_count, 0);
        assert_eq!(acct.last_withdrawal_time, None);
        assert_eq!(acct.last_activity, 1_700_000_000);
    }

    #[test]
    fn available_balance_subtracts_locked() {
        let mut acct = BettingAccount::new("alice".to_string(), 0);
        acct.balance = 5_000;
        acct.locked_funds = 3_000;
        assert_eq!(acct.available_balance(), 2_000);
        assert_eq!(acct.view().available_balance, 2_000);
    }
}
