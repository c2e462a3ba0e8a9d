//! Ledger error taxonomy.
//!
//! Every validation failure is a distinct variant with its structured
//! detail, never a generic "failed" string: hosting layers render actionable
//! messages from these ("wait N hours" vs "reduce amount, funds are locked")
//! and must be able to tell them apart. A failure is scoped to the single
//! requested operation; it never poisons the ledger or other accounts.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no betting account exists for owner {owner}")]
    AccountNotFound { owner: String },

    #[error("betting account already exists for owner {owner}")]
    AlreadyExists { owner: String },

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("deposit of {amount} lamports is below the minimum of {min} lamports")]
    DepositTooSmall { amount: u64, min: u64 },

    #[error("deposit of {amount} lamports exceeds the maximum of {max} lamports")]
    DepositTooLarge { amount: u64, max: u64 },

    #[error("withdrawal of {amount} lamports is below the minimum of {min} lamports")]
    WithdrawalTooSmall { amount: u64, min: u64 },

    /// Distinct from "insufficient total balance": the account may hold the
    /// funds, but part of them is committed to pending wagers.
    #[error(
        "insufficient available balance: {available} lamports available ({locked} locked by pending wagers)"
    )]
    InsufficientAvailableBalance { available: u64, locked: u64 },

    #[error("withdrawal cooldown active: {remaining_secs}s until the next withdrawal is allowed")]
    CooldownActive { remaining_secs: u64 },

    /// Wagering-collaborator surface only: a release larger than the
    /// currently locked amount.
    #[error("cannot release {requested} lamports: only {locked} lamports are locked")]
    InsufficientLockedFunds { locked: u64, requested: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
