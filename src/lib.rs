//! Betbook - Betting Account Ledger Core
//!
//! In-process ledger for betting accounts with deposits, cooldown-gated
//! withdrawals and wager-escrow bookkeeping. Hosting environments (an
//! on-chain program, an API service, a local simulator) adapt the operation
//! set to their own transport; this crate is the sole authority on balances
//! and validation.
//!
//! ## Architecture
//!
//! - **Storage**: ReDB (ACID) + DashMap (lock-free cache)
//! - **Concurrency**: per-owner entry locks, no global lock in steady state
//! - **Clock**: ledger-owned (host-trusted), never client-supplied
//! - **Events**: append-only journal consumed by external indexers

pub mod account;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod store;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use account::{derive_account_address, AccountView, BettingAccount};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LedgerConfig, LAMPORTS_PER_SOL};
pub use error::LedgerError;
pub use events::{EventJournal, LedgerEvent};
pub use ledger::{BettingLedger, DepositReceipt, LedgerStats, WithdrawalReceipt, WithdrawalWindow};
pub use store::{persistent::RedbStore, AccountStore, MemoryStore, StoreError};
