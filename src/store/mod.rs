//! Account persistence behind an injectable interface.
//!
//! The ledger's in-memory map is the authority during an operation (the
//! per-owner entry lock serializes read-validate-write); the store is the
//! durability half. Write ordering follows the storage layer convention:
//! commit to the store first, make the cache mutation visible after, so a
//! failed commit leaves the account unchanged.
//!
//! [`MemoryStore`] backs tests and pure-simulator hosts;
//! [`persistent::RedbStore`] is the durable implementation.

pub mod persistent;

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::account::BettingAccount;
use crate::events::LedgerEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt record for key {key}: {detail}")]
    CorruptRecord { key: String, detail: String },
}

/// Keyed account map + event log behind an interface, so the hosting
/// environment chooses durability without touching ledger logic.
pub trait AccountStore: Send + Sync {
    /// All persisted accounts, for cache warm-load at startup.
    fn load_accounts(&self) -> Result<Vec<BettingAccount>, StoreError>;

    /// Durably write one account record (full record, keyed by owner).
    fn persist_account(&self, account: &BettingAccount) -> Result<(), StoreError>;

    /// Durably append one emitted event.
    fn append_event(&self, event: &LedgerEvent) -> Result<(), StoreError>;

    /// Most recent persisted events, newest first.
    fn load_events(&self, limit: usize) -> Result<Vec<LedgerEvent>, StoreError>;
}

/// Volatile store for tests and simulators. Same contract as the durable
/// store, no disk.
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, BettingAccount>>,
    events: RwLock<Vec<LedgerEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn load_accounts(&self) -> Result<Vec<BettingAccount>, StoreError> {
        Ok(self.accounts.read().values().cloned().collect())
    }

    fn persist_account(&self, account: &BettingAccount) -> Result<(), StoreError> {
        self.accounts
            .write()
            .insert(account.owner.clone(), account.clone());
        Ok(())
    }

    fn append_event(&self, event: &LedgerEvent) -> Result<(), StoreError> {
        self.events.write().push(event.clone());
        Ok(())
    }

    fn load_events(&self, limit: usize) -> Result<Vec<LedgerEvent>, StoreError> {
        let events = self.events.read();
        Ok(events.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_accounts() {
        let store = MemoryStore::new();
        let acct = BettingAccount::new("alice".to_string(), 1_000);
        store.persist_account(&acct).unwrap();

        let loaded = store.load_accounts().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], acct);
    }

    #[test]
    fn memory_store_overwrites_same_owner() {
        let store = MemoryStore::new();
        let mut acct = BettingAccount::new("alice".to_string(), 1_000);
        store.persist_account(&acct).unwrap();

        acct.balance = 500;
        store.persist_account(&acct).unwrap();

        let loaded = store.load_accounts().unwrap();
        assert_eq!(loaded.len(), 1, "re-persisting must overwrite, not append");
        assert_eq!(loaded[0].balance, 500);
    }

    #[test]
    fn memory_store_events_newest_first() {
        let store = MemoryStore::new();
        store
            .append_event(&LedgerEvent::account_created("alice", "BET_A", 1))
            .unwrap();
        store
            .append_event(&LedgerEvent::account_created("bob", "BET_B", 2))
            .unwrap();

        let events = store.load_events(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp(), 2);
    }
}
