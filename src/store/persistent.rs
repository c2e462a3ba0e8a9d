//! Durable account store on ReDB.
//!
//! ReDB gives single-writer MVCC transactions; every persist is one
//! committed write transaction. Records are serde_json-encoded, keyed by
//! owner (accounts) and by a monotone sequence number (events).

use std::sync::atomic::{AtomicU64, Ordering};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::info;

use crate::account::BettingAccount;
use crate::events::LedgerEvent;

use super::{AccountStore, StoreError};

/// Betting accounts: owner (String) -> account record (JSON bytes)
const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("betting_accounts");

/// Emitted events: sequence (u64) -> event record (JSON bytes)
const EVENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("ledger_events");

pub struct RedbStore {
    db: Database,
    event_seq: AtomicU64,
}

impl RedbStore {
    /// Create or open the ledger database under `path` (a directory).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        info!(path = %path, "Opening ReDB ledger database");

        std::fs::create_dir_all(path).map_err(|e| StoreError::Backend(e.to_string()))?;

        let db = Database::create(format!("{}/betbook.redb", path))
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Initialize tables
        let write_txn = db
            .begin_write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        {
            let _ = write_txn
                .open_table(ACCOUNTS)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let _ = write_txn
                .open_table(EVENTS)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Resume the event sequence after the last persisted event
        let next_seq = {
            let read_txn = db
                .begin_read()
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let table = read_txn
                .open_table(EVENTS)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            let next = table
                .last()
                .map_err(|e| StoreError::Backend(e.to_string()))?
                .map(|(key, _)| key.value() + 1)
                .unwrap_or(0);
            next
        };

        Ok(Self {
            db,
            event_seq: AtomicU64::new(next_seq),
        })
    }
}

impl AccountStore for RedbStore {
    fn load_accounts(&self) -> Result<Vec<BettingAccount>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let table = read_txn
            .open_table(ACCOUNTS)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut accounts = Vec::new();
        let mut iter = table.iter().map_err(|e| StoreError::Backend(e.to_string()))?;
        while let Some(result) = iter.next() {
            let (key, value) = result.map_err(|e| StoreError::Backend(e.to_string()))?;
            let account: BettingAccount =
                serde_json::from_slice(value.value()).map_err(|e| StoreError::CorruptRecord {
                    key: key.value().to_string(),
                    detail: e.to_string(),
                })?;
            accounts.push(account);
        }

        info!(accounts = accounts.len(), "Ledger database loaded");
        Ok(accounts)
    }

    fn persist_account(&self, account: &BettingAccount) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_vec(account).map_err(|e| StoreError::Backend(e.to_string()))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(ACCOUNTS)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            table
                .insert(account.owner.as_str(), encoded.as_slice())
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    fn append_event(&self, event: &LedgerEvent) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(event).map_err(|e| StoreError::Backend(e.to_string()))?;
        let seq = self.event_seq.fetch_add(1, Ordering::SeqCst);

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(EVENTS)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            table
                .insert(seq, encoded.as_slice())
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    fn load_events(&self, limit: usize) -> Result<Vec<LedgerEvent>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let table = read_txn
            .open_table(EVENTS)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut events = Vec::new();
        let mut iter = table
            .iter()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .rev();
        while let Some(result) = iter.next() {
            if events.len() >= limit {
                break;
            }
            let (key, value) = result.map_err(|e| StoreError::Backend(e.to_string()))?;
            let event: LedgerEvent =
                serde_json::from_slice(value.value()).map_err(|e| StoreError::CorruptRecord {
                    key: key.value().to_string(),
                    detail: e.to_string(),
                })?;
            events.push(event);
        }

        Ok(events)
    }
}
