//! Domain events and the in-process journal.
//!
//! Each successful mutation emits one event carrying enough detail (owner,
//! account address, amount, resulting balance, timestamp) for an external
//! indexer to reconstruct balance history without re-deriving it from raw
//! transfer logs.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LedgerEvent {
    AccountCreated {
        event_id: String,
        owner: String,
        account: String,
        timestamp: u64,
    },
    SolDeposited {
        event_id: String,
        owner: String,
        account: String,
        amount: u64,
        new_balance: u64,
        timestamp: u64,
    },
    SolWithdrawn {
        event_id: String,
        owner: String,
        account: String,
        amount: u64,
        new_balance: u64,
        timestamp: u64,
    },
}

impl LedgerEvent {
    pub fn account_created(owner: &str, account: &str, timestamp: u64) -> Self {
        Self::AccountCreated {
            event_id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            account: account.to_string(),
            timestamp,
        }
    }

    pub fn sol_deposited(
        owner: &str,
        account: &str,
        amount: u64,
        new_balance: u64,
        timestamp: u64,
    ) -> Self {
        Self::SolDeposited {
            event_id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            account: account.to_string(),
            amount,
            new_balance,
            timestamp,
        }
    }

    pub fn sol_withdrawn(
        owner: &str,
        account: &str,
        amount: u64,
        new_balance: u64,
        timestamp: u64,
    ) -> Self {
        Self::SolWithdrawn {
            event_id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            account: account.to_string(),
            amount,
            new_balance,
            timestamp,
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            Self::AccountCreated { event_id, .. }
            | Self::SolDeposited { event_id, .. }
            | Self::SolWithdrawn { event_id, .. } => event_id,
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            Self::AccountCreated { owner, .. }
            | Self::SolDeposited { owner, .. }
            | Self::SolWithdrawn { owner, .. } => owner,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            Self::AccountCreated { timestamp, .. }
            | Self::SolDeposited { timestamp, .. }
            | Self::SolWithdrawn { timestamp, .. } => *timestamp,
        }
    }
}

/// Append-only in-process event log.
///
/// Emission order matches commit order per owner (events are appended while
/// the per-owner entry lock is held).
#[derive(Default)]
pub struct EventJournal {
    events: RwLock<Vec<LedgerEvent>>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, event: LedgerEvent) {
        self.events.write().push(event);
    }

    /// Most recent events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<LedgerEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    /// Events for a single owner, oldest first.
    pub fn for_owner(&self, owner: &str) -> Vec<LedgerEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.owner() == owner)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}
