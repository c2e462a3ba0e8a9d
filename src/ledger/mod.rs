//! Betting ledger - the single authority on account state.
//!
//! All validation runs in exactly one code path per operation, under a
//! per-owner entry lock held across the whole read-validate-write sequence.
//! Different owners hash to different DashMap shards, so unrelated accounts
//! never contend on a global lock.
//!
//! # Thread Safety
//! - `Clone` is cheap (Arc handles)
//! - `get_account()`/`can_withdraw()` take shard read locks only
//! - mutations serialize per owner via the entry guard
//!
//! # Write ordering
//! Store commit first, cache mutation after: a rejected or failed operation
//! leaves the cached account byte-for-byte unchanged.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::account::{AccountView, BettingAccount};
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::events::{EventJournal, LedgerEvent};
use crate::store::{persistent::RedbStore, AccountStore, MemoryStore};

/// Successful deposit: the post-state view plus the emitted event.
#[derive(Debug, Clone, Serialize)]
pub struct DepositReceipt {
    pub account: AccountView,
    pub event: LedgerEvent,
}

/// Successful withdrawal: the post-state view plus the emitted event.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalReceipt {
    pub account: AccountView,
    pub event: LedgerEvent,
}

/// Cooldown pre-flight for UI state, derived purely from
/// `last_withdrawal_time` and the ledger clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalWindow {
    pub can_withdraw: bool,
    /// Seconds until the cooldown clears; 0 when eligible now.
    pub cooldown_remaining_secs: u64,
    /// Unix timestamp at which the next withdrawal is allowed.
    pub next_withdrawal_at: u64,
}

/// Aggregate snapshot across all accounts.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub total_accounts: u64,
    pub total_balance: u64,
    pub total_locked: u64,
    pub total_deposited: u64,
    pub total_withdrawn: u64,
}

/// The betting account ledger.
///
/// Owns every account record; the only field an external collaborator may
/// write is `locked_funds`, and only through [`BettingLedger::lock_funds`] /
/// [`BettingLedger::release_funds`].
#[derive(Clone)]
pub struct BettingLedger {
    /// Account cache, authoritative during operations (DashMap = sharded,
    /// per-key locking).
    accounts: Arc<DashMap<String, BettingAccount>>,

    /// Durability half; committed before cache mutations become visible.
    store: Arc<dyn AccountStore>,

    /// Host-trusted clock. Callers never supply wall time.
    clock: Arc<dyn Clock>,

    journal: Arc<EventJournal>,

    config: LedgerConfig,
}

impl BettingLedger {
    /// In-memory ledger with the system clock (simulator hosts, tests).
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_parts(config, Arc::new(MemoryStore::new()), Arc::new(SystemClock))
            .expect("memory store warm-load cannot fail")
    }

    /// Durable ledger on a ReDB database under `path`.
    pub fn open(path: &str, config: LedgerConfig) -> Result<Self, LedgerError> {
        let store = RedbStore::open(path)?;
        Self::with_parts(config, Arc::new(store), Arc::new(SystemClock))
    }

    /// Fully injected construction: any store, any clock. Warm-loads all
    /// persisted accounts into the cache.
    pub fn with_parts(
        config: LedgerConfig,
        store: Arc<dyn AccountStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let accounts = Arc::new(DashMap::new());
        for account in store.load_accounts()? {
            accounts.insert(account.owner.clone(), account);
        }

        info!(accounts = accounts.len(), "Betting ledger ready");

        Ok(Self {
            accounts,
            store,
            clock,
            journal: Arc::new(EventJournal::new()),
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ========================================================================
    // ACCOUNT LIFECYCLE
    // ========================================================================

    /// Create the betting account for `owner`.
    ///
    /// Exactly once per owner: a second call fails with `AlreadyExists`
    /// rather than silently succeeding, so idempotency stays the caller's
    /// responsibility.
    pub fn create_account(&self, owner: &str) -> Result<AccountView, LedgerError> {
        let now = self.clock.unix_now();

        match self.accounts.entry(owner.to_string()) {
            Entry::Occupied(_) => Err(LedgerError::AlreadyExists {
                owner: owner.to_string(),
            }),
            Entry::Vacant(slot) => {
                let account = BettingAccount::new(owner.to_string(), now);
                self.store.persist_account(&account)?;

                let event = LedgerEvent::account_created(owner, &account.address, now);
                self.record_event(event);

                info!(owner = %owner, address = %account.address, "Betting account created");

                let view = account.view();
                slot.insert(account);
                Ok(view)
            }
        }
    }

    /// Deposit `amount` lamports into `owner`'s account.
    ///
    /// The hosting environment moves the actual funds into custody under the
    /// same transaction boundary; this is the bookkeeping half.
    pub fn deposit_sol(&self, owner: &str, amount: u64) -> Result<DepositReceipt, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| LedgerError::AccountNotFound {
                owner: owner.to_string(),
            })?;

        if amount < self.config.min_deposit {
            return Err(LedgerError::DepositTooSmall {
                amount,
                min: self.config.min_deposit,
            });
        }
        if amount > self.config.max_deposit {
            return Err(LedgerError::DepositTooLarge {
                amount,
                max: self.config.max_deposit,
            });
        }

        let now = self.clock.unix_now();
        let mut updated = entry.clone();
        updated.balance += amount;
        updated.total_deposited += amount;
        updated.deposit_count += 1;
        updated.last_activity = now;

        self.store.persist_account(&updated)?;

        let event =
            LedgerEvent::sol_deposited(owner, &updated.address, amount, updated.balance, now);
        let view = updated.view();
        *entry = updated;

        // Still inside the per-owner lock: journal order matches commit order
        self.record_event(event.clone());
        drop(entry);

        info!(
            owner = %owner,
            amount = amount,
            new_balance = view.balance,
            "Deposit accepted"
        );

        Ok(DepositReceipt {
            account: view,
            event,
        })
    }

    /// Withdraw `amount` lamports from `owner`'s account.
    ///
    /// Validation order is part of the contract: existence, then amount
    /// shape, then locked-funds availability, then the cooldown. Available
    /// balance is checked before the cooldown because the two rejections
    /// demand different corrective actions from the caller and must never be
    /// conflated.
    pub fn withdraw_sol(&self, owner: &str, amount: u64) -> Result<WithdrawalReceipt, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| LedgerError::AccountNotFound {
                owner: owner.to_string(),
            })?;

        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount < self.config.min_withdrawal {
            return Err(LedgerError::WithdrawalTooSmall {
                amount,
                min: self.config.min_withdrawal,
            });
        }

        let available = entry.available_balance();
        if amount > available {
            return Err(LedgerError::InsufficientAvailableBalance {
                available,
                locked: entry.locked_funds,
            });
        }

        let now = self.clock.unix_now();
        if let Some(last) = entry.last_withdrawal_time {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.config.cooldown_secs {
                let remaining_secs = self.config.cooldown_secs - elapsed;
                warn!(
                    owner = %owner,
                    remaining_secs = remaining_secs,
                    "Withdrawal rejected: cooldown active"
                );
                return Err(LedgerError::CooldownActive { remaining_secs });
            }
        }

        let mut updated = entry.clone();
        updated.balance -= amount;
        updated.total_withdrawn += amount;
        updated.withdrawal_count += 1;
        updated.last_withdrawal_time = Some(now);
        updated.last_activity = now;

        self.store.persist_account(&updated)?;

        let event =
            LedgerEvent::sol_withdrawn(owner, &updated.address, amount, updated.balance, now);
        let view = updated.view();
        *entry = updated;

        self.record_event(event.clone());
        drop(entry);

        info!(
            owner = %owner,
            amount = amount,
            new_balance = view.balance,
            "Withdrawal accepted"
        );

        Ok(WithdrawalReceipt {
            account: view,
            event,
        })
    }

    // ========================================================================
    // QUERIES (read-only)
    // ========================================================================

    /// Current account state with the computed available balance.
    pub fn get_account(&self, owner: &str) -> Result<AccountView, LedgerError> {
        self.accounts
            .get(owner)
            .map(|entry| entry.view())
            .ok_or_else(|| LedgerError::AccountNotFound {
                owner: owner.to_string(),
            })
    }

    /// Cooldown pre-flight: may `owner` withdraw right now, and if not,
    /// when. Pure query, no mutation.
    pub fn can_withdraw(&self, owner: &str) -> Result<WithdrawalWindow, LedgerError> {
        let entry = self
            .accounts
            .get(owner)
            .ok_or_else(|| LedgerError::AccountNotFound {
                owner: owner.to_string(),
            })?;

        let now = self.clock.unix_now();
        let window = match entry.last_withdrawal_time {
            None => WithdrawalWindow {
                can_withdraw: true,
                cooldown_remaining_secs: 0,
                next_withdrawal_at: now,
            },
            Some(last) => {
                let elapsed = now.saturating_sub(last);
                if elapsed >= self.config.cooldown_secs {
                    WithdrawalWindow {
                        can_withdraw: true,
                        cooldown_remaining_secs: 0,
                        next_withdrawal_at: now,
                    }
                } else {
                    WithdrawalWindow {
                        can_withdraw: false,
                        cooldown_remaining_secs: self.config.cooldown_secs - elapsed,
                        next_withdrawal_at: last + self.config.cooldown_secs,
                    }
                }
            }
        };

        Ok(window)
    }

    /// Aggregate snapshot across all accounts.
    pub fn stats(&self) -> LedgerStats {
        let mut stats = LedgerStats {
            total_accounts: 0,
            total_balance: 0,
            total_locked: 0,
            total_deposited: 0,
            total_withdrawn: 0,
        };
        for entry in self.accounts.iter() {
            stats.total_accounts += 1;
            stats.total_balance += entry.balance;
            stats.total_locked += entry.locked_funds;
            stats.total_deposited += entry.total_deposited;
            stats.total_withdrawn += entry.total_withdrawn;
        }
        stats
    }

    /// Most recent emitted events, newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<LedgerEvent> {
        self.journal.recent(limit)
    }

    /// All events emitted for one owner this session, oldest first.
    pub fn events_for_owner(&self, owner: &str) -> Vec<LedgerEvent> {
        self.journal.for_owner(owner)
    }

    // ========================================================================
    // WAGERING COLLABORATOR CONTRACT
    // ========================================================================
    //
    // `locked_funds` is written ONLY here, by the external wagering
    // subsystem: `lock_funds` when a wager commits part of the balance,
    // `release_funds` when settlement frees it. Create/deposit/withdraw
    // never change it, and neither call touches `last_activity` or the
    // deposit/withdrawal counters.

    /// Commit `amount` lamports of `owner`'s balance to a pending wager.
    pub fn lock_funds(&self, owner: &str, amount: u64) -> Result<AccountView, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| LedgerError::AccountNotFound {
                owner: owner.to_string(),
            })?;

        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }

        let available = entry.available_balance();
        if amount > available {
            return Err(LedgerError::InsufficientAvailableBalance {
                available,
                locked: entry.locked_funds,
            });
        }

        let mut updated = entry.clone();
        updated.locked_funds += amount;
        self.store.persist_account(&updated)?;

        let view = updated.view();
        *entry = updated;

        info!(owner = %owner, amount = amount, locked = view.locked_funds, "Funds locked for wager");
        Ok(view)
    }

    /// Release `amount` lamports previously locked, after wager settlement.
    pub fn release_funds(&self, owner: &str, amount: u64) -> Result<AccountView, LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(owner)
            .ok_or_else(|| LedgerError::AccountNotFound {
                owner: owner.to_string(),
            })?;

        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > entry.locked_funds {
            return Err(LedgerError::InsufficientLockedFunds {
                locked: entry.locked_funds,
                requested: amount,
            });
        }

        let mut updated = entry.clone();
        updated.locked_funds -= amount;
        self.store.persist_account(&updated)?;

        let view = updated.view();
        *entry = updated;

        info!(owner = %owner, amount = amount, locked = view.locked_funds, "Locked funds released");
        Ok(view)
    }

    fn record_event(&self, event: LedgerEvent) {
        // Event persistence is best-effort relative to the account commit:
        // the account record is the source of truth, the event log is an
        // index for external observers.
        if let Err(err) = self.store.append_event(&event) {
            warn!(error = %err, "Failed to persist ledger event");
        }
        self.journal.append(event);
    }
}
