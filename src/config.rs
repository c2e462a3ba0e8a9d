//! Ledger policy configuration.
//!
//! Deposit/withdrawal bounds and the withdrawal cooldown are policy values,
//! not constants: every deployment supplies them (or takes the reference
//! defaults below). The ledger is constructed with one `LedgerConfig` and is
//! the single code path that enforces it; UI-layer pre-checks are advisory.

use crate::error::LedgerError;

/// Lamports per SOL (smallest currency unit).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Policy bounds enforced by [`crate::BettingLedger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Minimum accepted deposit, in lamports.
    pub min_deposit: u64,

    /// Maximum accepted deposit, in lamports.
    pub max_deposit: u64,

    /// Minimum accepted withdrawal, in lamports.
    pub min_withdrawal: u64,

    /// Mandatory gap between successive withdrawals, in seconds.
    pub cooldown_secs: u64,
}

impl Default for LedgerConfig {
    /// Reference policy: 0.1 SOL min deposit, 100 SOL max deposit,
    /// 0.01 SOL min withdrawal, 24h cooldown.
    fn default() -> Self {
        Self {
            min_deposit: LAMPORTS_PER_SOL / 10,
            max_deposit: 100 * LAMPORTS_PER_SOL,
            min_withdrawal: LAMPORTS_PER_SOL / 100,
            cooldown_secs: 24 * 60 * 60,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables, falling back to the
    /// reference defaults for anything unset.
    ///
    /// Recognized variables (all lamports except the cooldown):
    /// `BETBOOK_MIN_DEPOSIT_LAMPORTS`, `BETBOOK_MAX_DEPOSIT_LAMPORTS`,
    /// `BETBOOK_MIN_WITHDRAWAL_LAMPORTS`, `BETBOOK_COOLDOWN_SECS`.
    pub fn from_env() -> Result<Self, LedgerError> {
        let defaults = Self::default();
        Ok(Self {
            min_deposit: env_u64("BETBOOK_MIN_DEPOSIT_LAMPORTS", defaults.min_deposit)?,
            max_deposit: env_u64("BETBOOK_MAX_DEPOSIT_LAMPORTS", defaults.max_deposit)?,
            min_withdrawal: env_u64("BETBOOK_MIN_WITHDRAWAL_LAMPORTS", defaults.min_withdrawal)?,
            cooldown_secs: env_u64("BETBOOK_COOLDOWN_SECS", defaults.cooldown_secs)?,
        })
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64, LedgerError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| LedgerError::Config(format!("{} must be an integer, got {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Convert whole SOL to lamports. Convenience for hosts and tests that
/// express policy in SOL.
pub fn sol(amount: f64) -> u64 {
    // Round, never truncate: 0.6 * 1e9 is 599_999_999.99... in f64
    (amount * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Convert lamports to SOL for display.
pub fn to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
