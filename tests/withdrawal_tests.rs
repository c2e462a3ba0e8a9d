//! Withdrawal Tests
//!
//! The security-critical path: validation order, the 24h cooldown, and the
//! pre-flight query. Uses the manual clock to cross the cooldown without
//! sleeping.


use betbook::{LedgerConfig, LedgerError, LedgerEvent};
use test_helpers::{funded_account, manual_ledger, sol, T0};

const COOLDOWN: u64 = 24 * 60 * 60;

// ============================================================================
// VALIDATION ORDER
// ============================================================================

#[test]
fn test_missing_account_checked_first() {
    let (ledger, _) = manual_ledger();

    // Zero amount against a missing account: existence wins
    let err = ledger.withdraw_sol("ghost", 0).unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound { .. }), "got {:?}", err);
}

#[test]
fn test_zero_amount_rejected_before_minimum_check() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 1.0);

    let err = ledger.withdraw_sol("alice", 0).unwrap_err();
    assert_eq!(err, LedgerError::InvalidAmount);
}

#[test]
fn test_below_minimum_withdrawal_rejected() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 1.0);

    // 0.005 SOL is below the 0.01 SOL minimum
    let err = ledger.withdraw_sol("alice", sol(0.005)).unwrap_err();
    assert!(
        matches!(err, LedgerError::WithdrawalTooSmall { amount, min }
            if amount == sol(0.005) && min == sol(0.01)),
        "got {:?}",
        err
    );
}

#[test]
fn test_available_balance_checked_before_cooldown() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 1.0);

    // First withdrawal arms the cooldown
    ledger.withdraw_sol("alice", sol(0.2)).unwrap();

    // Second attempt is both over-available AND inside the cooldown;
    // the caller must learn about the balance problem, not the clock.
    let err = ledger.withdraw_sol("alice", sol(5.0)).unwrap_err();
    assert!(
        matches!(err, LedgerError::InsufficientAvailableBalance { .. }),
        "available-balance check must precede the cooldown check, got {:?}",
        err
    );
}

// ============================================================================
// SUCCESSFUL WITHDRAWAL
// ============================================================================

#[test]
fn test_withdrawal_updates_balance_and_sets_cooldown_clock() {
    let (ledger, clock) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    clock.advance(100);
    let receipt = ledger.withdraw_sol("alice", sol(0.1)).unwrap();

    assert_eq!(receipt.account.balance, sol(0.4));
    assert_eq!(receipt.account.total_withdrawn, sol(0.1));
    assert_eq!(receipt.account.withdrawal_count, 1);
    assert_eq!(
        receipt.account.last_withdrawal_time,
        Some(T0 + 100),
        "last_withdrawal_time must be the ledger-clock time of the call"
    );
    assert_eq!(receipt.account.last_activity, T0 + 100);

    match &receipt.event {
        LedgerEvent::SolWithdrawn {
            amount, new_balance, ..
        } => {
            assert_eq!(*amount, sol(0.1));
            assert_eq!(*new_balance, sol(0.4));
        }
        other => panic!("expected SolWithdrawn, got {:?}", other),
    }
}

#[test]
fn test_whole_available_balance_is_withdrawable() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 1.0);

    ledger.withdraw_sol("alice", sol(1.0)).unwrap();
    assert_eq!(ledger.get_account("alice").unwrap().balance, 0);
}

// ============================================================================
// COOLDOWN
// ============================================================================

#[test]
fn test_immediate_second_withdrawal_hits_cooldown() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    ledger.withdraw_sol("alice", sol(0.1)).unwrap();
    let err = ledger.withdraw_sol("alice", sol(0.1)).unwrap_err();

    assert!(
        matches!(err, LedgerError::CooldownActive { remaining_secs } if remaining_secs == COOLDOWN),
        "immediately after a withdrawal the full 24h must remain, got {:?}",
        err
    );
}

#[test]
fn test_cooldown_remaining_shrinks_with_time() {
    let (ledger, clock) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    ledger.withdraw_sol("alice", sol(0.1)).unwrap();
    clock.advance(COOLDOWN - 3_600);

    let err = ledger.withdraw_sol("alice", sol(0.1)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::CooldownActive {
            remaining_secs: 3_600
        }
    );
}

#[test]
fn test_withdrawal_allowed_after_cooldown_elapses() {
    let (ledger, clock) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    ledger.withdraw_sol("alice", sol(0.1)).unwrap();
    clock.advance(COOLDOWN);

    let receipt = ledger.withdraw_sol("alice", sol(0.1)).unwrap();
    assert_eq!(receipt.account.balance, sol(0.3));
    assert_eq!(receipt.account.withdrawal_count, 2);
}

#[test]
fn test_first_withdrawal_never_cooldown_gated() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    // Fresh account, sentinel "never": no cooldown applies
    assert!(ledger.withdraw_sol("alice", sol(0.1)).is_ok());
}

#[test]
fn test_rejected_withdrawal_leaves_account_unchanged() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);
    ledger.withdraw_sol("alice", sol(0.1)).unwrap();

    let before = ledger.get_account("alice").unwrap();
    let _ = ledger.withdraw_sol("alice", sol(0.1)).unwrap_err();

    assert_eq!(
        ledger.get_account("alice").unwrap(),
        before,
        "a cooldown rejection must not mutate any stored field"
    );
}

#[test]
fn test_total_withdrawn_monotone_across_cycles() {
    let (ledger, clock) = manual_ledger();
    funded_account(&ledger, "alice", 2.0);

    let mut last_withdrawn = 0;
    for _ in 0..3 {
        ledger.withdraw_sol("alice", sol(0.1)).unwrap();
        let view = ledger.get_account("alice").unwrap();
        assert!(view.total_withdrawn > last_withdrawn);
        last_withdrawn = view.total_withdrawn;
        clock.advance(COOLDOWN);
    }
    assert_eq!(last_withdrawn, sol(0.3));
}

// ============================================================================
// CAN_WITHDRAW PRE-FLIGHT
// ============================================================================

#[test]
fn test_can_withdraw_true_before_first_withdrawal() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    let window = ledger.can_withdraw("alice").unwrap();
    assert!(window.can_withdraw);
    assert_eq!(window.cooldown_remaining_secs, 0);
    assert_eq!(window.next_withdrawal_at, T0);
}

#[test]
fn test_can_withdraw_reports_remaining_and_next_time() {
    let (ledger, clock) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);

    ledger.withdraw_sol("alice", sol(0.1)).unwrap();
    clock.advance(1_000);

    let window = ledger.can_withdraw("alice").unwrap();
    assert!(!window.can_withdraw);
    assert_eq!(window.cooldown_remaining_secs, COOLDOWN - 1_000);
    assert_eq!(window.next_withdrawal_at, T0 + COOLDOWN);
}

#[test]
fn test_can_withdraw_is_pure() {
    let (ledger, _) = manual_ledger();
    funded_account(&ledger, "alice", 0.5);
    ledger.withdraw_sol("alice", sol(0.1)).unwrap();

    let before = ledger.get_account("alice").unwrap();
    for _ in 0..3 {
        ledger.can_withdraw("alice").unwrap();
    }
    assert_eq!(ledger.get_account("alice").unwrap(), before);
}

#[test]
fn test_can_withdraw_missing_account() {
    let (ledger, _) = manual_ledger();
    assert!(matches!(
        ledger.can_withdraw("ghost").unwrap_err(),
        LedgerError::AccountNotFound { .. }
    ));
}

// ============================================================================
// POLICY CONFIGURATION
// ============================================================================

#[test]
fn test_custom_cooldown_respected() {
    let clock = std::sync::Arc::new(betbook::ManualClock::new(T0));
    let config = LedgerConfig {
        cooldown_secs: 60,
        ..LedgerConfig::default()
    };
    let ledger = betbook::BettingLedger::with_parts(
        config,
        std::sync::Arc::new(betbook::MemoryStore::new()),
        clock.clone(),
    )
    .unwrap();

    funded_account(&ledger, "alice", 1.0);
    ledger.withdraw_sol("alice", sol(0.1)).unwrap();

    clock.advance(59);
    assert!(matches!(
        ledger.withdraw_sol("alice", sol(0.1)).unwrap_err(),
        LedgerError::CooldownActive { remaining_secs: 1 }
    ));

    clock.advance(1);
    assert!(ledger.withdraw_sol("alice", sol(0.1)).is_ok());
}
