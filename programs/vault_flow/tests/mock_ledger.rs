mod common;

use chrono::Duration;
use common::*;
use vault_flow::*;

#[test]
fn test_reads_resolve_after_latency() {
    let h = Harness::seeded(always_succeed(), 1_200.0);
    let mut call = h.ledger.list_vaults();

    assert_eq!(call.ready_at(), h.now() + Duration::milliseconds(300));
    assert!(call.poll(h.now()).is_none());

    let vaults = h.read(call);
    assert_eq!(vaults.len(), 5);
    assert_eq!(vaults[0].id, "stable-usdc");
    assert_eq!(vaults[0].performance.daily.len(), 30);
}

#[test]
fn test_get_vault() {
    let h = Harness::new(always_succeed(), 1_200.0);
    let vault = h.read(h.ledger.get_vault("degen-lp")).unwrap();
    assert_eq!(vault.risk, RiskTier::High);
    assert_eq!(vault.category, VaultCategory::Degen);

    let err = h.read(h.ledger.get_vault("nope")).unwrap_err();
    assert_flow_error(&err, FlowError::VaultNotFound);
}

#[test]
fn test_seeded_book() {
    let h = Harness::seeded(always_succeed(), 1_200.0);
    let now = h.now();
    let positions = h.positions();

    assert_eq!(positions.len(), 3);
    let withdrawable: Vec<&str> = positions
        .iter()
        .filter(|p| p.is_withdrawable(now))
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(withdrawable, vec!["pos_stable-usdc"]);
    for p in &positions {
        assert!(p.profit > 0.0);
        assert_eq!(p.current_value(), p.principal + p.profit);
    }

    // Newest first
    let history = h.transactions();
    let ids: Vec<&str> = history.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["tx_seed_004", "tx_seed_003", "tx_seed_002", "tx_seed_001"]);
    assert_eq!(history[1].status, TransactionStatus::Failed);
    assert_eq!(history[1].vault_id, "growth-basis");

    let summary = PortfolioSummary::from_positions(&positions, h.now());
    assert_eq!(summary.positions, 3);
    assert_eq!(summary.withdrawable, 1);
    assert!((summary.total_principal - 8_250.0).abs() < 1e-9);
    assert_eq!(
        summary.next_unlock,
        positions.iter().find(|p| p.id == "pos_degen-lp").map(|p| p.unlock_at)
    );
}

#[test]
fn test_commit_latency_within_bounds() {
    let h = Harness::new(always_succeed(), 10_000.0);
    for _ in 0..20 {
        let call = h.ledger.deposit("stable-usdc", 100.0, 7);
        let latency = (call.ready_at() - h.now()).num_milliseconds();
        assert!((1_500..=2_000).contains(&latency), "latency {latency}");
    }
    // Unpolled calls never settle
    assert_eq!(h.ledger.transaction_count(), 0);
}

#[test]
fn test_deposit_settles_on_poll() {
    let h = Harness::new(always_succeed(), 1_200.0);
    let mut call = h.ledger.deposit("growth-eth", 500.0, 90);

    assert!(call.poll(h.now()).is_none());
    assert!((h.balance() - 1_200.0).abs() < 1e-9);

    h.wait_for_commit();
    let receipt = call.poll(h.now()).unwrap().unwrap();
    assert!(receipt.success);
    assert!(receipt.tx_id.starts_with("tx_"));
    assert_eq!(receipt.tx_id.len(), 19);
    assert!(call.is_consumed());

    let position = h.ledger.position("pos_growth-eth").unwrap();
    assert!((position.effective_apr - 14.5).abs() < 1e-9);
    assert_eq!(position.unlock_at, h.now() + Duration::days(90));
    assert!((h.balance() - 700.0).abs() < 1e-9);

    let history = h.transactions();
    assert_eq!(history[0].id, receipt.tx_id);
    assert_eq!(history[0].kind, TransactionKind::Deposit);
    assert_eq!(history[0].status, TransactionStatus::Completed);
}

#[test]
fn test_deposit_tops_up_existing_position() {
    let h = Harness::seeded(always_succeed(), 1_200.0);
    let before = h.ledger.position("pos_degen-lp").unwrap();

    let mut call = h.ledger.deposit("degen-lp", 100.0, 7);
    h.wait_for_commit();
    assert!(call.poll(h.now()).unwrap().unwrap().success);

    let after = h.ledger.position("pos_degen-lp").unwrap();
    assert!((after.principal - 850.0).abs() < 1e-9);
    assert_eq!(after.effective_apr, before.effective_apr);
    assert_eq!(after.lockup_days, 17);
    assert!(after.unlock_at > before.unlock_at);
    assert_eq!(after.unlock_at, h.now() + Duration::days(7));
    assert_eq!(h.positions().len(), 3);
}

#[test]
fn test_failed_deposit_only_records_attempt() {
    let h = Harness::new(always_fail(), 1_200.0);
    let mut call = h.ledger.deposit("growth-eth", 500.0, 30);
    h.wait_for_commit();

    let receipt = call.poll(h.now()).unwrap().unwrap();
    assert!(!receipt.success);
    assert!((h.balance() - 1_200.0).abs() < 1e-9);
    assert!(h.ledger.position("pos_growth-eth").is_none());

    let history = h.transactions();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, receipt.tx_id);
    assert_eq!(history[0].status, TransactionStatus::Failed);
}

#[test]
fn test_deposit_rejections() {
    let h = Harness::new(always_succeed(), 1_200.0);
    let cases = [
        ("missing", 100.0, 30, FlowError::VaultNotFound),
        ("growth-eth", 100.0, 45, FlowError::UnknownLockupPeriod),
        ("growth-eth", -5.0, 30, FlowError::InvalidAmount),
        ("growth-eth", 5_000.0, 30, FlowError::InsufficientBalance),
    ];
    for (vault_id, amount, days, expected) in cases {
        let mut call = h.ledger.deposit(vault_id, amount, days);
        h.wait_for_commit();
        let err = call.poll(h.now()).unwrap().unwrap_err();
        assert_flow_error(&err, expected);
    }
    assert!((h.balance() - 1_200.0).abs() < 1e-9);
    assert!(h.positions().is_empty());

    // Only attempts against a known vault are recorded
    let history = h.transactions();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|t| t.status == TransactionStatus::Failed));
    assert_eq!(history[0].amount, 5_000.0);
    assert_eq!(history[1].amount, 100.0);
}

#[test]
fn test_withdraw_rejections() {
    let h = Harness::seeded(always_succeed(), 1_200.0);
    let cases = [
        ("pos_missing", 10.0, FlowError::PositionNotFound),
        ("pos_growth-eth", 10.0, FlowError::PositionLocked),
        ("pos_stable-usdc", 1_000_000.0, FlowError::InsufficientBalance),
    ];
    for (position_id, amount, expected) in cases {
        let mut call = h.ledger.withdraw(position_id, amount);
        h.wait_for_commit();
        let err = call.poll(h.now()).unwrap().unwrap_err();
        assert_flow_error(&err, expected);
    }
    assert!((h.balance() - 1_200.0).abs() < 1e-9);

    let history = h.transactions();
    assert_eq!(history.len(), 6);
    assert_eq!(history[0].status, TransactionStatus::Failed);
    assert_eq!(history[0].kind, TransactionKind::Withdraw);
    assert_eq!(history[0].vault_id, "stable-usdc");
    assert_eq!(history[1].status, TransactionStatus::Failed);
    assert_eq!(history[1].vault_id, "growth-eth");

    // Rejections leave the positions untouched
    let stable = h.ledger.position("pos_stable-usdc").unwrap();
    assert!(stable.principal > 0.0);
    assert_eq!(h.positions().len(), 3);
}

#[test]
fn test_default_success_rate() {
    let h = Harness::new(FlowConfig::default(), 10_000.0);
    let attempts = 1_000;
    let mut succeeded = 0;
    for _ in 0..attempts {
        let mut call = h.ledger.deposit("stable-usdc", 1.0, 7);
        h.wait_for_commit();
        if call.poll(h.now()).unwrap().unwrap().success {
            succeeded += 1;
        }
    }

    assert!(succeeded > 0 && succeeded < attempts);
    let rate = succeeded as f64 / attempts as f64;
    assert!((0.92..=0.98).contains(&rate), "success rate {rate}");
    assert_eq!(h.ledger.transaction_count(), attempts);
    assert!((h.balance() - (10_000.0 - succeeded as f64)).abs() < 1e-6);
}

#[test]
fn test_tx_ids_are_unique() {
    let h = Harness::new(always_succeed(), 10_000.0);
    let mut ids = Vec::new();
    for _ in 0..3 {
        let mut call = h.ledger.deposit("stable-usdc", 100.0, 30);
        h.wait_for_commit();
        ids.push(call.poll(h.now()).unwrap().unwrap().tx_id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_invalid_config_rejected() {
    let wallet = std::rc::Rc::new(MockWallet::connected(100.0));
    let clock = std::rc::Rc::new(vault_flow::runtime::ManualClock::new(t0()));
    let random = std::rc::Rc::new(vault_flow::runtime::FixedRandom(0.5));
    let config = FlowConfig::default().with_success_rate(1.5);

    let err = MockLedger::new(config, VaultCatalog::default(), wallet, clock, random)
        .err()
        .unwrap();
    assert_flow_error(&err, FlowError::InvalidSuccessRate);
}
