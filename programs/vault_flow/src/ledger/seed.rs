//! Canned positions and history for the mock ledger.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::VaultCatalog;
use crate::projection;
use crate::state::{TransactionKind, TransactionRecord, TransactionStatus, UserInvestment};

/// (vault id, principal, lockup days, days since deposit)
const SEED_POSITIONS: &[(&str, f64, u32, i64)] = &[
    ("stable-usdc", 5_000.0, 30, 45),
    ("growth-eth", 2_500.0, 90, 20),
    ("degen-lp", 750.0, 14, 10),
];

/// (vault id, amount, days ago)
const SEED_FAILED_DEPOSITS: &[(&str, f64, i64)] = &[("growth-basis", 1_200.0, 12)];

/// Positions accrued up to `now`. Entries whose vault or lockup is missing are skipped.
pub fn positions(catalog: &VaultCatalog, now: DateTime<Utc>) -> Vec<UserInvestment> {
    SEED_POSITIONS
        .iter()
        .filter_map(|&(vault_id, principal, days, age)| {
            let vault = catalog.get(vault_id)?;
            let apr = vault.effective_apr(days)?;
            let deposited_at = now - Duration::days(age);
            let mut position = UserInvestment {
                id: UserInvestment::position_id(vault_id),
                vault_id: vault.id.clone(),
                vault_name: vault.name.clone(),
                principal,
                profit: 0.0,
                effective_apr: apr,
                lockup_days: days,
                deposited_at,
                unlock_at: projection::unlock_date(deposited_at, days),
                last_accrual_at: deposited_at,
            };
            position.accrue(now);
            Some(position)
        })
        .collect()
}

/// History matching the seeded positions, oldest first.
pub fn transactions(
    catalog: &VaultCatalog,
    positions: &[UserInvestment],
    now: DateTime<Utc>,
) -> Vec<TransactionRecord> {
    let deposits = positions.iter().map(|p| TransactionRecord {
        id: String::new(),
        kind: TransactionKind::Deposit,
        amount: p.principal,
        vault_id: p.vault_id.clone(),
        vault_name: p.vault_name.clone(),
        timestamp: p.deposited_at,
        status: TransactionStatus::Completed,
    });

    let failed = SEED_FAILED_DEPOSITS
        .iter()
        .filter_map(|&(vault_id, amount, age)| {
            let vault = catalog.get(vault_id)?;
            Some(TransactionRecord {
                id: String::new(),
                kind: TransactionKind::Deposit,
                amount,
                vault_id: vault.id.clone(),
                vault_name: vault.name.clone(),
                timestamp: now - Duration::days(age),
                status: TransactionStatus::Failed,
            })
        });

    let mut history: Vec<TransactionRecord> = deposits.chain(failed).collect();
    history.sort_by_key(|t| t.timestamp);
    for (i, tx) in history.iter_mut().enumerate() {
        tx.id = format!("tx_seed_{:03}", i + 1);
    }
    history
}
