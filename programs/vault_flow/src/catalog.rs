//! Read-only vault catalog.
//!
//! The mock catalog ships as embedded JSON. Performance history is not
//! stored; it is generated from a [`RandomSource`] as a bounded random walk
//! around each vault's APY so the charts have something to draw.

use std::cmp::Ordering;

use anchor_lang::prelude::*;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

use crate::constants::series::*;
use crate::error::FlowError;
use crate::runtime::RandomSource;
use crate::state::{PerformancePoint, PerformanceSeries, RiskTier, Vault, VaultCategory};

const MOCK_VAULTS: &str = include_str!("../data/vaults.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Highest APY first.
    Apy,
    /// Largest TVL first.
    Tvl,
    Name,
}

#[derive(Debug, Clone, Default)]
pub struct VaultCatalog {
    vaults: IndexMap<String, Vault>,
}

impl VaultCatalog {
    /// Parses and checks a list of vaults. Ids must be unique and every lockup valid.
    pub fn from_json(json: &str) -> Result<Self> {
        let list: Vec<Vault> = serde_json::from_str(json).map_err(|e| {
            msg!("Vault catalog rejected: {}", e);
            error!(FlowError::InvalidConfig)
        })?;

        let mut vaults = IndexMap::with_capacity(list.len());
        for vault in list {
            require!(!vault.lockup_periods.is_empty(), FlowError::UnknownLockupPeriod);
            require!(
                vault.lockup_periods.iter().all(|p| p.is_valid()),
                FlowError::UnknownLockupPeriod
            );
            require!(vault.base_apr.is_finite() && vault.tvl.is_finite(), FlowError::InvalidConfig);
            let id = vault.id.clone();
            require!(vaults.insert(id, vault).is_none(), FlowError::InvalidConfig);
        }
        Ok(Self { vaults })
    }

    /// The bundled mock catalog with generated performance history ending at `now`.
    pub fn mock(random: &dyn RandomSource, now: DateTime<Utc>) -> Result<Self> {
        let mut catalog = Self::from_json(MOCK_VAULTS)?;
        for vault in catalog.vaults.values_mut() {
            vault.performance = generate_performance(vault.apy, vault.tvl, now, random);
        }
        msg!("Loaded {} mock vaults", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Vault> {
        self.vaults.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vault> {
        self.vaults.values()
    }

    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }

    pub fn by_category(&self, category: VaultCategory) -> Vec<&Vault> {
        self.iter().filter(|v| v.category == category).collect()
    }

    pub fn by_risk(&self, risk: RiskTier) -> Vec<&Vault> {
        self.iter().filter(|v| v.risk == risk).collect()
    }

    pub fn sorted(&self, key: SortKey) -> Vec<&Vault> {
        let mut list: Vec<&Vault> = self.iter().collect();
        match key {
            SortKey::Apy => list.sort_by(|a, b| b.apy.partial_cmp(&a.apy).unwrap_or(Ordering::Equal)),
            SortKey::Tvl => list.sort_by(|a, b| b.tvl.partial_cmp(&a.tvl).unwrap_or(Ordering::Equal)),
            SortKey::Name => list.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        list
    }

    pub fn total_tvl(&self) -> f64 {
        self.iter().map(|v| v.tvl).sum()
    }
}

fn walk(
    apy: f64,
    tvl: f64,
    now: DateTime<Utc>,
    step: Duration,
    points: usize,
    random: &dyn RandomSource,
) -> Vec<PerformancePoint> {
    let mut out = Vec::with_capacity(points);
    let (mut apy_level, mut tvl_level) = (apy, tvl);
    // walk backwards from today so the newest point equals the listed figures
    for i in 0..points {
        out.push(PerformancePoint {
            timestamp: now - step * i as i32,
            apy: apy_level,
            tvl: tvl_level,
        });
        let drift = (random.next_f64() * 2.0 - 1.0) * MAX_STEP_DRIFT;
        apy_level = (apy_level * (1.0 + drift)).max(0.0);
        tvl_level = (tvl_level * (1.0 - drift / 2.0)).max(0.0);
    }
    out.reverse();
    out
}

pub fn generate_performance(
    apy: f64,
    tvl: f64,
    now: DateTime<Utc>,
    random: &dyn RandomSource,
) -> PerformanceSeries {
    PerformanceSeries {
        daily: walk(apy, tvl, now, Duration::days(1), DAILY_POINTS, random),
        weekly: walk(apy, tvl, now, Duration::weeks(1), WEEKLY_POINTS, random),
        monthly: walk(apy, tvl, now, Duration::days(30), MONTHLY_POINTS, random),
    }
}
