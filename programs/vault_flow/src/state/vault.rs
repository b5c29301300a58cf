use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_LOCKUP_DAYS;
use crate::projection;

/// Branding/risk family a vault is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultCategory {
    Stable,
    Growth,
    Degen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// A selectable lockup: `days` until withdrawable, plus an additive APR boost in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockupPeriod {
    pub days: u32,
    pub apr_boost: f64,
}

impl LockupPeriod {
    pub fn is_valid(&self) -> bool {
        self.days > 0
            && self.days <= MAX_LOCKUP_DAYS
            && self.apr_boost.is_finite()
            && self.apr_boost >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub timestamp: DateTime<Utc>,
    pub apy: f64,
    pub tvl: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
    pub daily: Vec<PerformancePoint>,
    pub weekly: Vec<PerformancePoint>,
    pub monthly: Vec<PerformancePoint>,
}

/// A yield vault as listed in the catalog. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub category: VaultCategory,
    pub tvl: f64,
    /// Percent, e.g. 12.5 for 12.5%.
    pub base_apr: f64,
    pub apy: f64,
    pub description: String,
    pub strategy: String,
    pub risk: RiskTier,
    pub lockup_periods: Vec<LockupPeriod>,
    #[serde(default)]
    pub performance: PerformanceSeries,
}

impl Vault {
    pub fn lockup(&self, days: u32) -> Option<&LockupPeriod> {
        self.lockup_periods.iter().find(|p| p.days == days)
    }

    /// Base APR plus the boost of the lockup with `days`, if offered.
    pub fn effective_apr(&self, days: u32) -> Option<f64> {
        self.lockup(days)
            .map(|p| projection::effective_apr(self.base_apr, p.apr_boost))
    }

    /// Highest APR reachable through any lockup.
    pub fn max_apr(&self) -> f64 {
        self.lockup_periods
            .iter()
            .map(|p| projection::effective_apr(self.base_apr, p.apr_boost))
            .fold(self.base_apr, f64::max)
    }
}
