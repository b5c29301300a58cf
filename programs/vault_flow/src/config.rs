//! Runtime configuration for the workflows and the simulated ledger.

use anchor_lang::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::FlowError;

/// Tunables for one application session. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Smallest deposit accepted by every deposit flow. Zero disables the rule.
    pub min_deposit: f64,
    /// Probability that a simulated commit succeeds.
    pub success_rate: f64,
    pub commit_latency_min_ms: u64,
    pub commit_latency_max_ms: u64,
    pub read_latency_ms: u64,
    pub celebration_ms: u64,
    pub highlight_ms: u64,
    /// False when the platform asks for reduced motion.
    pub supports_motion: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_deposit: DEFAULT_MIN_DEPOSIT,
            success_rate: DEFAULT_SUCCESS_RATE,
            commit_latency_min_ms: DEFAULT_COMMIT_LATENCY_MIN_MS,
            commit_latency_max_ms: DEFAULT_COMMIT_LATENCY_MAX_MS,
            read_latency_ms: DEFAULT_READ_LATENCY_MS,
            celebration_ms: DEFAULT_CELEBRATION_MS,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
            supports_motion: true,
        }
    }
}

impl FlowConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            msg!("Config rejected: {}", e);
            error!(FlowError::InvalidConfig)
        })?;
        config.validate()?;

        msg!(
            "Config loaded - min deposit: {}, success rate: {}, commit latency: {}-{}ms",
            config.min_deposit,
            config.success_rate,
            config.commit_latency_min_ms,
            config.commit_latency_max_ms
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.success_rate.is_finite() && (0.0..=1.0).contains(&self.success_rate),
            FlowError::InvalidSuccessRate
        );

        require!(self.commit_latency_min_ms > 0, FlowError::InvalidLatency);
        require!(
            self.commit_latency_min_ms <= self.commit_latency_max_ms,
            FlowError::InvalidLatency
        );
        require!(self.commit_latency_max_ms <= MAX_LATENCY_MS, FlowError::InvalidLatency);
        require!(
            self.read_latency_ms > 0 && self.read_latency_ms <= MAX_LATENCY_MS,
            FlowError::InvalidLatency
        );

        require!(
            self.min_deposit.is_finite() && self.min_deposit >= 0.0,
            FlowError::InvalidMinimumDeposit
        );

        require!(
            (1..=MAX_EFFECT_MS).contains(&self.celebration_ms),
            FlowError::InvalidEffectDuration
        );
        require!(
            (1..=MAX_EFFECT_MS).contains(&self.highlight_ms),
            FlowError::InvalidEffectDuration
        );

        Ok(())
    }

    /// Same config with a fixed commit outcome.
    pub fn with_success_rate(mut self, success_rate: f64) -> Self {
        self.success_rate = success_rate;
        self
    }

    pub fn with_motion(mut self, supports_motion: bool) -> Self {
        self.supports_motion = supports_motion;
        self
    }

    pub fn with_min_deposit(mut self, min_deposit: f64) -> Self {
        self.min_deposit = min_deposit;
        self
    }
}
