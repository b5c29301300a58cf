//! Deposit workflow.
//!
//! `Details -> Review -> Processing -> Success`, with a simulated failure
//! returning `Processing -> Details`. The workflow can be closed from any
//! stage; closing drops the in-flight ledger call and every pending timer,
//! so nothing is committed and no later update touches the dismissed flow.

use anchor_lang::prelude::*;

use crate::error::FlowError;
use crate::events::{DepositSucceeded, DomainEvent};
use crate::format::{format_currency, format_date};
use crate::ledger::{LedgerCall, LedgerReceipt};
use crate::projection::{self, Projection};
use crate::runtime::{after_ms, TaskScheduler};
use crate::state::Vault;
use crate::validation;
use crate::workflow::{FlowContext, FlowTimer, Notification, NotificationVariant, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositStage {
    Details,
    Review,
    Processing,
    Success,
}

pub struct DepositWorkflow {
    ctx: FlowContext,
    vault: Vault,

    amount_input: String,
    amount: Option<f64>,
    selected_lockup_days: Option<u32>,

    stage: DepositStage,
    validation_error: Option<FlowError>,

    in_flight: Option<LedgerCall<Result<LedgerReceipt>>>,
    timers: TaskScheduler<FlowTimer>,
    celebrating: bool,
    celebrations: u32,
    receipt: Option<LedgerReceipt>,
    closed: bool,
}

impl DepositWorkflow {
    pub fn open(ctx: FlowContext, vault: Vault) -> Self {
        msg!("Deposit flow opened for {}", vault.id);
        Self {
            ctx,
            vault,
            amount_input: String::new(),
            amount: None,
            selected_lockup_days: None,
            stage: DepositStage::Details,
            validation_error: None,
            in_flight: None,
            timers: TaskScheduler::new(),
            celebrating: false,
            celebrations: 0,
            receipt: None,
            closed: false,
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn stage(&self) -> DepositStage {
        self.stage
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

    pub fn selected_lockup_days(&self) -> Option<u32> {
        self.selected_lockup_days
    }

    /// Inline error from the last edit or blocked transition.
    pub fn validation_error(&self) -> Option<FlowError> {
        self.validation_error
    }

    pub fn receipt(&self) -> Option<&LedgerReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    /// How many times the celebration has started.
    pub fn celebrations(&self) -> u32 {
        self.celebrations
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn available_balance(&self) -> f64 {
        self.ctx.wallet.balance().primary
    }

    fn ensure_editable(&self) -> Result<()> {
        require!(!self.closed, FlowError::WorkflowClosed);
        require!(self.stage == DepositStage::Details, FlowError::InvalidStage);
        Ok(())
    }

    /// Text input change. Re-validates immediately.
    pub fn set_amount(&mut self, input: &str) -> Result<()> {
        self.ensure_editable()?;
        self.amount_input = input.to_string();
        self.amount = validation::parse_amount(input);
        self.validation_error = self.validate().err();
        Ok(())
    }

    /// Slider change: `percent` of the wallet balance, rounded down to cents.
    pub fn set_amount_percent(&mut self, percent: f64) -> Result<()> {
        let percent = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        let amount = (self.available_balance() * percent).floor() / 100.0;
        self.set_amount(&format!("{amount:.2}"))
    }

    pub fn set_max(&mut self) -> Result<()> {
        self.set_amount_percent(100.0)
    }

    pub fn select_lockup(&mut self, days: u32) -> Result<()> {
        self.ensure_editable()?;
        require!(self.vault.lockup(days).is_some(), FlowError::UnknownLockupPeriod);
        self.selected_lockup_days = Some(days);
        if self.validation_error == Some(FlowError::NoLockupSelected) {
            self.validation_error = None;
        }
        Ok(())
    }

    /// Amount rules against the current wallet balance.
    pub fn validate(&self) -> std::result::Result<f64, FlowError> {
        validation::validate_deposit(
            &self.amount_input,
            self.available_balance(),
            self.ctx.config.min_deposit,
        )
    }

    fn check_details(&self) -> std::result::Result<(f64, u32), FlowError> {
        if !self.ctx.wallet.is_connected() {
            return Err(FlowError::WalletNotConnected);
        }
        let amount = self.validate()?;
        let days = self.selected_lockup_days.ok_or(FlowError::NoLockupSelected)?;
        Ok((amount, days))
    }

    /// Whether the continue action is enabled.
    pub fn can_continue(&self) -> bool {
        !self.closed && self.stage == DepositStage::Details && self.check_details().is_ok()
    }

    /// Whether the confirm action is enabled. False while a call is in flight.
    pub fn can_submit(&self) -> bool {
        !self.closed && self.stage == DepositStage::Review && self.in_flight.is_none()
    }

    /// Figures for the current amount and lockup, or `None` before a lockup is chosen.
    pub fn projection(&self) -> Option<Projection> {
        let lockup = self.vault.lockup(self.selected_lockup_days?)?;
        let amount = self.amount.unwrap_or(f64::NAN);
        Some(projection::project(
            amount,
            self.vault.base_apr,
            lockup,
            self.ctx.clock.now(),
        ))
    }

    /// Moves to the next stage.
    ///
    /// # Errors
    /// - Details: the validation error (stage unchanged)
    /// - Processing: `SubmissionInFlight`
    /// - Success: `InvalidStage`
    pub fn advance(&mut self) -> Result<DepositStage> {
        require!(!self.closed, FlowError::WorkflowClosed);

        match self.stage {
            DepositStage::Details => {
                if let Err(e) = self.check_details() {
                    msg!("Deposit into {} blocked: {}", self.vault.id, e);
                    self.validation_error = Some(e);
                    return Err(e.into());
                }
                self.validation_error = None;
                self.stage = DepositStage::Review;
            }
            DepositStage::Review => {
                let amount = self.amount.ok_or(FlowError::InvalidStage)?;
                let days = self.selected_lockup_days.ok_or(FlowError::InvalidStage)?;
                self.in_flight = Some(self.ctx.ledger.deposit(&self.vault.id, amount, days));
                self.stage = DepositStage::Processing;
            }
            DepositStage::Processing => return Err(FlowError::SubmissionInFlight.into()),
            DepositStage::Success => return Err(FlowError::InvalidStage.into()),
        }

        msg!("Deposit flow for {} -> {:?}", self.vault.id, self.stage);
        Ok(self.stage)
    }

    pub fn back(&mut self) -> Result<DepositStage> {
        require!(!self.closed, FlowError::WorkflowClosed);
        require!(self.stage == DepositStage::Review, FlowError::InvalidStage);
        self.stage = DepositStage::Details;
        Ok(self.stage)
    }

    /// Fires due timers and resolves the in-flight call if its latency has elapsed.
    pub fn tick(&mut self) -> DepositStage {
        if self.closed {
            return self.stage;
        }
        let now = self.ctx.clock.now();

        for timer in self.timers.due(now) {
            match timer {
                FlowTimer::CelebrationEnded => self.celebrating = false,
            }
        }

        if let Some(outcome) = self.in_flight.as_mut().and_then(|call| call.poll(now)) {
            self.in_flight = None;
            match outcome {
                Ok(receipt) if receipt.success => self.succeed(receipt),
                Ok(receipt) => self.fail(&format!("not confirmed ({})", receipt.tx_id)),
                Err(err) => self.fail(&err.to_string()),
            }
        }
        self.stage
    }

    fn succeed(&mut self, receipt: LedgerReceipt) {
        let amount = self.amount.unwrap_or_default();
        self.stage = DepositStage::Success;
        msg!("Deposit into {} confirmed: {}", self.vault.id, receipt.tx_id);
        self.receipt = Some(receipt);

        self.start_celebration();

        let unlock = self
            .projection()
            .map(|p| format!(", unlocks {}", format_date(p.unlock_date)))
            .unwrap_or_default();
        self.ctx.notifier.notify(Notification {
            title: "Deposit successful".to_string(),
            description: format!(
                "{} deposited into {}{}",
                format_currency(amount),
                self.vault.name,
                unlock
            ),
            variant: NotificationVariant::Success,
        });

        self.ctx
            .events
            .publish(DomainEvent::DepositSucceeded(DepositSucceeded {
                amount,
                vault_id: self.vault.id.clone(),
            }));
    }

    fn fail(&mut self, reason: &str) {
        msg!("Deposit into {} failed: {}", self.vault.id, reason);
        self.stage = DepositStage::Details;
        self.ctx.notifier.notify(Notification {
            title: "Deposit failed".to_string(),
            description: FlowError::SubmissionFailed.to_string(),
            variant: NotificationVariant::Destructive,
        });
    }

    fn start_celebration(&mut self) -> bool {
        if !self.ctx.config.supports_motion || self.celebrating {
            return false;
        }
        let ends_at = after_ms(self.ctx.clock.now(), self.ctx.config.celebration_ms);
        self.timers.schedule(ends_at, FlowTimer::CelebrationEnded);
        self.celebrating = true;
        self.celebrations += 1;
        true
    }

    /// Plays the celebration again once the previous one has finished.
    pub fn replay_celebration(&mut self) -> bool {
        if self.closed || self.stage != DepositStage::Success {
            return false;
        }
        self.start_celebration()
    }

    /// Requests the portfolio view and dismisses the flow.
    pub fn view_dashboard(&mut self) -> Result<()> {
        require!(!self.closed, FlowError::WorkflowClosed);
        require!(self.stage == DepositStage::Success, FlowError::InvalidStage);
        self.ctx.navigator.navigate(Route::Portfolio);
        self.close();
        Ok(())
    }

    /// Dismisses the flow from any stage without committing anything.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.celebrating = false;
        let dropped_call = self.in_flight.take().is_some();
        let cancelled = self.timers.cancel_all();
        msg!(
            "Deposit flow for {} closed at {:?} (dropped call: {}, cancelled timers: {})",
            self.vault.id,
            self.stage,
            dropped_call,
            cancelled
        );
    }
}

impl Drop for DepositWorkflow {
    fn drop(&mut self) {
        self.close();
    }
}
