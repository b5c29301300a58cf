//! Withdraw workflow: `Amount -> Confirming -> Success`.
//!
//! `Confirming` is the in-flight stage. A simulated failure returns to
//! `Amount` with the entered amount kept.

use anchor_lang::prelude::*;

use crate::error::FlowError;
use crate::events::{DomainEvent, WithdrawSucceeded};
use crate::format::format_currency;
use crate::ledger::{LedgerCall, LedgerReceipt};
use crate::state::UserInvestment;
use crate::validation;
use crate::workflow::{FlowContext, Notification, NotificationVariant, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawStage {
    Amount,
    Confirming,
    Success,
}

pub struct WithdrawWorkflow {
    ctx: FlowContext,
    position: UserInvestment,

    amount_input: String,
    amount: Option<f64>,

    stage: WithdrawStage,
    validation_error: Option<FlowError>,

    in_flight: Option<LedgerCall<Result<LedgerReceipt>>>,
    receipt: Option<LedgerReceipt>,
    closed: bool,
}

impl WithdrawWorkflow {
    /// Opens the flow on a snapshot of `position`, accrued to now.
    pub fn open(ctx: FlowContext, mut position: UserInvestment) -> Self {
        position.accrue(ctx.clock.now());
        msg!(
            "Withdraw flow opened for {} (value {})",
            position.id,
            position.current_value()
        );
        Self {
            ctx,
            position,
            amount_input: String::new(),
            amount: None,
            stage: WithdrawStage::Amount,
            validation_error: None,
            in_flight: None,
            receipt: None,
            closed: false,
        }
    }

    pub fn position(&self) -> &UserInvestment {
        &self.position
    }

    pub fn stage(&self) -> WithdrawStage {
        self.stage
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount
    }

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

    pub fn available(&self) -> f64 {
        self.position.current_value()
    }

    pub fn set_amount(&mut self, input: &str) -> Result<()> {
        require!(!self.closed, FlowError::WorkflowClosed);
        require!(self.stage == WithdrawStage::Amount, FlowError::InvalidStage);
        self.amount_input = input.to_string();
        self.amount = validation::parse_amount(input);
        self.validation_error = self.validate().err();
        Ok(())
    }

    /// Fills the full position value, rounded down to cents.
    pub fn set_max(&mut self) -> Result<()> {
        let max = (self.available() * 100.0).floor() / 100.0;
        self.set_amount(&format!("{max:.2}"))
    }

    pub fn validate(&self) -> std::result::Result<f64, FlowError> {
        validation::validate_withdrawal(&self.amount_input, self.available())
    }

    fn check_amount(&self) -> std::result::Result<f64, FlowError> {
        if !self.ctx.wallet.is_connected() {
            return Err(FlowError::WalletNotConnected);
        }
        if !self.position.is_withdrawable(self.ctx.clock.now()) {
            return Err(FlowError::PositionLocked);
        }
        self.validate()
    }

    pub fn can_confirm(&self) -> bool {
        !self.closed && self.stage == WithdrawStage::Amount && self.check_amount().is_ok()
    }

    /// Submits from `Amount`. Blocked submissions leave the stage unchanged.
    pub fn advance(&mut self) -> Result<WithdrawStage> {
        require!(!self.closed, FlowError::WorkflowClosed);

        match self.stage {
            WithdrawStage::Amount => {
                let amount = match self.check_amount() {
                    Ok(amount) => amount,
                    Err(e) => {
                        msg!("Withdrawal from {} blocked: {}", self.position.id, e);
                        self.validation_error = Some(e);
                        return Err(e.into());
                    }
                };
                self.validation_error = None;
                self.in_flight = Some(self.ctx.ledger.withdraw(&self.position.id, amount));
                self.stage = WithdrawStage::Confirming;
            }
            WithdrawStage::Confirming => return Err(FlowError::SubmissionInFlight.into()),
            WithdrawStage::Success => return Err(FlowError::InvalidStage.into()),
        }

        msg!("Withdraw flow for {} -> {:?}", self.position.id, self.stage);
        Ok(self.stage)
    }

    pub fn tick(&mut self) -> WithdrawStage {
        if self.closed {
            return self.stage;
        }
        let now = self.ctx.clock.now();

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
        self.stage = WithdrawStage::Success;
        msg!("Withdrawal from {} confirmed: {}", self.position.id, receipt.tx_id);
        self.receipt = Some(receipt);

        self.ctx.notifier.notify(Notification {
            title: "Withdrawal successful".to_string(),
            description: format!(
                "{} withdrawn from {}",
                format_currency(amount),
                self.position.vault_name
            ),
            variant: NotificationVariant::Success,
        });

        self.ctx
            .events
            .publish(DomainEvent::WithdrawSucceeded(WithdrawSucceeded {
                amount,
                position_id: self.position.id.clone(),
            }));
    }

    fn fail(&mut self, reason: &str) {
        msg!("Withdrawal from {} failed: {}", self.position.id, reason);
        self.stage = WithdrawStage::Amount;
        self.ctx.notifier.notify(Notification {
            title: "Withdrawal failed".to_string(),
            description: FlowError::SubmissionFailed.to_string(),
            variant: NotificationVariant::Destructive,
        });
    }

    pub fn view_dashboard(&mut self) -> Result<()> {
        require!(!self.closed, FlowError::WorkflowClosed);
        require!(self.stage == WithdrawStage::Success, FlowError::InvalidStage);
        self.ctx.navigator.navigate(Route::Portfolio);
        self.close();
        Ok(())
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let dropped_call = self.in_flight.take().is_some();
        msg!(
            "Withdraw flow for {} closed at {:?} (dropped call: {})",
            self.position.id,
            self.stage,
            dropped_call
        );
    }
}

impl Drop for WithdrawWorkflow {
    fn drop(&mut self) {
        self.close();
    }
}
