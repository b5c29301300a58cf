//! Deposit and withdraw workflows.
//!
//! Both are explicit state machines driven by user actions (`set_amount`,
//! `advance`, `close`, ...) and by `tick`, which polls the in-flight ledger
//! call and fires due timers against the injected clock.

pub mod deposit;
pub mod effects;
pub mod withdraw;

pub use deposit::*;
pub use effects::*;
pub use withdraw::*;

use std::rc::Rc;

use crate::config::FlowConfig;
use crate::events::EventBus;
use crate::ledger::Ledger;
use crate::runtime::Clock;
use crate::wallet::WalletClient;

/// Collaborators handed to every workflow instance.
#[derive(Clone)]
pub struct FlowContext {
    pub config: FlowConfig,
    pub clock: Rc<dyn Clock>,
    pub wallet: Rc<dyn WalletClient>,
    pub ledger: Rc<dyn Ledger>,
    pub notifier: Rc<dyn NotificationSink>,
    pub navigator: Rc<dyn Navigator>,
    pub events: Rc<EventBus>,
}

/// Timers a workflow may have pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowTimer {
    CelebrationEnded,
}
