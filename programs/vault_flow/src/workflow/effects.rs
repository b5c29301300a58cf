//! Outbound effects of the workflows: notifications, navigation requests,
//! and the transient highlight driven by `deposit-success`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::events::{DomainEvent, EventBus};
use crate::runtime::{after_ms, Clock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Default,
    Success,
    Destructive,
}

/// A toast: `{title, description, variant}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Sink that keeps every notification, for tests and headless use.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: RefCell<Vec<Notification>>,
}

impl NotificationLog {
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, variant: NotificationVariant) -> usize {
        self.entries.borrow().iter().filter(|n| n.variant == variant).count()
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.borrow_mut().push(notification);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Catalog,
    Vault(String),
    Portfolio,
}

pub trait Navigator {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Default)]
pub struct NavigationLog {
    routes: RefCell<Vec<Route>>,
}

impl NavigationLog {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.borrow().clone()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, route: Route) {
        self.routes.borrow_mut().push(route);
    }
}

/// Tracks which vaults were just funded, for a short highlight on their position card.
pub struct HighlightTracker {
    clock: Rc<dyn Clock>,
    highlight_ms: u64,
    until: RefCell<IndexMap<String, DateTime<Utc>>>,
}

impl HighlightTracker {
    /// Creates a tracker and subscribes it to `bus`. The subscription ends
    /// with the first event delivered after the tracker is dropped.
    pub fn attach(bus: &EventBus, clock: Rc<dyn Clock>, highlight_ms: u64) -> Rc<Self> {
        let tracker = Rc::new(Self {
            clock,
            highlight_ms,
            until: RefCell::new(IndexMap::new()),
        });
        let weak: Weak<Self> = Rc::downgrade(&tracker);
        bus.subscribe_while(move |event| {
            let Some(tracker) = weak.upgrade() else {
                return false;
            };
            if let DomainEvent::DepositSucceeded(e) = event {
                tracker.highlight(&e.vault_id);
            }
            true
        });
        tracker
    }

    fn highlight(&self, vault_id: &str) {
        let until = after_ms(self.clock.now(), self.highlight_ms);
        self.until.borrow_mut().insert(vault_id.to_string(), until);
    }

    pub fn is_highlighted(&self, vault_id: &str) -> bool {
        let now = self.clock.now();
        self.until
            .borrow()
            .get(vault_id)
            .map_or(false, |until| now < *until)
    }

    /// Vault ids still highlighted; expired entries are pruned.
    pub fn active(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut until = self.until.borrow_mut();
        until.retain(|_, t| now < *t);
        until.keys().cloned().collect()
    }
}
