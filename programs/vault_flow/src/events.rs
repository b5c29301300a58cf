//! Domain events published by the workflows.

use std::cell::RefCell;

use anchor_lang::prelude::*;

/// Emitted once when a deposit reaches the success stage.
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct DepositSucceeded {
    pub amount: f64,
    pub vault_id: String,
}

/// Emitted once when a withdrawal reaches the success stage.
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct WithdrawSucceeded {
    pub amount: f64,
    pub position_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    DepositSucceeded(DepositSucceeded),
    WithdrawSucceeded(WithdrawSucceeded),
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::DepositSucceeded(_) => "deposit-success",
            DomainEvent::WithdrawSucceeded(_) => "withdraw-success",
        }
    }
}

/// Returns false once it no longer wants events.
type Subscriber = Box<dyn Fn(&DomainEvent) -> bool>;

/// In-process publish/subscribe for [`DomainEvent`]s.
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&DomainEvent) + 'static) {
        self.subscribe_while(move |event| {
            subscriber(event);
            true
        });
    }

    /// Subscribes until `subscriber` returns false; it is then removed.
    pub fn subscribe_while(&self, subscriber: impl Fn(&DomainEvent) -> bool + 'static) {
        self.subscribers.borrow_mut().push(Box::new(subscriber));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Delivers `event` to every subscriber and drops the ones that opted out.
    /// Subscribers must not touch the bus from inside a delivery.
    pub fn publish(&self, event: DomainEvent) {
        msg!("Event {}: {:?}", event.name(), event);
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber(&event));
        if subscribers.len() != before {
            msg!("Dropped {} stale subscribers", before - subscribers.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = seen.clone();
            bus.subscribe(move |e| seen.borrow_mut().push((tag, e.name())));
        }

        bus.publish(DomainEvent::DepositSucceeded(DepositSucceeded {
            amount: 100.0,
            vault_id: "stable-usdc".to_string(),
        }));

        assert_eq!(
            *seen.borrow(),
            vec![("a", "deposit-success"), ("b", "deposit-success")]
        );
    }

    #[test]
    fn test_subscribe_while_unsubscribes() {
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        bus.subscribe_while(move |_| {
            *counter.borrow_mut() += 1;
            *counter.borrow() < 2
        });
        bus.subscribe(|_| {});

        let event = DomainEvent::WithdrawSucceeded(WithdrawSucceeded {
            amount: 5.0,
            position_id: "pos_stable-usdc".to_string(),
        });
        bus.publish(event.clone());
        assert_eq!(bus.subscriber_count(), 2);
        bus.publish(event.clone());
        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(event);
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn test_event_encodes_with_discriminator() {
        let event = DepositSucceeded {
            amount: 250.0,
            vault_id: "growth-eth".to_string(),
        };
        let data = anchor_lang::Event::data(&event);
        assert!(data.len() > 8);
    }
}
