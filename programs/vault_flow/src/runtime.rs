//! Clock, randomness, and timer primitives.
//!
//! Nothing in the engine sleeps. Time only moves through a [`Clock`], and
//! deferred work is either a [`TaskScheduler`] entry or a pending ledger call
//! that is polled against the clock.

use std::cell::{Cell, RefCell};

use chrono::{DateTime, Duration, Utc};

use crate::constants::MOCK_RANDOM_SEED;

/// `start` plus `ms` milliseconds, saturating at the latest representable instant.
pub fn after_ms(start: DateTime<Utc>, ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| start.checked_add_signed(Duration::milliseconds(ms)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.set(after_ms(self.now.get(), ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Uniform randomness in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&self) -> f64;

    /// Uniform integer in `[low, high]`.
    fn range_u64(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        let span = (high - low) as f64 + 1.0;
        (low + (self.next_f64() * span) as u64).min(high)
    }

    /// True with probability `p`.
    fn chance(&self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Seeded generator: blake3 keyed hash over an incrementing counter.
#[derive(Debug)]
pub struct HashRandom {
    key: [u8; 32],
    counter: Cell<u64>,
}

impl HashRandom {
    pub fn new(seed: &[u8]) -> Self {
        Self {
            key: *blake3::hash(seed).as_bytes(),
            counter: Cell::new(0),
        }
    }
}

impl Default for HashRandom {
    fn default() -> Self {
        Self::new(MOCK_RANDOM_SEED)
    }
}

impl RandomSource for HashRandom {
    fn next_f64(&self) -> f64 {
        let n = self.counter.get();
        self.counter.set(n.wrapping_add(1));

        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(&n.to_le_bytes());
        let digest = hasher.finalize();

        let mut word = [0u8; 8];
        word.copy_from_slice(&digest.as_bytes()[..8]);
        // top 53 bits -> exact f64 in [0, 1)
        (u64::from_le_bytes(word) >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}

/// Cycles through a fixed list of values.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    next: Cell<usize>,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: Cell::new(0) }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.next.get();
        self.next.set((i + 1) % self.values.len());
        self.values[i]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Cancellable one-shot timers. Tasks fire when drained with [`TaskScheduler::due`].
#[derive(Debug)]
pub struct TaskScheduler<T> {
    next_id: Cell<u64>,
    tasks: RefCell<Vec<(TaskHandle, DateTime<Utc>, T)>>,
}

impl<T> Default for TaskScheduler<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            tasks: RefCell::new(Vec::new()),
        }
    }
}

impl<T> TaskScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, at: DateTime<Utc>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id.get());
        self.next_id.set(handle.0 + 1);
        self.tasks.borrow_mut().push((handle, at, task));
        handle
    }

    pub fn cancel(&self, handle: TaskHandle) -> bool {
        let mut tasks = self.tasks.borrow_mut();
        let before = tasks.len();
        tasks.retain(|(h, _, _)| *h != handle);
        tasks.len() != before
    }

    /// Drops every pending task and returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut tasks = self.tasks.borrow_mut();
        let n = tasks.len();
        tasks.clear();
        n
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.borrow().iter().any(|(h, _, _)| *h == handle)
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Removes and returns tasks due at `now`, earliest first.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<T> {
        let mut tasks = self.tasks.borrow_mut();
        let (mut ready, waiting): (Vec<_>, Vec<_>) =
            tasks.drain(..).partition(|(_, at, _)| *at <= now);
        *tasks = waiting;
        ready.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        ready.into_iter().map(|(_, _, task)| task).collect()
    }
}
