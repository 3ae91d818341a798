//! Cooperative tick scheduler.
//!
//! Timers are keyed by `(due tick, sequence)` so a tick's callbacks fire in
//! the order they were scheduled. A timer scheduled with delay `d` while the
//! scheduler is at tick `t` fires during the processing of tick `t + d`.
//! Callbacks run to completion; a failing callback is logged and dropped
//! from the current pass without affecting any other timer.

use anyhow::Result;
use minerworks_core::SimTick;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

type OnceCallback<W> = Box<dyn FnOnce(&mut W, SimTick) -> Result<()>>;
type RepeatCallback<W> = Box<dyn FnMut(&mut W, SimTick) -> Result<()>>;

/// Handle returned by [`TickScheduler::run_after`] and [`TickScheduler::run_every`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

enum Timer<W> {
    Once(OnceCallback<W>),
    Every {
        interval: u64,
        callback: RepeatCallback<W>,
    },
}

/// Queue position: due tick, then scheduling sequence.
type QueueKey = (u64, u64);

/// Single-threaded timer queue driven by the host tick loop.
pub struct TickScheduler<W> {
    now: SimTick,
    next_seq: u64,
    queue: BTreeMap<QueueKey, (TimerId, Timer<W>)>,
    keys: HashMap<TimerId, QueueKey>,
}

impl<W> Default for TickScheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> TickScheduler<W> {
    /// Create an empty scheduler positioned at tick zero.
    pub fn new() -> Self {
        Self {
            now: SimTick::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }

    /// The next tick [`TickScheduler::tick`] will process.
    pub fn now(&self) -> SimTick {
        self.now
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Run `callback` once, `delay` ticks from now.
    pub fn run_after<F>(&mut self, delay: u64, callback: F) -> TimerId
    where
        F: FnOnce(&mut W, SimTick) -> Result<()> + 'static,
    {
        let id = TimerId(self.next_seq);
        self.enqueue(id, self.now.0 + delay, Timer::Once(Box::new(callback)));
        id
    }

    /// Run `callback` every `interval` ticks, first `interval` ticks from now.
    ///
    /// An interval of zero is treated as one.
    pub fn run_every<F>(&mut self, interval: u64, callback: F) -> TimerId
    where
        F: FnMut(&mut W, SimTick) -> Result<()> + 'static,
    {
        let interval = interval.max(1);
        let id = TimerId(self.next_seq);
        self.enqueue(
            id,
            self.now.0 + interval,
            Timer::Every {
                interval,
                callback: Box::new(callback),
            },
        );
        id
    }

    /// Cancel a pending timer. Returns whether it was still scheduled.
    pub fn clear(&mut self, id: TimerId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Process the current tick: fire every due timer, then advance.
    ///
    /// Returns the number of callbacks that ran.
    pub fn tick(&mut self, world: &mut W) -> usize {
        let tick = self.now;
        let mut fired = 0;

        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > tick.0 {
                break;
            }
            let (id, timer) = entry.remove();
            self.keys.remove(&id);
            fired += 1;

            match timer {
                Timer::Once(callback) => {
                    if let Err(err) = callback(world, tick) {
                        warn!(timer = %id, tick = tick.0, error = %err, "scheduled callback failed");
                    }
                }
                Timer::Every {
                    interval,
                    mut callback,
                } => {
                    if let Err(err) = callback(world, tick) {
                        warn!(timer = %id, tick = tick.0, error = %err, "recurring callback failed");
                    }
                    self.enqueue(id, tick.0 + interval, Timer::Every { interval, callback });
                }
            }
        }

        if fired > 0 {
            debug!(tick = tick.0, fired, pending = self.queue.len(), "scheduler tick");
        }
        self.now = tick.advance(1);
        fired
    }

    fn enqueue(&mut self, id: TimerId, due: u64, timer: Timer<W>) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(key, (id, timer));
        self.keys.insert(id, key);
    }
}
