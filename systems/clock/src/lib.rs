#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic scheduler that converts elapsed real time into tick commands.
//!
//! Every repeating tick is owned by a [`TimerHandle`]. Dropping the handle
//! cancels the tick, so a session that tears down its handles can never be
//! mutated by a leftover timer.

use std::{cell::Cell, rc::Rc, time::Duration};

use rescue_grid_core::Command;
use tracing::debug;

/// Concern driven by a repeating tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Level countdown, one second per tick.
    Countdown,
    /// Planning countdown, one second per tick.
    Planning,
    /// Obstacle decay and fire spreading.
    Hazard,
}

impl TimerKind {
    fn command(self, interval: Duration) -> Command {
        match self {
            Self::Countdown => Command::CountdownTick,
            Self::Planning => Command::PlanningTick,
            Self::Hazard => Command::HazardTick {
                seconds: u32::try_from(interval.as_secs()).unwrap_or(u32::MAX).max(1),
            },
        }
    }
}

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    tick_interval: Duration,
}

impl Config {
    /// Creates a configuration firing every timer at the provided cadence.
    #[must_use]
    pub const fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Cancellation handle for one repeating tick.
///
/// The tick stops firing once the handle is cancelled or dropped.
#[derive(Debug)]
pub struct TimerHandle {
    kind: TimerKind,
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle {
    /// Concern the handle controls.
    #[must_use]
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Cancels the tick immediately.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if !self.cancelled.replace(true) {
            debug!(timer = ?self.kind, "timer cancelled");
        }
    }
}

#[derive(Debug)]
struct Timer {
    kind: TimerKind,
    accumulator: Duration,
    cancelled: Rc<Cell<bool>>,
}

/// Deterministic scheduler holding every live repeating tick.
#[derive(Debug)]
pub struct Scheduler {
    tick_interval: Duration,
    timers: Vec<Timer>,
}

impl Scheduler {
    /// Creates an empty scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            timers: Vec::new(),
        }
    }

    /// Registers a repeating tick and returns the handle that owns it.
    #[must_use = "dropping the handle cancels the timer"]
    pub fn schedule(&mut self, kind: TimerKind) -> TimerHandle {
        self.timers.retain(|timer| !timer.cancelled.get());
        let cancelled = Rc::new(Cell::new(false));
        self.timers.push(Timer {
            kind,
            accumulator: Duration::ZERO,
            cancelled: Rc::clone(&cancelled),
        });
        debug!(timer = ?kind, "timer scheduled");
        TimerHandle { kind, cancelled }
    }

    /// Number of ticks whose handles are still alive.
    #[must_use]
    pub fn active(&self) -> usize {
        self.timers
            .iter()
            .filter(|timer| !timer.cancelled.get())
            .count()
    }

    /// Reports whether a live tick of the provided kind exists.
    #[must_use]
    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.timers
            .iter()
            .any(|timer| timer.kind == kind && !timer.cancelled.get())
    }

    /// Accumulates elapsed time and emits one command per elapsed interval.
    ///
    /// Commands from different timers are interleaved interval by interval in
    /// scheduling order.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        self.timers.retain(|timer| !timer.cancelled.get());
        if self.tick_interval.is_zero() || dt.is_zero() {
            return;
        }

        let mut fired = Vec::with_capacity(self.timers.len());
        for timer in &mut self.timers {
            timer.accumulator = timer.accumulator.saturating_add(dt);
            let mut count = 0_usize;
            while timer.accumulator >= self.tick_interval {
                timer.accumulator -= self.tick_interval;
                count += 1;
            }
            fired.push((timer.kind, count));
        }

        let rounds = fired.iter().map(|(_, count)| *count).max().unwrap_or(0);
        for round in 0..rounds {
            for (kind, count) in &fired {
                if round < *count {
                    out.push(kind.command(self.tick_interval));
                }
            }
        }
    }
}
