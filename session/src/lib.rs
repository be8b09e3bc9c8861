#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that owns one level, its clocks, and its observers.
//!
//! All mutations flow through [`Session::submit`] and [`Session::advance`],
//! so timer ticks and player commands never interleave half-applied.

use std::{fmt, time::Duration};

use rescue_grid_core::{ActionError, Command, Event, GameStatus, LevelConfig};
use rescue_grid_system_clock::{Config, Scheduler, TimerHandle, TimerKind};
use rescue_grid_world::{self as world, query, LevelError, World};
use tracing::{debug, info};

/// Receives every event the session's world emits.
pub trait EventObserver {
    /// Called once per event, in emission order.
    fn on_event(&mut self, event: &Event);
}

impl<F> EventObserver for F
where
    F: FnMut(&Event),
{
    fn on_event(&mut self, event: &Event) {
        self(event);
    }
}

/// Live level plus the timers driving its clocks.
pub struct Session {
    world: World,
    scheduler: Scheduler,
    timers: Vec<TimerHandle>,
    observers: Vec<Box<dyn EventObserver>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("scheduler", &self.scheduler)
            .field("timers", &self.timers)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Session {
    /// Loads a level with one-second clock ticks.
    pub fn new(level: LevelConfig) -> Result<Self, LevelError> {
        Self::with_clock(level, Config::default())
    }

    /// Loads a level using the provided clock configuration.
    pub fn with_clock(level: LevelConfig, clock: Config) -> Result<Self, LevelError> {
        let world = World::from_level(level)?;
        Ok(Self {
            world,
            scheduler: Scheduler::new(clock),
            timers: Vec::new(),
            observers: Vec::new(),
        })
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of clock ticks currently scheduled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.scheduler.active()
    }

    /// Registers an observer for all subsequent events.
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: EventObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Applies a player command and broadcasts the resulting events.
    pub fn submit(&mut self, command: Command) -> Result<(), ActionError> {
        let mut events = Vec::new();
        let result = world::apply(&mut self.world, command, &mut events);
        self.broadcast(&events);
        self.sync_timers();
        result
    }

    /// Lets real time elapse and applies every tick that came due.
    ///
    /// Returns the number of ticks applied. Ticks still queued when the level
    /// leaves play are discarded.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let mut commands = Vec::new();
        self.scheduler.advance(dt, &mut commands);

        let mut applied = 0;
        for command in commands {
            if query::status(&self.world) != GameStatus::Playing {
                debug!(?command, "discarding tick after leaving play");
                break;
            }
            let mut events = Vec::new();
            if let Err(error) = world::apply(&mut self.world, command, &mut events) {
                debug!(%error, "tick rejected");
                break;
            }
            applied += 1;
            self.broadcast(&events);
        }
        self.sync_timers();
        applied
    }

    fn broadcast(&mut self, events: &[Event]) {
        for event in events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
    }

    fn sync_timers(&mut self) {
        let status = query::status(&self.world);
        if status == GameStatus::Playing {
            if self.timers.is_empty() {
                self.timers.push(self.scheduler.schedule(TimerKind::Countdown));
                if query::planning_remaining(&self.world).is_some() {
                    self.timers.push(self.scheduler.schedule(TimerKind::Planning));
                }
                self.timers.push(self.scheduler.schedule(TimerKind::Hazard));
            }
        } else if !self.timers.is_empty() {
            info!(?status, "stopping level clocks");
            self.timers.clear();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use rescue_grid_core::{CellCoord, Role};

    use super::*;

    fn level() -> LevelConfig {
        LevelConfig::new(3, 3, CellCoord::new(2, 2))
            .with_survivor(Role::Cook, CellCoord::new(0, 0))
            .with_weather(false)
    }

    #[test]
    fn idle_sessions_schedule_nothing() {
        let mut session = Session::new(level()).expect("valid level");
        assert_eq!(session.active_timers(), 0);
        assert_eq!(session.advance(Duration::from_secs(5)), 0);
        assert_eq!(query::time_remaining(session.world()), 180);
    }

    #[test]
    fn starting_schedules_countdown_and_hazard() {
        let mut session = Session::new(level()).expect("valid level");
        session.submit(Command::Start).expect("start");
        assert_eq!(session.active_timers(), 2);
        assert!(session.scheduler.is_scheduled(TimerKind::Countdown));
        assert!(session.scheduler.is_scheduled(TimerKind::Hazard));
        assert!(!session.scheduler.is_scheduled(TimerKind::Planning));
    }

    #[test]
    fn planning_levels_add_the_planning_timer() {
        let mut session = Session::new(level().with_planning(10)).expect("valid level");
        session.submit(Command::Start).expect("start");
        assert_eq!(session.active_timers(), 3);
        assert!(session.scheduler.is_scheduled(TimerKind::Planning));
    }
}
