//! Seeded turn-based weather cycle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rescue_grid_core::{WeatherEvent, WeatherKind};

/// Turns to wait after an event expires before sampling the next one.
const WEATHER_COOLDOWN_TURNS: u32 = 1;

const fn duration(kind: WeatherKind) -> u32 {
    match kind {
        WeatherKind::Clear => 3,
        WeatherKind::Rain | WeatherKind::Storm => 2,
    }
}

/// Maps a roll in `0..100` onto clear 50%, rain 30%, storm 20%.
const fn kind_for_roll(roll: u32) -> WeatherKind {
    if roll < 50 {
        WeatherKind::Clear
    } else if roll < 80 {
        WeatherKind::Rain
    } else {
        WeatherKind::Storm
    }
}

/// Outcome of advancing the cycle by one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WeatherChange {
    Unchanged,
    Expired,
    Started(WeatherKind),
}

/// Weather state plus the deterministic generator that drives it.
#[derive(Clone, Debug)]
pub(crate) struct WeatherCycle {
    enabled: bool,
    current: Option<WeatherEvent>,
    cooldown: u32,
    rng: ChaCha8Rng,
}

impl WeatherCycle {
    pub(crate) fn new(enabled: bool, initial: Option<WeatherEvent>, seed: u64) -> Self {
        Self {
            enabled,
            current: initial,
            cooldown: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Event currently in effect.
    pub(crate) fn active(&self) -> Option<WeatherEvent> {
        self.current.filter(WeatherEvent::is_active)
    }

    pub(crate) fn active_kind(&self) -> Option<WeatherKind> {
        self.active().map(|event| event.kind)
    }

    pub(crate) fn is_storming(&self) -> bool {
        self.active_kind() == Some(WeatherKind::Storm)
    }

    pub(crate) fn is_clear(&self) -> bool {
        self.active_kind() == Some(WeatherKind::Clear)
    }

    /// Advances the cycle at the end of a turn.
    pub(crate) fn advance(&mut self) -> WeatherChange {
        if let Some(event) = self.current.as_mut().filter(|event| event.is_active()) {
            event.turns_remaining -= 1;
            if event.turns_remaining == 0 {
                self.cooldown = event.turns_until_next;
                return WeatherChange::Expired;
            }
            return WeatherChange::Unchanged;
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            if self.cooldown > 0 {
                return WeatherChange::Unchanged;
            }
        }

        if !self.enabled {
            return WeatherChange::Unchanged;
        }

        let kind = kind_for_roll(self.rng.gen_range(0..100));
        self.current = Some(WeatherEvent {
            kind,
            turns_remaining: duration(kind),
            turns_until_next: WEATHER_COOLDOWN_TURNS,
        });
        WeatherChange::Started(kind)
    }
}
