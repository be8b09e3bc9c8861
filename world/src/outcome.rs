//! Victory and defeat detection.

use rescue_grid_core::{DefeatReason, Event, GameStatus};
use tracing::info;

use crate::World;

/// Stars earned: one for finishing plus one per threshold the remaining time meets.
pub(crate) fn star_rating(thresholds: &[u32], time_remaining: u32) -> u8 {
    let met = thresholds
        .iter()
        .filter(|threshold| **threshold <= time_remaining)
        .count();
    u8::try_from(met.saturating_add(1)).unwrap_or(u8::MAX)
}

impl World {
    /// Moves a playing level into its terminal status once an end condition holds.
    pub(crate) fn evaluate_outcome(&mut self, out_events: &mut Vec<Event>) {
        if self.status != GameStatus::Playing {
            return;
        }

        if self.squad.all_at(self.rescue_point) {
            let stars = star_rating(&self.star_thresholds, self.time_remaining);
            info!(
                time_remaining = self.time_remaining,
                turns = self.turn,
                stars,
                "level won"
            );
            self.finish(GameStatus::Victory, out_events);
            out_events.push(Event::LevelVictory {
                time_remaining: self.time_remaining,
                turns: self.turn,
                stars,
            });
            return;
        }

        let reason = self
            .squad
            .iter()
            .find(|survivor| !survivor.is_alive())
            .map(|survivor| DefeatReason::SurvivorLost {
                survivor: survivor.id,
            })
            .or((self.time_remaining == 0).then_some(DefeatReason::TimeExpired));
        if let Some(reason) = reason {
            info!(?reason, "level lost");
            self.finish(GameStatus::Defeat, out_events);
            out_events.push(Event::LevelDefeat { reason });
        }
    }

    fn finish(&mut self, status: GameStatus, out_events: &mut Vec<Event>) {
        self.status = status;
        self.selected = None;
        out_events.push(Event::StatusChanged { status });
    }
}

#[cfg(test)]
mod tests {
    use rescue_grid_core::{CellCoord, LevelConfig, Role, SurvivorId};

    use super::*;

    fn playing(config: LevelConfig) -> World {
        let mut world = World::from_level(config).expect("valid level");
        world.status = GameStatus::Playing;
        world
    }

    #[test]
    fn stars_count_met_thresholds() {
        assert_eq!(star_rating(&[], 10), 1);
        assert_eq!(star_rating(&[60, 120], 90), 2);
        assert_eq!(star_rating(&[60, 120], 120), 3);
        assert_eq!(star_rating(&[60, 120], 59), 1);
    }

    #[test]
    fn victory_wins_over_expired_countdown() {
        let level = LevelConfig::new(3, 3, CellCoord::new(1, 1))
            .with_survivor(Role::Cook, CellCoord::new(1, 1))
            .with_countdown(0);
        let mut world = playing(level);
        let mut events = Vec::new();
        world.evaluate_outcome(&mut events);
        assert_eq!(world.status, GameStatus::Victory);
        assert_eq!(
            events.last(),
            Some(&Event::LevelVictory {
                time_remaining: 0,
                turns: 0,
                stars: 1,
            })
        );
    }

    #[test]
    fn dead_survivor_loses_the_level() {
        let level = LevelConfig::new(3, 3, CellCoord::new(2, 2))
            .with_survivor(Role::Cook, CellCoord::new(0, 0));
        let mut world = playing(level);
        if let Some(cook) = world.squad.get_mut(SurvivorId::new(0)) {
            cook.health = 0;
        }
        let mut events = Vec::new();
        world.evaluate_outcome(&mut events);
        assert_eq!(world.status, GameStatus::Defeat);
        assert_eq!(
            events,
            vec![
                Event::StatusChanged {
                    status: GameStatus::Defeat
                },
                Event::LevelDefeat {
                    reason: DefeatReason::SurvivorLost {
                        survivor: SurvivorId::new(0)
                    }
                },
            ]
        );
    }

    #[test]
    fn idle_levels_are_never_evaluated() {
        let level = LevelConfig::new(3, 3, CellCoord::new(1, 1))
            .with_survivor(Role::Cook, CellCoord::new(1, 1));
        let mut world = World::from_level(level).expect("valid level");
        let mut events = Vec::new();
        world.evaluate_outcome(&mut events);
        assert_eq!(world.status, GameStatus::Idle);
        assert!(events.is_empty());
    }
}
