//! Turn advancement, clock ticks, and real-time hazards.

use rescue_grid_core::{CellCoord, DestructionCause, Event, ObstacleKind, Phase, Role, StatusEffect};
use tracing::{debug, info};

use crate::{chain, grid::within_reach, weather::WeatherChange, World};

const MEDIC_PASSIVE_HEAL: u32 = 5;
const BURN_DAMAGE: u32 = 5;
const FIRE_CONTACT_DAMAGE: u32 = 10;
const CLEAR_WEATHER_ENERGY: u32 = 5;
/// Seconds a fire burns before igniting neighbouring trees.
const FIRE_SPREAD_INTERVAL_SECONDS: u32 = 10;

impl World {
    /// Executes the end of the current turn, wrapping it in phase changes on planning levels.
    pub(crate) fn execute_turn(&mut self, out_events: &mut Vec<Event>) {
        if self.planning_seconds.is_some() {
            self.phase = Phase::Executing;
            out_events.push(Event::PhaseChanged {
                phase: Phase::Executing,
            });
            self.advance_turn(out_events);
            self.phase = Phase::Planning;
            out_events.push(Event::PhaseChanged {
                phase: Phase::Planning,
            });
        } else {
            self.advance_turn(out_events);
        }
    }

    /// Applies every end-of-turn effect in a single step.
    fn advance_turn(&mut self, out_events: &mut Vec<Event>) {
        let medic_alive = self
            .squad
            .iter()
            .any(|survivor| survivor.role == Role::Medic && survivor.is_alive());
        if medic_alive {
            for survivor in self.squad.iter_mut() {
                let amount = survivor.heal(MEDIC_PASSIVE_HEAL);
                if amount > 0 {
                    out_events.push(Event::SurvivorHealed {
                        survivor: survivor.id,
                        amount,
                        health: survivor.health,
                    });
                }
            }
        }

        let fires: Vec<CellCoord> = self
            .obstacles
            .iter()
            .filter(|obstacle| obstacle.kind == ObstacleKind::Fire)
            .map(|obstacle| obstacle.cell)
            .collect();
        for survivor in self.squad.iter_mut() {
            let burning = if survivor.statuses.contains(&StatusEffect::Burning) {
                survivor.damage(BURN_DAMAGE)
            } else {
                0
            };
            let touching = fires
                .iter()
                .filter(|fire| within_reach(**fire, survivor.cell))
                .count();
            let contact = u32::try_from(touching)
                .map_or(u32::MAX, |count| count.saturating_mul(FIRE_CONTACT_DAMAGE));
            let scorched = if contact > 0 {
                survivor.damage(contact)
            } else {
                0
            };
            if scorched > 0 {
                let _ = survivor.statuses.insert(StatusEffect::Burning);
            }
            let amount = burning + scorched;
            if amount > 0 {
                out_events.push(Event::SurvivorDamaged {
                    survivor: survivor.id,
                    amount,
                    health: survivor.health,
                });
            }
        }

        if self.weather.is_clear() {
            for survivor in self.squad.iter_mut() {
                let _ = survivor.restore_energy(CLEAR_WEATHER_ENERGY);
            }
        }

        for bridge in self
            .obstacles
            .iter_mut()
            .filter(|obstacle| obstacle.turns_build_remaining > 0)
        {
            bridge.turns_build_remaining -= 1;
            if bridge.turns_build_remaining == 0 {
                out_events.push(Event::BridgeCompleted { obstacle: bridge.id });
            }
        }

        match self.weather.advance() {
            WeatherChange::Unchanged => {}
            WeatherChange::Expired => {
                info!("weather cleared");
                out_events.push(Event::WeatherChanged { weather: None });
            }
            WeatherChange::Started(kind) => {
                info!(weather = ?kind, "weather changed");
                out_events.push(Event::WeatherChanged {
                    weather: Some(kind),
                });
            }
        }

        for survivor in self.squad.iter_mut() {
            survivor.immune_turns = survivor.immune_turns.saturating_sub(1);
            survivor.used = false;
        }

        self.turn = self.turn.saturating_add(1);
        self.planning_remaining = self.planning_seconds;
        debug!(turn = self.turn, "turn advanced");
        out_events.push(Event::TurnAdvanced { turn: self.turn });
    }

    /// One second of the level countdown elapsed.
    pub(crate) fn tick_countdown(&mut self, out_events: &mut Vec<Event>) {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        out_events.push(Event::CountdownAdvanced {
            time_remaining: self.time_remaining,
        });
    }

    /// One second of the planning countdown elapsed; executes the turn when it runs out.
    pub(crate) fn tick_planning(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Planning {
            return;
        }
        let Some(remaining) = self.planning_remaining else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        self.planning_remaining = Some(remaining);
        if remaining == 0 {
            debug!("planning time expired");
            self.execute_turn(out_events);
        }
    }

    /// Ages obstacles, removes decayed ones, and lets fires spread into trees.
    pub(crate) fn tick_hazards(&mut self, seconds: u32, out_events: &mut Vec<Event>) {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.age_seconds = obstacle.age_seconds.saturating_add(seconds);
            if obstacle.kind == ObstacleKind::Fire {
                obstacle.spread_elapsed = obstacle.spread_elapsed.saturating_add(seconds);
            }
        }

        let decayed: Vec<_> = self
            .obstacles
            .iter()
            .filter(|obstacle| obstacle.has_decayed())
            .map(|obstacle| obstacle.id)
            .collect();
        for id in decayed {
            if let Some(obstacle) = self.obstacles.remove(id) {
                debug!(obstacle = id.get(), kind = ?obstacle.kind, "obstacle decayed");
                out_events.push(Event::ObstacleDestroyed {
                    obstacle: obstacle.id,
                    kind: obstacle.kind,
                    cause: DestructionCause::Decayed,
                });
            }
        }

        let mut spreading = Vec::new();
        for fire in self
            .obstacles
            .iter_mut()
            .filter(|obstacle| obstacle.kind == ObstacleKind::Fire)
        {
            if fire.spread_elapsed >= FIRE_SPREAD_INTERVAL_SECONDS {
                fire.spread_elapsed -= FIRE_SPREAD_INTERVAL_SECONDS;
                spreading.push(fire.cell);
            }
        }

        let grid = self.grid;
        for origin in spreading {
            let trees: Vec<_> = grid
                .neighbors(origin)
                .filter_map(|cell| self.obstacles.at(cell))
                .filter(|obstacle| obstacle.kind == ObstacleKind::Tree)
                .map(|obstacle| obstacle.id)
                .collect();
            for tree in trees {
                let Some(burnt) = chain::ignite(&mut self.obstacles, tree, out_events) else {
                    continue;
                };
                if let Some(reaction) = burnt.chain_reaction {
                    let _ = chain::resolve(
                        &mut self.obstacles,
                        &mut self.squad,
                        burnt.id,
                        burnt.cell,
                        vec![reaction],
                        out_events,
                    );
                }
            }
        }
    }
}
