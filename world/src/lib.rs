#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Rescue Grid.

mod abilities;
mod chain;
mod grid;
mod inventory;
mod level;
mod movement;
mod obstacles;
mod outcome;
mod removal;
mod survivors;
mod turn;
mod weather;

use rescue_grid_core::{
    ActionError, CellCoord, Command, Event, GameStatus, LevelConfig, Phase, SurvivorId,
    WELCOME_BANNER,
};
use rescue_grid_system_synergy::SynergyLedger;
use tracing::{debug, info};

pub use inventory::Inventory;
pub use level::{LevelError, MAX_GRID_DIMENSION};
pub use obstacles::{removal_method, removal_methods_for, RemovalMethodSpec};

use grid::Grid;
use obstacles::{Obstacle, ObstacleRegistry};
use survivors::{Squad, Survivor};
use weather::WeatherCycle;

/// Represents the authoritative Rescue Grid level state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    rescue_point: CellCoord,
    status: GameStatus,
    phase: Phase,
    turn: u32,
    time_remaining: u32,
    planning_seconds: Option<u32>,
    planning_remaining: Option<u32>,
    squad: Squad,
    obstacles: ObstacleRegistry,
    inventory: Inventory,
    weather: WeatherCycle,
    synergies: SynergyLedger,
    star_thresholds: Vec<u32>,
    selected: Option<SurvivorId>,
}

impl World {
    /// Creates an idle world from a level configuration.
    ///
    /// Survivors and obstacles receive identifiers in declaration order
    /// starting at zero.
    pub fn from_level(config: LevelConfig) -> Result<Self, LevelError> {
        let grid = level::validate(&config)?;

        let members = config
            .survivors
            .iter()
            .enumerate()
            .map(|(index, survivor)| {
                let id = SurvivorId::new(u32::try_from(index).unwrap_or(u32::MAX));
                Survivor::from_config(id, survivor)
            })
            .collect();

        let mut obstacles = ObstacleRegistry::new(grid);
        for (index, declared) in config.obstacles.iter().enumerate() {
            let mut obstacle =
                Obstacle::new(level::obstacle_id(index), declared.kind, declared.position);
            obstacle.blocked_by = declared.blocked_by.iter().copied().collect();
            if declared.chain_reaction.is_some() {
                obstacle.chain_reaction = declared.chain_reaction.clone();
            }
            obstacle.natural_decay_seconds = declared.natural_decay_seconds;
            obstacle.hidden = declared.hidden.clone();
            let _ = obstacles.insert(obstacle);
        }
        obstacles.link_dependencies();

        let phase = if config.planning_seconds.is_some() {
            Phase::Planning
        } else {
            Phase::Executing
        };

        Ok(Self {
            banner: WELCOME_BANNER,
            grid,
            rescue_point: config.rescue_point,
            status: GameStatus::Idle,
            phase,
            turn: 0,
            time_remaining: config.countdown_seconds,
            planning_seconds: config.planning_seconds,
            planning_remaining: config.planning_seconds,
            squad: Squad::new(members),
            obstacles,
            inventory: Inventory::from_config(&config.inventory),
            weather: WeatherCycle::new(config.weather_enabled, config.initial_weather, config.seed),
            synergies: SynergyLedger::new(),
            star_thresholds: config.star_thresholds,
            selected: None,
        })
    }

    fn ensure_playing(&self) -> Result<(), ActionError> {
        if self.status == GameStatus::Playing {
            Ok(())
        } else {
            Err(ActionError::NotPlaying)
        }
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        if self.status != GameStatus::Idle {
            debug!(status = ?self.status, "level already started");
            return;
        }
        self.status = GameStatus::Playing;
        self.planning_remaining = self.planning_seconds;
        info!(
            time_remaining = self.time_remaining,
            survivors = self.squad.iter().count(),
            obstacles = self.obstacles.iter().count(),
            "level started"
        );
        out_events.push(Event::LevelStarted {
            time_remaining: self.time_remaining,
        });
        out_events.push(Event::StatusChanged {
            status: GameStatus::Playing,
        });
        out_events.push(Event::PhaseChanged { phase: self.phase });
    }

    fn set_paused(
        &mut self,
        paused: bool,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let (from, to) = if paused {
            (GameStatus::Playing, GameStatus::Paused)
        } else {
            (GameStatus::Paused, GameStatus::Playing)
        };
        if self.status != from {
            return Err(ActionError::NotPlaying);
        }
        self.status = to;
        out_events.push(Event::StatusChanged { status: to });
        Ok(())
    }

    fn select(
        &mut self,
        survivor: SurvivorId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        if self.squad.get(survivor).is_none() {
            return Err(ActionError::UnknownSurvivor);
        }
        self.selected = Some(survivor);
        out_events.push(Event::SurvivorSelected { survivor });
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and emit no events. Once the
/// level reached victory or defeat every command is accepted as a no-op.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    if world.status.is_terminal() {
        debug!(?command, status = ?world.status, "ignoring command after level end");
        return Ok(());
    }

    let mark = out_events.len();
    let result = dispatch(world, &command, out_events);
    match result {
        Ok(()) => world.evaluate_outcome(out_events),
        Err(error) => {
            out_events.truncate(mark);
            debug!(?command, %error, "command rejected");
        }
    }
    result
}

fn dispatch(
    world: &mut World,
    command: &Command,
    out_events: &mut Vec<Event>,
) -> Result<(), ActionError> {
    match command {
        Command::Start => {
            world.start(out_events);
            Ok(())
        }
        Command::Pause => world.set_paused(true, out_events),
        Command::Resume => world.set_paused(false, out_events),
        Command::SelectSurvivor { survivor } => world.select(*survivor, out_events),
        Command::MoveSurvivor { survivor, to } => {
            world.ensure_playing()?;
            world.move_survivor(*survivor, *to, out_events)
        }
        Command::RemoveObstacle {
            obstacle,
            method,
            survivors,
        } => {
            world.ensure_playing()?;
            world.remove_obstacle(*obstacle, *method, survivors, out_events)
        }
        Command::UseAbility { survivor, ability } => {
            world.ensure_playing()?;
            world.use_ability(*survivor, *ability, out_events)
        }
        Command::EndPlanning | Command::AdvanceTurn => {
            world.ensure_playing()?;
            world.execute_turn(out_events);
            Ok(())
        }
        Command::CountdownTick => {
            world.ensure_playing()?;
            world.tick_countdown(out_events);
            Ok(())
        }
        Command::PlanningTick => {
            world.ensure_playing()?;
            world.tick_planning(out_events);
            Ok(())
        }
        Command::HazardTick { seconds } => {
            world.ensure_playing()?;
            world.tick_hazards(*seconds, out_events);
            Ok(())
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use rescue_grid_core::{
        CellCoord, ChainReaction, GameStatus, ObstacleId, ObstacleKind, Phase, Role,
        StatusEffect, SurvivorId, SynergyId, WeatherEvent,
    };
    use rescue_grid_system_synergy::available_synergies as synergies_for_roles;

    use super::{grid, obstacles::Obstacle, survivors::Survivor, Inventory, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Lifecycle status of the level.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Current turn phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Number of turns executed so far.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Seconds left on the level countdown.
    #[must_use]
    pub fn time_remaining(world: &World) -> u32 {
        world.time_remaining
    }

    /// Seconds left in the planning phase, for levels that plan their turns.
    #[must_use]
    pub fn planning_remaining(world: &World) -> Option<u32> {
        world.planning_remaining
    }

    /// Cell every survivor must reach.
    #[must_use]
    pub fn rescue_point(world: &World) -> CellCoord {
        world.rescue_point
    }

    /// Grid width and height.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Reports whether the cell lies on the grid.
    #[must_use]
    pub fn in_bounds(world: &World, cell: CellCoord) -> bool {
        world.grid.contains(cell)
    }

    /// Reports whether two cells share an edge.
    #[must_use]
    pub fn is_adjacent(a: CellCoord, b: CellCoord) -> bool {
        grid::is_adjacent(a, b)
    }

    /// Reports whether a survivor stands on the cell.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellCoord) -> bool {
        world.squad.is_occupied(cell)
    }

    /// Survivor currently selected by the UI.
    #[must_use]
    pub fn selected(world: &World) -> Option<SurvivorId> {
        world.selected
    }

    /// Captures every survivor in identifier order.
    #[must_use]
    pub fn survivors(world: &World) -> Vec<SurvivorSnapshot> {
        world.squad.iter().map(SurvivorSnapshot::capture).collect()
    }

    /// Captures a single survivor.
    #[must_use]
    pub fn survivor(world: &World, id: SurvivorId) -> Option<SurvivorSnapshot> {
        world.squad.get(id).map(SurvivorSnapshot::capture)
    }

    /// Cells the survivor could legally move onto right now.
    #[must_use]
    pub fn valid_moves(world: &World, id: SurvivorId) -> Vec<CellCoord> {
        world.valid_moves(id)
    }

    /// Captures every live obstacle in identifier order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<ObstacleSnapshot> {
        world
            .obstacles
            .iter()
            .map(|obstacle| ObstacleSnapshot::capture(world, obstacle))
            .collect()
    }

    /// Captures the obstacle on a cell, if any.
    #[must_use]
    pub fn obstacle_at(world: &World, cell: CellCoord) -> Option<ObstacleSnapshot> {
        world
            .obstacles
            .at(cell)
            .map(|obstacle| ObstacleSnapshot::capture(world, obstacle))
    }

    /// Captures a single obstacle.
    #[must_use]
    pub fn obstacle(world: &World, id: ObstacleId) -> Option<ObstacleSnapshot> {
        world
            .obstacles
            .get(id)
            .map(|obstacle| ObstacleSnapshot::capture(world, obstacle))
    }

    /// True iff the obstacle exists and depends on an obstacle that is still present.
    #[must_use]
    pub fn is_locked(world: &World, id: ObstacleId) -> bool {
        world
            .obstacles
            .get(id)
            .map_or(false, |obstacle| world.obstacles.is_locked(obstacle))
    }

    /// Shared resource counters.
    #[must_use]
    pub fn inventory(world: &World) -> Inventory {
        world.inventory
    }

    /// Weather event currently in effect.
    #[must_use]
    pub fn weather(world: &World) -> Option<WeatherEvent> {
        world.weather.active()
    }

    /// Synergies used at least once in this level, in declaration order.
    #[must_use]
    pub fn discovered_synergies(world: &World) -> Vec<SynergyId> {
        world.synergies.iter().collect()
    }

    /// Combos formed by the survivors that have not acted this turn.
    #[must_use]
    pub fn available_synergies(world: &World) -> Vec<SynergyId> {
        let roles: Vec<Role> = world
            .squad
            .iter()
            .filter(|survivor| !survivor.used && survivor.is_alive())
            .map(|survivor| survivor.role)
            .collect();
        synergies_for_roles(roles)
            .into_iter()
            .map(|synergy| synergy.id)
            .collect()
    }

    /// Immutable representation of a survivor's state.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct SurvivorSnapshot {
        /// Unique identifier of the survivor.
        pub id: SurvivorId,
        /// Role of the survivor.
        pub role: Role,
        /// Cell the survivor stands on.
        pub cell: CellCoord,
        /// Current health.
        pub health: u32,
        /// Health ceiling.
        pub max_health: u32,
        /// Current energy.
        pub energy: u32,
        /// Energy ceiling.
        pub max_energy: u32,
        /// Whether the survivor already acted this turn.
        pub used: bool,
        /// Active status effects.
        pub statuses: Vec<StatusEffect>,
        /// Turns of damage immunity left.
        pub immune_turns: u32,
    }

    impl SurvivorSnapshot {
        fn capture(survivor: &Survivor) -> Self {
            Self {
                id: survivor.id,
                role: survivor.role,
                cell: survivor.cell,
                health: survivor.health,
                max_health: survivor.max_health,
                energy: survivor.energy,
                max_energy: survivor.max_energy,
                used: survivor.used,
                statuses: survivor.statuses.iter().copied().collect(),
                immune_turns: survivor.immune_turns,
            }
        }
    }

    /// Immutable representation of an obstacle's state.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ObstacleSnapshot {
        /// Unique identifier of the obstacle.
        pub id: ObstacleId,
        /// Obstacle kind.
        pub kind: ObstacleKind,
        /// Cell the obstacle occupies.
        pub cell: CellCoord,
        /// Whether every role may enter the cell.
        pub passable: bool,
        /// Whether the kind has removal methods.
        pub removable: bool,
        /// Whether a live obstacle still blocks removal.
        pub locked: bool,
        /// Obstacles that must be removed first.
        pub blocked_by: Vec<ObstacleId>,
        /// Live obstacles waiting on this one.
        pub blocks: Vec<ObstacleId>,
        /// Reaction fired when the obstacle is removed.
        pub chain_reaction: Option<ChainReaction>,
        /// Construction turns left for bridges.
        pub turns_build_remaining: u32,
        /// Whether a fog has been scouted.
        pub revealed: bool,
    }

    impl ObstacleSnapshot {
        fn capture(world: &World, obstacle: &Obstacle) -> Self {
            Self {
                id: obstacle.id,
                kind: obstacle.kind,
                cell: obstacle.cell,
                passable: obstacle.is_passable(),
                removable: obstacle.is_removable(),
                locked: world.obstacles.is_locked(obstacle),
                blocked_by: obstacle.blocked_by.iter().copied().collect(),
                blocks: obstacle
                    .blocks
                    .iter()
                    .copied()
                    .filter(|id| world.obstacles.contains(*id))
                    .collect(),
                chain_reaction: obstacle.chain_reaction.clone(),
                turns_build_remaining: obstacle.turns_build_remaining,
                revealed: obstacle.revealed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rescue_grid_core::{ObstacleConfig, ObstacleId, ObstacleKind, Role};

    use super::*;

    fn level() -> LevelConfig {
        LevelConfig::new(4, 4, CellCoord::new(3, 3))
            .with_survivor(Role::Engineer, CellCoord::new(0, 0))
            .with_weather(false)
    }

    #[test]
    fn worlds_start_idle() {
        let world = World::from_level(level()).expect("valid level");
        assert_eq!(query::status(&world), GameStatus::Idle);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::dimensions(&world), (4, 4));
    }

    #[test]
    fn start_emits_lifecycle_events() {
        let mut world = World::from_level(level()).expect("valid level");
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events).expect("start");
        assert_eq!(
            events,
            vec![
                Event::LevelStarted {
                    time_remaining: 180
                },
                Event::StatusChanged {
                    status: GameStatus::Playing
                },
                Event::PhaseChanged {
                    phase: Phase::Executing
                },
            ]
        );
        events.clear();
        apply(&mut world, Command::Start, &mut events).expect("second start");
        assert!(events.is_empty());
    }

    #[test]
    fn actions_require_a_running_level() {
        let mut world = World::from_level(level()).expect("valid level");
        let mut events = Vec::new();
        assert_eq!(
            apply(
                &mut world,
                Command::MoveSurvivor {
                    survivor: SurvivorId::new(0),
                    to: CellCoord::new(1, 0),
                },
                &mut events,
            ),
            Err(ActionError::NotPlaying)
        );
        assert_eq!(
            apply(&mut world, Command::Resume, &mut events),
            Err(ActionError::NotPlaying)
        );
        assert!(events.is_empty());
    }

    #[test]
    fn paused_levels_reject_ticks() {
        let mut world = World::from_level(level()).expect("valid level");
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events).expect("start");
        apply(&mut world, Command::Pause, &mut events).expect("pause");
        assert_eq!(
            apply(&mut world, Command::CountdownTick, &mut events),
            Err(ActionError::NotPlaying)
        );
        apply(&mut world, Command::Resume, &mut events).expect("resume");
        apply(&mut world, Command::CountdownTick, &mut events).expect("tick");
        assert_eq!(query::time_remaining(&world), 179);
    }

    #[test]
    fn blocks_only_lists_live_obstacles() {
        let config = level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(2, 2)))
            .with_obstacle(
                ObstacleConfig::new(ObstacleKind::Tree, CellCoord::new(2, 3))
                    .blocked_by(ObstacleId::new(0)),
            );
        let world = World::from_level(config).expect("valid level");
        let rock = query::obstacle(&world, ObstacleId::new(0)).expect("rock");
        assert_eq!(rock.blocks, vec![ObstacleId::new(1)]);
        assert!(query::is_locked(&world, ObstacleId::new(1)));
        assert!(!query::is_locked(&world, ObstacleId::new(0)));
    }

    #[test]
    fn selection_tracks_known_survivors() {
        let mut world = World::from_level(level()).expect("valid level");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SelectSurvivor {
                survivor: SurvivorId::new(0),
            },
            &mut events,
        )
        .expect("select");
        assert_eq!(query::selected(&world), Some(SurvivorId::new(0)));
        assert_eq!(
            apply(
                &mut world,
                Command::SelectSurvivor {
                    survivor: SurvivorId::new(7),
                },
                &mut events,
            ),
            Err(ActionError::UnknownSurvivor)
        );
    }
}
