#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rescue Grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for observers to
//! react to. Rejected commands surface as an [`ActionError`] and never mutate
//! the world.

use serde::{Deserialize, Serialize};

mod level;

pub use level::{InventoryConfig, LevelConfig, ObstacleConfig, SurvivorConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Rescue Grid.";

/// Default maximum health assigned to survivors.
pub const DEFAULT_MAX_HEALTH: u32 = 100;

/// Default maximum energy assigned to survivors.
pub const DEFAULT_MAX_ENERGY: u32 = 100;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Transitions an idle level into play.
    Start,
    /// Suspends the level clocks and rejects player actions.
    Pause,
    /// Resumes a paused level.
    Resume,
    /// Marks a survivor as the UI selection.
    SelectSurvivor {
        /// Survivor to select.
        survivor: SurvivorId,
    },
    /// Requests that a survivor step onto an orthogonally adjacent cell.
    MoveSurvivor {
        /// Survivor attempting to move.
        survivor: SurvivorId,
        /// Destination cell.
        to: CellCoord,
    },
    /// Requests removal of an obstacle using a catalogued method.
    RemoveObstacle {
        /// Obstacle targeted for removal.
        obstacle: ObstacleId,
        /// Method chosen from the obstacle kind's catalogue.
        method: RemovalMethod,
        /// Survivors volunteering for the removal.
        survivors: Vec<SurvivorId>,
    },
    /// Requests that a survivor use one of its role abilities.
    UseAbility {
        /// Survivor performing the ability.
        survivor: SurvivorId,
        /// Ability to perform.
        ability: Ability,
    },
    /// Ends the planning phase early and executes the turn.
    EndPlanning,
    /// Executes the turn for levels that run without a planning phase.
    AdvanceTurn,
    /// One second of the level countdown elapsed.
    CountdownTick,
    /// One second of the planning countdown elapsed.
    PlanningTick,
    /// Real time elapsed for obstacle decay and fire spreading.
    HazardTick {
        /// Whole seconds that elapsed since the previous hazard tick.
        seconds: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The level entered play.
    LevelStarted {
        /// Countdown seconds available.
        time_remaining: u32,
    },
    /// The level status changed.
    StatusChanged {
        /// Status that became active.
        status: GameStatus,
    },
    /// The turn phase changed.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// The UI selection changed.
    SurvivorSelected {
        /// Survivor that became selected.
        survivor: SurvivorId,
    },
    /// A survivor completed a move.
    SurvivorMoved {
        /// Survivor that moved.
        survivor: SurvivorId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
        /// Energy paid for the move.
        energy_spent: u32,
    },
    /// A survivor used a role ability.
    AbilityUsed {
        /// Survivor that acted.
        survivor: SurvivorId,
        /// Ability that was used.
        ability: Ability,
    },
    /// An obstacle was removed by a player-chosen method.
    ObstacleRemoved {
        /// Obstacle that was removed.
        obstacle: ObstacleId,
        /// Kind of the removed obstacle.
        kind: ObstacleKind,
        /// Method used for the removal.
        method: RemovalMethod,
        /// Whether the method was flagged as risky.
        warning: bool,
    },
    /// An obstacle disappeared without a direct removal request.
    ObstacleDestroyed {
        /// Obstacle that was destroyed.
        obstacle: ObstacleId,
        /// Kind of the destroyed obstacle.
        kind: ObstacleKind,
        /// What destroyed the obstacle.
        cause: DestructionCause,
    },
    /// A new obstacle appeared on the grid.
    ObstacleSpawned {
        /// Identifier allocated to the obstacle.
        obstacle: ObstacleId,
        /// Kind of the new obstacle.
        kind: ObstacleKind,
        /// Cell the obstacle occupies.
        cell: CellCoord,
    },
    /// Scouting lifted a fog.
    FogScouted {
        /// Fog obstacle that was scouted.
        fog: ObstacleId,
        /// Obstacle revealed beneath the fog, if any.
        revealed: Option<ObstacleId>,
    },
    /// A bridge finished construction and became passable.
    BridgeCompleted {
        /// Bridge obstacle that finished.
        obstacle: ObstacleId,
    },
    /// A chain reaction resolved.
    ChainReactionFired {
        /// Obstacle whose removal fired the reaction.
        source: ObstacleId,
        /// Number of obstacles destroyed or transformed by the reaction.
        count: u32,
    },
    /// A synergy was used for the first time in this level.
    SynergyDiscovered {
        /// Synergy that was discovered.
        synergy: SynergyId,
    },
    /// A survivor lost health.
    SurvivorDamaged {
        /// Survivor that was hurt.
        survivor: SurvivorId,
        /// Health lost.
        amount: u32,
        /// Health remaining after the damage.
        health: u32,
    },
    /// A survivor regained health.
    SurvivorHealed {
        /// Survivor that was healed.
        survivor: SurvivorId,
        /// Health restored.
        amount: u32,
        /// Health after healing.
        health: u32,
    },
    /// The active weather changed.
    WeatherChanged {
        /// Weather now in effect, `None` once an event has expired.
        weather: Option<WeatherKind>,
    },
    /// The turn counter advanced.
    TurnAdvanced {
        /// Turn number that just began.
        turn: u32,
    },
    /// The level countdown advanced.
    CountdownAdvanced {
        /// Seconds remaining on the countdown.
        time_remaining: u32,
    },
    /// Every survivor reached the rescue point.
    LevelVictory {
        /// Seconds left on the countdown.
        time_remaining: u32,
        /// Turns played.
        turns: u32,
        /// Star rating earned from the level thresholds.
        stars: u8,
    },
    /// The level was lost.
    LevelDefeat {
        /// Why the level was lost.
        reason: DefeatReason,
    },
}

/// Reasons a command may be rejected. A rejected command leaves the world untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum ActionError {
    /// The target cell is not an orthogonal neighbour.
    #[error("target is not adjacent")]
    NotAdjacent,
    /// Another survivor already stands on the target cell.
    #[error("target cell is occupied")]
    Occupied,
    /// An obstacle on the target cell is impassable for the survivor.
    #[error("target cell is blocked")]
    Blocked,
    /// The active weather forbids movement.
    #[error("movement is blocked by the storm")]
    WeatherBlocked,
    /// A survivor lacks the energy for the action.
    #[error("insufficient energy")]
    InsufficientEnergy,
    /// The inventory lacks the resources for the action.
    #[error("insufficient resources")]
    InsufficientResources,
    /// No volunteering survivor has the role the action requires.
    #[error("required role not present")]
    RoleMismatch,
    /// The obstacle still depends on other obstacles.
    #[error("obstacle is locked")]
    Locked,
    /// The target cell lies outside the grid.
    #[error("target is out of bounds")]
    OutOfBounds,
    /// No survivor exists with the provided identifier.
    #[error("unknown survivor")]
    UnknownSurvivor,
    /// No obstacle exists with the provided identifier.
    #[error("unknown obstacle")]
    UnknownObstacle,
    /// The method is not catalogued for the obstacle kind.
    #[error("removal method unavailable for obstacle")]
    MethodUnavailable,
    /// The survivor already acted this turn.
    #[error("survivor already acted this turn")]
    AlreadyActed,
    /// The level is idle or paused.
    #[error("level is not playing")]
    NotPlaying,
    /// The ability target does not qualify.
    #[error("invalid ability target")]
    InvalidTarget,
}

/// Unique identifier assigned to a survivor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurvivorId(u32);

impl SurvivorId {
    /// Creates a new survivor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell. Rows grow downward.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Closed set of survivor roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Removes obstacles and builds bridges.
    Engineer,
    /// Heals and cures squad members.
    Medic,
    /// Produces food and restores team energy.
    Cook,
    /// Slips through narrow terrain and scouts fog.
    Child,
}

impl Role {
    /// Every role in declaration order.
    pub const ALL: [Role; 4] = [Role::Engineer, Role::Medic, Role::Cook, Role::Child];
}

/// Closed set of obstacle kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Boulder blocking the cell.
    Rock,
    /// Mud that doubles movement cost.
    Swamp,
    /// Water that needs a bridge.
    DeepWater,
    /// Gap only a child fits through.
    NarrowPassage,
    /// Crossing over deep water, passable once built.
    Bridge,
    /// Burning cell that hurts neighbours.
    Fire,
    /// Tree that can be chopped or burned.
    Tree,
    /// Dam holding back a flood.
    WaterDam,
    /// Explosive charge.
    Explosive,
    /// Frozen block.
    Ice,
    /// Fog concealing what lies beneath.
    Fog,
}

/// Propagating effect fired when an obstacle is removed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainReaction {
    /// Destroys every other obstacle within the Manhattan radius.
    Explosion {
        /// Blast radius in cells.
        radius: u32,
    },
    /// Extinguishes fires in the rows below, one column either side.
    Flood {
        /// Number of rows reached below the source.
        range: u32,
    },
    /// Extinguishes fires within the Manhattan range.
    Extinguish {
        /// Reach in cells.
        range: u32,
    },
    /// Melts ice within the Manhattan range.
    MeltIce {
        /// Reach in cells.
        range: u32,
    },
    /// Ignites trees within the Manhattan range.
    SpreadFire {
        /// Reach in cells.
        range: u32,
    },
    /// Destroys the named obstacles.
    Collapse {
        /// Obstacles brought down by the collapse.
        targets: Vec<ObstacleId>,
    },
}

/// Closed set of inventory resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Tools for digging and chopping.
    Tool,
    /// Water for dousing and thawing.
    Water,
    /// Explosive charges for blasting.
    Explosive,
    /// Medical supplies for healing.
    MedicalSupply,
    /// Food for restoring energy.
    Food,
}

/// Amount of a single resource consumed by an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Resource consumed.
    pub kind: ResourceKind,
    /// Units consumed.
    pub amount: u32,
}

impl ResourceCost {
    /// Creates a new resource cost.
    #[must_use]
    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}

/// Closed set of obstacle removal methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMethod {
    /// Engineer digs a rock out.
    Dig,
    /// Explosive charge blasts the obstacle.
    Blast,
    /// Engineer and cook lift a rock together.
    HeavyLift,
    /// Engineer chops a tree.
    Chop,
    /// Tree is set alight.
    Burn,
    /// Engineer and child cut a tree from above.
    Scaffold,
    /// Fire is doused with water.
    Douse,
    /// Cook and medic smother a fire.
    Smother,
    /// Engineer opens a dam's sluice.
    OpenSluice,
    /// Explosive is set off deliberately.
    Detonate,
    /// Engineer defuses an explosive.
    Defuse,
    /// Engineer and medic defuse an explosive without tools.
    SafeDefuse,
    /// Engineer chips ice away.
    Chip,
    /// Ice is thawed with water.
    Thaw,
    /// Engineer drains a swamp.
    Drain,
    /// Engineer widens a narrow passage.
    Widen,
}

/// Closed set of two-role combos.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyId {
    /// Engineer and cook.
    HeavyLift,
    /// Engineer and child.
    Scaffold,
    /// Cook and medic.
    Smother,
    /// Engineer and medic.
    SafeDefuse,
}

/// Closed set of weather conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    /// Grants energy regeneration.
    Clear,
    /// Flavour only.
    Rain,
    /// Blocks all movement.
    Storm,
}

/// Snapshot of the weather cycle counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherEvent {
    /// Weather condition of the current or last event.
    pub kind: WeatherKind,
    /// Turns the event stays in effect.
    pub turns_remaining: u32,
    /// Turns to wait after expiry before sampling the next event.
    pub turns_until_next: u32,
}

impl WeatherEvent {
    /// Reports whether the event is still in effect.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.turns_remaining > 0
    }
}

/// Lifecycle status of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Loaded but not started.
    Idle,
    /// Clocks running and actions accepted.
    Playing,
    /// Clocks stopped and actions rejected.
    Paused,
    /// Every survivor reached the rescue point.
    Victory,
    /// A survivor died or the countdown expired.
    Defeat,
}

impl GameStatus {
    /// Reports whether the status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Turn phase of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The planning countdown runs and executes the turn when it expires.
    Planning,
    /// Turns are advanced on request.
    Executing,
}

/// Why a level was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefeatReason {
    /// A survivor's health reached zero.
    SurvivorLost {
        /// Survivor that died.
        survivor: SurvivorId,
    },
    /// The level countdown reached zero.
    TimeExpired,
}

/// What removed an obstacle outside a direct removal request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestructionCause {
    /// A chain reaction fired by the named obstacle.
    ChainReaction {
        /// Obstacle whose reaction destroyed this one.
        source: ObstacleId,
    },
    /// The obstacle outlived its natural decay time.
    Decayed,
    /// The obstacle turned into another obstacle.
    Transformed,
    /// Scouting replaced the fog with what it concealed.
    Scouted,
}

/// Status conditions that can afflict survivors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffect {
    /// Loses health every turn until cured.
    Burning,
}

/// Role abilities that survivors may use once per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Engineer starts a bridge over adjacent deep water.
    BuildBridge {
        /// Deep water cell to bridge.
        target: CellCoord,
    },
    /// Medic restores health to itself or an adjacent survivor.
    Heal {
        /// Survivor to heal.
        target: SurvivorId,
    },
    /// Medic clears status effects from itself or an adjacent survivor.
    Cure {
        /// Survivor to cure.
        target: SurvivorId,
    },
    /// Cook adds food to the inventory.
    ProduceFood,
    /// Cook restores energy to every other survivor.
    RestoreTeamEnergy,
    /// Child becomes immune to damage for a few turns.
    Immunity,
    /// Child scouts a fog on its own or an adjacent cell.
    Scout {
        /// Fog cell to scout.
        target: CellCoord,
    },
}

impl Ability {
    /// Role that may use the ability.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::BuildBridge { .. } => Role::Engineer,
            Self::Heal { .. } | Self::Cure { .. } => Role::Medic,
            Self::ProduceFood | Self::RestoreTeamEnergy => Role::Cook,
            Self::Immunity | Self::Scout { .. } => Role::Child,
        }
    }

    /// Energy the acting survivor pays.
    #[must_use]
    pub const fn energy_cost(&self) -> u32 {
        match self {
            Self::BuildBridge { .. } => 30,
            Self::Heal { .. } => 20,
            Self::Cure { .. } => 10,
            Self::ProduceFood => 15,
            Self::RestoreTeamEnergy => 10,
            Self::Immunity => 15,
            Self::Scout { .. } => 5,
        }
    }

    /// Resource consumed by the ability, if any.
    #[must_use]
    pub const fn resource_cost(&self) -> Option<ResourceCost> {
        match self {
            Self::BuildBridge { .. } => Some(ResourceCost::new(ResourceKind::Tool, 1)),
            Self::Heal { .. } => Some(ResourceCost::new(ResourceKind::MedicalSupply, 1)),
            Self::RestoreTeamEnergy => Some(ResourceCost::new(ResourceKind::Food, 1)),
            Self::Cure { .. } | Self::ProduceFood | Self::Immunity | Self::Scout { .. } => None,
        }
    }
}
