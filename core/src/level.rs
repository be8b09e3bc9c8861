//! Level configuration consumed once when a world is created.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, ChainReaction, ObstacleId, ObstacleKind, Role, WeatherEvent};

const DEFAULT_COUNTDOWN_SECONDS: u32 = 180;

/// Complete description of a level.
///
/// Obstacles are numbered in declaration order starting at zero; dependency
/// links and collapse targets refer to those numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Number of columns in the grid.
    pub width: u32,
    /// Number of rows in the grid.
    pub height: u32,
    /// Cell every survivor must reach.
    pub rescue_point: CellCoord,
    /// Survivors placed at load.
    pub survivors: Vec<SurvivorConfig>,
    /// Obstacles placed at load.
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,
    /// Resources available at load.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Seconds on the level countdown.
    #[serde(default = "default_countdown")]
    pub countdown_seconds: u32,
    /// Seconds per planning phase, if the level plans its turns.
    #[serde(default)]
    pub planning_seconds: Option<u32>,
    /// Seconds remaining required for each additional star.
    #[serde(default)]
    pub star_thresholds: Vec<u32>,
    /// Whether new weather events are sampled.
    #[serde(default = "default_weather_enabled")]
    pub weather_enabled: bool,
    /// Weather in effect when the level starts.
    #[serde(default)]
    pub initial_weather: Option<WeatherEvent>,
    /// Seed for the weather generator.
    #[serde(default)]
    pub seed: u64,
}

impl LevelConfig {
    /// Creates an empty level with default clocks and no survivors.
    #[must_use]
    pub fn new(width: u32, height: u32, rescue_point: CellCoord) -> Self {
        Self {
            width,
            height,
            rescue_point,
            survivors: Vec::new(),
            obstacles: Vec::new(),
            inventory: InventoryConfig::default(),
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            planning_seconds: None,
            star_thresholds: Vec::new(),
            weather_enabled: true,
            initial_weather: None,
            seed: 0,
        }
    }

    /// Adds a survivor with default health and energy.
    #[must_use]
    pub fn with_survivor(mut self, role: Role, position: CellCoord) -> Self {
        self.survivors.push(SurvivorConfig::new(role, position));
        self
    }

    /// Adds an obstacle.
    #[must_use]
    pub fn with_obstacle(mut self, obstacle: ObstacleConfig) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Replaces the starting inventory.
    #[must_use]
    pub fn with_inventory(mut self, inventory: InventoryConfig) -> Self {
        self.inventory = inventory;
        self
    }

    /// Replaces the countdown duration.
    #[must_use]
    pub fn with_countdown(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    /// Replaces the star thresholds.
    #[must_use]
    pub fn with_star_thresholds(mut self, thresholds: Vec<u32>) -> Self {
        self.star_thresholds = thresholds;
        self
    }

    /// Enables the planning phase with the provided duration.
    #[must_use]
    pub fn with_planning(mut self, seconds: u32) -> Self {
        self.planning_seconds = Some(seconds);
        self
    }

    /// Enables or disables the weather cycle.
    #[must_use]
    pub fn with_weather(mut self, enabled: bool) -> Self {
        self.weather_enabled = enabled;
        self
    }

    /// Starts the level with the provided weather event.
    #[must_use]
    pub fn with_initial_weather(mut self, weather: WeatherEvent) -> Self {
        self.initial_weather = Some(weather);
        self
    }

    /// Replaces the weather seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn default_countdown() -> u32 {
    DEFAULT_COUNTDOWN_SECONDS
}

fn default_weather_enabled() -> bool {
    true
}

/// Survivor placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivorConfig {
    /// Role of the survivor.
    pub role: Role,
    /// Starting cell.
    pub position: CellCoord,
    /// Maximum health, defaults to [`crate::DEFAULT_MAX_HEALTH`].
    #[serde(default)]
    pub max_health: Option<u32>,
    /// Maximum energy, defaults to [`crate::DEFAULT_MAX_ENERGY`].
    #[serde(default)]
    pub max_energy: Option<u32>,
}

impl SurvivorConfig {
    /// Creates a survivor placement with default limits.
    #[must_use]
    pub const fn new(role: Role, position: CellCoord) -> Self {
        Self {
            role,
            position,
            max_health: None,
            max_energy: None,
        }
    }
}

/// Obstacle placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    /// Kind of obstacle.
    pub kind: ObstacleKind,
    /// Cell the obstacle occupies.
    pub position: CellCoord,
    /// Obstacles that must be gone before this one may be removed.
    #[serde(default)]
    pub blocked_by: Vec<ObstacleId>,
    /// Reaction replacing the kind's default reaction.
    #[serde(default)]
    pub chain_reaction: Option<ChainReaction>,
    /// Seconds after which the obstacle disappears on its own.
    #[serde(default)]
    pub natural_decay_seconds: Option<u32>,
    /// Obstacles concealed by a fog, in reveal order.
    #[serde(default)]
    pub hidden: Vec<ObstacleKind>,
}

impl ObstacleConfig {
    /// Creates an obstacle placement with no links.
    #[must_use]
    pub const fn new(kind: ObstacleKind, position: CellCoord) -> Self {
        Self {
            kind,
            position,
            blocked_by: Vec::new(),
            chain_reaction: None,
            natural_decay_seconds: None,
            hidden: Vec::new(),
        }
    }

    /// Adds a dependency on another obstacle.
    #[must_use]
    pub fn blocked_by(mut self, obstacle: ObstacleId) -> Self {
        self.blocked_by.push(obstacle);
        self
    }

    /// Overrides the chain reaction.
    #[must_use]
    pub fn with_reaction(mut self, reaction: ChainReaction) -> Self {
        self.chain_reaction = Some(reaction);
        self
    }

    /// Sets the natural decay time.
    #[must_use]
    pub fn decaying_after(mut self, seconds: u32) -> Self {
        self.natural_decay_seconds = Some(seconds);
        self
    }

    /// Conceals an obstacle beneath a fog.
    #[must_use]
    pub fn hiding(mut self, kind: ObstacleKind) -> Self {
        self.hidden.push(kind);
        self
    }
}

/// Starting resource counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Tools.
    #[serde(default)]
    pub tool: u32,
    /// Water.
    #[serde(default)]
    pub water: u32,
    /// Explosive charges.
    #[serde(default)]
    pub explosive: u32,
    /// Medical supplies.
    #[serde(default)]
    pub medical_supply: u32,
    /// Food.
    #[serde(default)]
    pub food: u32,
}
