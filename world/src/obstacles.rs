//! Obstacle registry, lock graph, and the removal method catalogue.

use std::collections::{BTreeMap, BTreeSet};

use rescue_grid_core::{
    CellCoord, ChainReaction, ObstacleId, ObstacleKind, RemovalMethod, ResourceCost, ResourceKind,
    Role, SynergyId,
};

use crate::grid::Grid;

/// Turns a freshly started bridge needs before it can be crossed.
pub(crate) const BRIDGE_BUILD_TURNS: u32 = 3;

/// Authoritative state of a single obstacle.
#[derive(Clone, Debug)]
pub(crate) struct Obstacle {
    pub(crate) id: ObstacleId,
    pub(crate) kind: ObstacleKind,
    pub(crate) cell: CellCoord,
    /// Obstacles that must be gone before this one may be removed.
    pub(crate) blocked_by: BTreeSet<ObstacleId>,
    /// Inverse of `blocked_by`, kept for presentation.
    pub(crate) blocks: BTreeSet<ObstacleId>,
    pub(crate) chain_reaction: Option<ChainReaction>,
    /// Remaining construction turns; only bridges ever hold a non-zero value.
    pub(crate) turns_build_remaining: u32,
    pub(crate) revealed: bool,
    pub(crate) hidden: Vec<ObstacleKind>,
    pub(crate) age_seconds: u32,
    pub(crate) natural_decay_seconds: Option<u32>,
    /// Seconds accumulated toward the next fire spread.
    pub(crate) spread_elapsed: u32,
}

impl Obstacle {
    pub(crate) fn new(id: ObstacleId, kind: ObstacleKind, cell: CellCoord) -> Self {
        Self {
            id,
            kind,
            cell,
            blocked_by: BTreeSet::new(),
            blocks: BTreeSet::new(),
            chain_reaction: default_reaction(kind),
            turns_build_remaining: 0,
            revealed: false,
            hidden: Vec::new(),
            age_seconds: 0,
            natural_decay_seconds: None,
            spread_elapsed: 0,
        }
    }

    /// Role-conditioned passability.
    pub(crate) fn passable_for(&self, role: Role) -> bool {
        match self.kind {
            ObstacleKind::NarrowPassage => role == Role::Child,
            ObstacleKind::Swamp | ObstacleKind::Fog => true,
            ObstacleKind::Bridge => self.turns_build_remaining == 0,
            ObstacleKind::Rock
            | ObstacleKind::Tree
            | ObstacleKind::WaterDam
            | ObstacleKind::Explosive
            | ObstacleKind::Ice
            | ObstacleKind::Fire
            | ObstacleKind::DeepWater => false,
        }
    }

    /// Passability shared by every role.
    pub(crate) fn is_passable(&self) -> bool {
        Role::ALL.iter().all(|role| self.passable_for(*role))
    }

    pub(crate) fn is_removable(&self) -> bool {
        !removal_methods_for(self.kind).is_empty()
    }

    pub(crate) fn has_decayed(&self) -> bool {
        self.natural_decay_seconds
            .map_or(false, |limit| self.age_seconds > limit)
    }
}

/// Reaction an obstacle carries unless the level overrides it.
pub(crate) fn default_reaction(kind: ObstacleKind) -> Option<ChainReaction> {
    match kind {
        ObstacleKind::Explosive => Some(ChainReaction::Explosion { radius: 1 }),
        ObstacleKind::WaterDam => Some(ChainReaction::Flood { range: 2 }),
        _ => None,
    }
}

/// Registry that stores obstacles, indexes them by cell, and allocates identifiers.
#[derive(Clone, Debug)]
pub(crate) struct ObstacleRegistry {
    grid: Grid,
    entries: BTreeMap<ObstacleId, Obstacle>,
    cells: Vec<Option<ObstacleId>>,
    next_obstacle_id: ObstacleId,
}

impl ObstacleRegistry {
    pub(crate) fn new(grid: Grid) -> Self {
        Self {
            grid,
            entries: BTreeMap::new(),
            cells: vec![None; grid.capacity()],
            next_obstacle_id: ObstacleId::new(0),
        }
    }

    /// Inserts an obstacle, refusing cells that are out of bounds or already taken.
    pub(crate) fn insert(&mut self, obstacle: Obstacle) -> bool {
        let Some(index) = self.grid.index(obstacle.cell) else {
            return false;
        };
        if self.cells[index].is_some() || self.entries.contains_key(&obstacle.id) {
            return false;
        }
        self.cells[index] = Some(obstacle.id);
        if obstacle.id >= self.next_obstacle_id {
            self.next_obstacle_id = ObstacleId::new(obstacle.id.get().saturating_add(1));
        }
        let _ = self.entries.insert(obstacle.id, obstacle);
        true
    }

    /// Creates a new obstacle on a free cell.
    pub(crate) fn spawn(&mut self, kind: ObstacleKind, cell: CellCoord) -> Option<ObstacleId> {
        let id = self.next_obstacle_id;
        if self.insert(Obstacle::new(id, kind, cell)) {
            Some(id)
        } else {
            None
        }
    }

    pub(crate) fn remove(&mut self, id: ObstacleId) -> Option<Obstacle> {
        let obstacle = self.entries.remove(&id)?;
        if let Some(index) = self.grid.index(obstacle.cell) {
            self.cells[index] = None;
        }
        Some(obstacle)
    }

    pub(crate) fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: ObstacleId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn at(&self, cell: CellCoord) -> Option<&Obstacle> {
        let index = self.grid.index(cell)?;
        self.cells[index].and_then(|id| self.entries.get(&id))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Obstacle> {
        self.entries.values_mut()
    }

    /// True iff any obstacle this one depends on is still present.
    pub(crate) fn is_locked(&self, obstacle: &Obstacle) -> bool {
        obstacle.blocked_by.iter().any(|id| self.contains(*id))
    }

    /// Rebuilds every `blocks` set from the `blocked_by` links.
    pub(crate) fn link_dependencies(&mut self) {
        let links: Vec<(ObstacleId, ObstacleId)> = self
            .entries
            .values()
            .flat_map(|obstacle| {
                obstacle
                    .blocked_by
                    .iter()
                    .map(move |blocker| (*blocker, obstacle.id))
            })
            .collect();
        for obstacle in self.entries.values_mut() {
            obstacle.blocks.clear();
        }
        for (blocker, blocked) in links {
            if let Some(entry) = self.entries.get_mut(&blocker) {
                let _ = entry.blocks.insert(blocked);
            }
        }
    }
}

/// Catalogue entry describing one way to remove an obstacle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalMethodSpec {
    /// Method identifier.
    pub method: RemovalMethod,
    /// Resource consumed from the shared inventory.
    pub cost: Option<ResourceCost>,
    /// Role one of the volunteers must have.
    pub required_role: Option<Role>,
    /// Combo the volunteers must form.
    pub required_synergy: Option<SynergyId>,
    /// Energy each acting survivor pays.
    pub energy_cost: u32,
    /// Seconds deducted from the level countdown.
    pub time_cost_seconds: Option<u32>,
    /// Whether the method is destructive or risky.
    pub warning: bool,
    /// Reaction fired by the method itself.
    pub chain_reaction: Option<ChainReaction>,
    /// Whether the obstacle's own reaction is prevented.
    pub suppresses_obstacle_reaction: bool,
}

impl RemovalMethodSpec {
    fn new(method: RemovalMethod, energy_cost: u32) -> Self {
        Self {
            method,
            cost: None,
            required_role: None,
            required_synergy: None,
            energy_cost,
            time_cost_seconds: None,
            warning: false,
            chain_reaction: None,
            suppresses_obstacle_reaction: false,
        }
    }

    fn costing(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.cost = Some(ResourceCost::new(kind, amount));
        self
    }

    fn by(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    fn with_synergy(mut self, synergy: SynergyId) -> Self {
        self.required_synergy = Some(synergy);
        self
    }

    fn taking(mut self, seconds: u32) -> Self {
        self.time_cost_seconds = Some(seconds);
        self
    }

    fn risky(mut self) -> Self {
        self.warning = true;
        self
    }

    fn firing(mut self, reaction: ChainReaction) -> Self {
        self.chain_reaction = Some(reaction);
        self
    }

    fn suppressing(mut self) -> Self {
        self.suppresses_obstacle_reaction = true;
        self
    }
}

/// Static per-kind catalogue of removal methods. Empty for kinds that cannot be removed.
#[must_use]
pub fn removal_methods_for(kind: ObstacleKind) -> Vec<RemovalMethodSpec> {
    use RemovalMethod as M;
    use ResourceKind as R;

    match kind {
        ObstacleKind::Rock => vec![
            RemovalMethodSpec::new(M::Dig, 20)
                .costing(R::Tool, 2)
                .by(Role::Engineer)
                .taking(5),
            RemovalMethodSpec::new(M::Blast, 10)
                .costing(R::Explosive, 1)
                .risky()
                .firing(ChainReaction::Explosion { radius: 1 }),
            RemovalMethodSpec::new(M::HeavyLift, 15).with_synergy(SynergyId::HeavyLift),
        ],
        ObstacleKind::Tree => vec![
            RemovalMethodSpec::new(M::Chop, 15)
                .costing(R::Tool, 1)
                .by(Role::Engineer),
            RemovalMethodSpec::new(M::Burn, 10)
                .risky()
                .firing(ChainReaction::SpreadFire { range: 1 }),
            RemovalMethodSpec::new(M::Scaffold, 10).with_synergy(SynergyId::Scaffold),
        ],
        ObstacleKind::Fire => vec![
            RemovalMethodSpec::new(M::Douse, 10).costing(R::Water, 1),
            RemovalMethodSpec::new(M::Smother, 10).with_synergy(SynergyId::Smother),
        ],
        ObstacleKind::WaterDam => vec![
            RemovalMethodSpec::new(M::OpenSluice, 20)
                .costing(R::Tool, 2)
                .by(Role::Engineer)
                .risky(),
            RemovalMethodSpec::new(M::Blast, 10)
                .costing(R::Explosive, 1)
                .risky()
                .firing(ChainReaction::Explosion { radius: 1 }),
        ],
        ObstacleKind::Explosive => vec![
            RemovalMethodSpec::new(M::Detonate, 10).risky(),
            RemovalMethodSpec::new(M::Defuse, 15)
                .costing(R::Tool, 1)
                .by(Role::Engineer)
                .suppressing(),
            RemovalMethodSpec::new(M::SafeDefuse, 10)
                .with_synergy(SynergyId::SafeDefuse)
                .suppressing(),
        ],
        ObstacleKind::Ice => vec![
            RemovalMethodSpec::new(M::Chip, 15)
                .costing(R::Tool, 1)
                .by(Role::Engineer),
            RemovalMethodSpec::new(M::Thaw, 10)
                .costing(R::Water, 1)
                .firing(ChainReaction::MeltIce { range: 1 }),
        ],
        ObstacleKind::Swamp => vec![RemovalMethodSpec::new(M::Drain, 20)
            .costing(R::Tool, 2)
            .by(Role::Engineer)
            .taking(10)],
        ObstacleKind::NarrowPassage => vec![RemovalMethodSpec::new(M::Widen, 25)
            .costing(R::Tool, 2)
            .by(Role::Engineer)
            .taking(5)],
        ObstacleKind::DeepWater | ObstacleKind::Bridge | ObstacleKind::Fog => Vec::new(),
    }
}

/// Looks up a single catalogue entry.
#[must_use]
pub fn removal_method(kind: ObstacleKind, method: RemovalMethod) -> Option<RemovalMethodSpec> {
    removal_methods_for(kind)
        .into_iter()
        .find(|spec| spec.method == method)
}
