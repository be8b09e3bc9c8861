//! Survivor state and the energy economy.

use std::collections::BTreeSet;

use rescue_grid_core::{
    CellCoord, ObstacleKind, Role, StatusEffect, SurvivorConfig, SurvivorId, DEFAULT_MAX_ENERGY,
    DEFAULT_MAX_HEALTH,
};

/// Energy paid by adults for a single step.
const BASE_MOVE_COST: u32 = 10;
/// Energy paid by children for a single step.
const CHILD_MOVE_COST: u32 = 5;
/// Cost multiplier applied when stepping into a swamp.
const SWAMP_MULTIPLIER: u32 = 2;

/// Energy a survivor pays to step onto a cell holding `terrain`.
pub(crate) fn move_cost(role: Role, terrain: Option<ObstacleKind>) -> u32 {
    let base = match role {
        Role::Child => CHILD_MOVE_COST,
        Role::Engineer | Role::Medic | Role::Cook => BASE_MOVE_COST,
    };
    match terrain {
        Some(ObstacleKind::Swamp) => base * SWAMP_MULTIPLIER,
        _ => base,
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Survivor {
    pub(crate) id: SurvivorId,
    pub(crate) role: Role,
    pub(crate) cell: CellCoord,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) energy: u32,
    pub(crate) max_energy: u32,
    pub(crate) used: bool,
    pub(crate) statuses: BTreeSet<StatusEffect>,
    pub(crate) immune_turns: u32,
}

impl Survivor {
    pub(crate) fn from_config(id: SurvivorId, config: &SurvivorConfig) -> Self {
        let max_health = config.max_health.unwrap_or(DEFAULT_MAX_HEALTH);
        let max_energy = config.max_energy.unwrap_or(DEFAULT_MAX_ENERGY);
        Self {
            id,
            role: config.role,
            cell: config.position,
            health: max_health,
            max_health,
            energy: max_energy,
            max_energy,
            used: false,
            statuses: BTreeSet::new(),
            immune_turns: 0,
        }
    }

    pub(crate) const fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub(crate) const fn is_immune(&self) -> bool {
        self.immune_turns > 0
    }

    pub(crate) const fn can_pay(&self, cost: u32) -> bool {
        self.energy >= cost
    }

    pub(crate) fn spend_energy(&mut self, cost: u32) {
        self.energy = self.energy.saturating_sub(cost);
    }

    /// Adds energy up to the maximum, returning the amount actually gained.
    pub(crate) fn restore_energy(&mut self, amount: u32) -> u32 {
        let before = self.energy;
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
        self.energy - before
    }

    /// Removes health unless immune, returning the amount actually lost.
    pub(crate) fn damage(&mut self, amount: u32) -> u32 {
        if self.is_immune() {
            return 0;
        }
        let before = self.health;
        self.health = self.health.saturating_sub(amount);
        before - self.health
    }

    /// Adds health up to the maximum, returning the amount actually gained.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }
}

/// Survivors of a level ordered by identifier.
#[derive(Clone, Debug)]
pub(crate) struct Squad {
    members: Vec<Survivor>,
}

impl Squad {
    pub(crate) fn new(mut members: Vec<Survivor>) -> Self {
        members.sort_by_key(|survivor| survivor.id);
        Self { members }
    }

    pub(crate) fn get(&self, id: SurvivorId) -> Option<&Survivor> {
        self.members.iter().find(|survivor| survivor.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: SurvivorId) -> Option<&mut Survivor> {
        self.members.iter_mut().find(|survivor| survivor.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Survivor> {
        self.members.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Survivor> {
        self.members.iter_mut()
    }

    /// Reports whether any survivor stands on the cell.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.members.iter().any(|survivor| survivor.cell == cell)
    }

    /// Reports whether every survivor stands on the cell.
    pub(crate) fn all_at(&self, cell: CellCoord) -> bool {
        !self.members.is_empty() && self.members.iter().all(|survivor| survivor.cell == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survivor(role: Role) -> Survivor {
        Survivor::from_config(
            SurvivorId::new(0),
            &SurvivorConfig::new(role, CellCoord::new(0, 0)),
        )
    }

    #[test]
    fn child_moves_at_half_cost() {
        assert_eq!(move_cost(Role::Engineer, None), 10);
        assert_eq!(move_cost(Role::Child, None), 5);
    }

    #[test]
    fn swamp_doubles_cost() {
        assert_eq!(move_cost(Role::Cook, Some(ObstacleKind::Swamp)), 20);
        assert_eq!(move_cost(Role::Child, Some(ObstacleKind::Swamp)), 10);
        assert_eq!(move_cost(Role::Medic, Some(ObstacleKind::Fog)), 10);
    }

    #[test]
    fn energy_restoration_is_clamped() {
        let mut medic = survivor(Role::Medic);
        medic.spend_energy(3);
        assert_eq!(medic.restore_energy(20), 3);
        assert_eq!(medic.energy, medic.max_energy);
    }

    #[test]
    fn immune_survivors_take_no_damage() {
        let mut child = survivor(Role::Child);
        child.immune_turns = 1;
        assert_eq!(child.damage(40), 0);
        assert_eq!(child.health, child.max_health);
    }

    #[test]
    fn damage_is_clamped_at_zero() {
        let mut cook = survivor(Role::Cook);
        assert_eq!(cook.damage(250), 100);
        assert!(!cook.is_alive());
        assert_eq!(cook.heal(30), 30);
    }

    #[test]
    fn empty_squad_is_never_all_at_a_cell() {
        let squad = Squad::new(Vec::new());
        assert!(!squad.all_at(CellCoord::new(0, 0)));
    }
}
