//! Role abilities.

use rescue_grid_core::{
    Ability, ActionError, CellCoord, DestructionCause, Event, ObstacleKind, ResourceKind,
    SurvivorId,
};
use tracing::debug;

use crate::{
    grid::{is_adjacent, within_reach},
    obstacles::BRIDGE_BUILD_TURNS,
    World,
};

const HEAL_AMOUNT: u32 = 30;
const TEAM_ENERGY_AMOUNT: u32 = 20;
const IMMUNITY_TURNS: u32 = 2;

impl World {
    pub(crate) fn use_ability(
        &mut self,
        survivor: SurvivorId,
        ability: Ability,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.validate_ability(survivor, ability)?;

        self.inventory.spend(ability.resource_cost());
        if let Some(actor) = self.squad.get_mut(survivor) {
            actor.spend_energy(ability.energy_cost());
            actor.used = true;
        }
        debug!(survivor = survivor.get(), ?ability, "ability used");
        out_events.push(Event::AbilityUsed { survivor, ability });

        match ability {
            Ability::BuildBridge { target } => self.start_bridge(target, out_events),
            Ability::Heal { target } => {
                if let Some(patient) = self.squad.get_mut(target) {
                    let amount = patient.heal(HEAL_AMOUNT);
                    if amount > 0 {
                        out_events.push(Event::SurvivorHealed {
                            survivor: target,
                            amount,
                            health: patient.health,
                        });
                    }
                }
            }
            Ability::Cure { target } => {
                if let Some(patient) = self.squad.get_mut(target) {
                    patient.statuses.clear();
                }
            }
            Ability::ProduceFood => self.inventory.add(ResourceKind::Food, 1),
            Ability::RestoreTeamEnergy => {
                for member in self.squad.iter_mut().filter(|member| member.id != survivor) {
                    let _ = member.restore_energy(TEAM_ENERGY_AMOUNT);
                }
            }
            Ability::Immunity => {
                if let Some(actor) = self.squad.get_mut(survivor) {
                    actor.immune_turns = IMMUNITY_TURNS;
                }
            }
            Ability::Scout { target } => self.scout(target, out_events),
        }
        Ok(())
    }

    fn validate_ability(&self, survivor: SurvivorId, ability: Ability) -> Result<(), ActionError> {
        let actor = self.squad.get(survivor).ok_or(ActionError::UnknownSurvivor)?;
        if actor.used {
            return Err(ActionError::AlreadyActed);
        }
        if actor.role != ability.role() {
            return Err(ActionError::RoleMismatch);
        }

        match ability {
            Ability::BuildBridge { target } => {
                self.ensure_target_cell(actor.cell, target, false)?;
                if self.obstacles.at(target).map(|obstacle| obstacle.kind)
                    != Some(ObstacleKind::DeepWater)
                {
                    return Err(ActionError::InvalidTarget);
                }
            }
            Ability::Heal { target } | Ability::Cure { target } => {
                let patient = self.squad.get(target).ok_or(ActionError::UnknownSurvivor)?;
                if !within_reach(actor.cell, patient.cell) {
                    return Err(ActionError::NotAdjacent);
                }
            }
            Ability::Scout { target } => {
                self.ensure_target_cell(actor.cell, target, true)?;
                let concealed = self
                    .obstacles
                    .at(target)
                    .map_or(false, |obstacle| {
                        obstacle.kind == ObstacleKind::Fog && !obstacle.revealed
                    });
                if !concealed {
                    return Err(ActionError::InvalidTarget);
                }
            }
            Ability::ProduceFood | Ability::RestoreTeamEnergy | Ability::Immunity => {}
        }

        if !self.inventory.can_afford(ability.resource_cost()) {
            return Err(ActionError::InsufficientResources);
        }
        if !actor.can_pay(ability.energy_cost()) {
            return Err(ActionError::InsufficientEnergy);
        }
        Ok(())
    }

    fn ensure_target_cell(
        &self,
        origin: CellCoord,
        target: CellCoord,
        allow_own_cell: bool,
    ) -> Result<(), ActionError> {
        if !self.grid.contains(target) {
            return Err(ActionError::OutOfBounds);
        }
        let reachable = if allow_own_cell {
            within_reach(origin, target)
        } else {
            is_adjacent(origin, target)
        };
        if reachable {
            Ok(())
        } else {
            Err(ActionError::NotAdjacent)
        }
    }

    /// Replaces deep water with a bridge under construction.
    fn start_bridge(&mut self, target: CellCoord, out_events: &mut Vec<Event>) {
        let Some(water) = self.obstacles.at(target).map(|obstacle| obstacle.id) else {
            return;
        };
        if let Some(replaced) = self.obstacles.remove(water) {
            out_events.push(Event::ObstacleDestroyed {
                obstacle: replaced.id,
                kind: replaced.kind,
                cause: DestructionCause::Transformed,
            });
        }
        let Some(bridge) = self.obstacles.spawn(ObstacleKind::Bridge, target) else {
            return;
        };
        if let Some(obstacle) = self.obstacles.get_mut(bridge) {
            obstacle.turns_build_remaining = BRIDGE_BUILD_TURNS;
        }
        out_events.push(Event::ObstacleSpawned {
            obstacle: bridge,
            kind: ObstacleKind::Bridge,
            cell: target,
        });
    }

    /// Lifts a fog, replacing it with the first obstacle it concealed.
    fn scout(&mut self, target: CellCoord, out_events: &mut Vec<Event>) {
        let Some(fog) = self.obstacles.at(target).map(|obstacle| obstacle.id) else {
            return;
        };
        let hidden = self
            .obstacles
            .get(fog)
            .and_then(|obstacle| obstacle.hidden.first().copied());

        let Some(kind) = hidden else {
            if let Some(obstacle) = self.obstacles.get_mut(fog) {
                obstacle.revealed = true;
            }
            out_events.push(Event::FogScouted {
                fog,
                revealed: None,
            });
            return;
        };

        if let Some(lifted) = self.obstacles.remove(fog) {
            out_events.push(Event::ObstacleDestroyed {
                obstacle: lifted.id,
                kind: lifted.kind,
                cause: DestructionCause::Scouted,
            });
        }
        let revealed = self.obstacles.spawn(kind, target);
        if let Some(obstacle) = revealed.and_then(|id| self.obstacles.get_mut(id)) {
            obstacle.revealed = true;
        }
        if let Some(obstacle) = revealed {
            out_events.push(Event::ObstacleSpawned {
                obstacle,
                kind,
                cell: target,
            });
        }
        out_events.push(Event::FogScouted { fog, revealed });
    }
}
