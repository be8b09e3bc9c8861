//! Obstacle removal requests.

use rescue_grid_core::{
    ActionError, CellCoord, Event, ObstacleId, RemovalMethod, Role, SurvivorId,
};
use rescue_grid_system_synergy::{available_synergies, synergy};
use tracing::debug;

use crate::{
    chain,
    grid::within_reach,
    obstacles::{removal_method, RemovalMethodSpec},
    survivors::Survivor,
    World,
};

/// Fully validated removal awaiting commit.
#[derive(Debug)]
struct RemovalPlan {
    spec: RemovalMethodSpec,
    actors: Vec<SurvivorId>,
}

impl World {
    pub(crate) fn remove_obstacle(
        &mut self,
        obstacle: ObstacleId,
        method: RemovalMethod,
        volunteers: &[SurvivorId],
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let plan = self.plan_removal(obstacle, method, volunteers)?;
        let removed = self
            .obstacles
            .remove(obstacle)
            .ok_or(ActionError::UnknownObstacle)?;

        self.inventory.spend(plan.spec.cost);
        for actor in &plan.actors {
            if let Some(survivor) = self.squad.get_mut(*actor) {
                survivor.spend_energy(plan.spec.energy_cost);
                survivor.used = true;
            }
        }
        if let Some(seconds) = plan.spec.time_cost_seconds {
            self.time_remaining = self.time_remaining.saturating_sub(seconds);
        }

        debug!(
            obstacle = removed.id.get(),
            ?method,
            actors = plan.actors.len(),
            "obstacle removed"
        );
        out_events.push(Event::ObstacleRemoved {
            obstacle: removed.id,
            kind: removed.kind,
            method,
            warning: plan.spec.warning,
        });

        if let Some(synergy) = plan.spec.required_synergy {
            if self.synergies.record(synergy) {
                out_events.push(Event::SynergyDiscovered { synergy });
            }
        }

        let mut reactions = Vec::new();
        reactions.extend(plan.spec.chain_reaction.clone());
        if !plan.spec.suppresses_obstacle_reaction {
            reactions.extend(removed.chain_reaction.clone());
        }
        if !reactions.is_empty() {
            let _ = chain::resolve(
                &mut self.obstacles,
                &mut self.squad,
                removed.id,
                removed.cell,
                reactions,
                out_events,
            );
        }
        Ok(())
    }

    fn plan_removal(
        &self,
        obstacle: ObstacleId,
        method: RemovalMethod,
        volunteers: &[SurvivorId],
    ) -> Result<RemovalPlan, ActionError> {
        let target = self
            .obstacles
            .get(obstacle)
            .ok_or(ActionError::UnknownObstacle)?;
        let spec = removal_method(target.kind, method).ok_or(ActionError::MethodUnavailable)?;
        if self.obstacles.is_locked(target) {
            return Err(ActionError::Locked);
        }
        if !self.inventory.can_afford(spec.cost) {
            return Err(ActionError::InsufficientResources);
        }

        let actors = self.select_actors(&spec, target.cell, volunteers)?;
        Ok(RemovalPlan { spec, actors })
    }

    /// Picks the survivors that carry out a removal from the volunteers.
    ///
    /// Each required role is filled by the first unused volunteer that can reach the
    /// obstacle and pay the energy cost.
    fn select_actors(
        &self,
        spec: &RemovalMethodSpec,
        obstacle: CellCoord,
        volunteers: &[SurvivorId],
    ) -> Result<Vec<SurvivorId>, ActionError> {
        if volunteers.is_empty() {
            return Err(ActionError::RoleMismatch);
        }

        let mut available: Vec<&Survivor> = Vec::new();
        for id in volunteers {
            let survivor = self.squad.get(*id).ok_or(ActionError::UnknownSurvivor)?;
            if !survivor.used && available.iter().all(|known| known.id != survivor.id) {
                available.push(survivor);
            }
        }
        if available.is_empty() {
            return Err(ActionError::AlreadyActed);
        }

        let pick = |role: Option<Role>| {
            let candidates: Vec<&Survivor> = available
                .iter()
                .copied()
                .filter(|survivor| role.map_or(true, |role| survivor.role == role))
                .collect();
            if candidates.is_empty() {
                return Err(ActionError::RoleMismatch);
            }
            let in_reach: Vec<&Survivor> = candidates
                .into_iter()
                .filter(|survivor| within_reach(survivor.cell, obstacle))
                .collect();
            if in_reach.is_empty() {
                return Err(ActionError::NotAdjacent);
            }
            in_reach
                .into_iter()
                .find(|survivor| survivor.can_pay(spec.energy_cost))
                .map(|survivor| survivor.id)
                .ok_or(ActionError::InsufficientEnergy)
        };

        if let Some(required) = spec.required_synergy {
            let combo = synergy(required);
            if !available_synergies(available.iter().map(|survivor| survivor.role)).contains(&combo)
            {
                return Err(ActionError::RoleMismatch);
            }
            return combo.roles.iter().map(|role| pick(Some(*role))).collect();
        }

        pick(spec.required_role).map(|actor| vec![actor])
    }
}
