//! Move validation and execution.

use rescue_grid_core::{ActionError, CellCoord, Event, SurvivorId};

use crate::{grid::is_adjacent, survivors::move_cost, World};

impl World {
    /// Checks every move precondition and returns the energy the move would cost.
    fn validate_move(&self, survivor: SurvivorId, to: CellCoord) -> Result<u32, ActionError> {
        let mover = self.squad.get(survivor).ok_or(ActionError::UnknownSurvivor)?;
        if mover.used {
            return Err(ActionError::AlreadyActed);
        }
        if self.weather.is_storming() {
            return Err(ActionError::WeatherBlocked);
        }
        if !is_adjacent(mover.cell, to) {
            return Err(ActionError::NotAdjacent);
        }
        if !self.grid.contains(to) {
            return Err(ActionError::OutOfBounds);
        }
        if to != self.rescue_point && self.squad.is_occupied(to) {
            return Err(ActionError::Occupied);
        }

        let terrain = self.obstacles.at(to);
        if terrain.map_or(false, |obstacle| !obstacle.passable_for(mover.role)) {
            return Err(ActionError::Blocked);
        }

        let cost = move_cost(mover.role, terrain.map(|obstacle| obstacle.kind));
        if !mover.can_pay(cost) {
            return Err(ActionError::InsufficientEnergy);
        }
        Ok(cost)
    }

    pub(crate) fn move_survivor(
        &mut self,
        survivor: SurvivorId,
        to: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let cost = self.validate_move(survivor, to)?;
        let mover = self
            .squad
            .get_mut(survivor)
            .ok_or(ActionError::UnknownSurvivor)?;
        let from = mover.cell;
        mover.cell = to;
        mover.spend_energy(cost);
        mover.used = true;
        out_events.push(Event::SurvivorMoved {
            survivor,
            from,
            to,
            energy_spent: cost,
        });
        Ok(())
    }

    /// Orthogonal neighbours the survivor could legally step onto right now.
    pub(crate) fn valid_moves(&self, survivor: SurvivorId) -> Vec<CellCoord> {
        let Some(mover) = self.squad.get(survivor) else {
            return Vec::new();
        };
        self.grid
            .neighbors(mover.cell)
            .filter(|cell| self.validate_move(survivor, *cell).is_ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rescue_grid_core::{
        CellCoord, LevelConfig, ObstacleConfig, ObstacleKind, Role, SurvivorConfig, SurvivorId,
    };

    use super::*;

    fn playing(config: LevelConfig) -> World {
        let mut world = World::from_level(config).expect("valid level");
        world.status = rescue_grid_core::GameStatus::Playing;
        world
    }

    fn open_level() -> LevelConfig {
        LevelConfig::new(4, 4, CellCoord::new(3, 3))
            .with_survivor(Role::Engineer, CellCoord::new(1, 1))
            .with_survivor(Role::Child, CellCoord::new(2, 1))
            .with_weather(false)
    }

    #[test]
    fn diagonal_moves_are_rejected() {
        let world = playing(open_level());
        assert_eq!(
            world.validate_move(SurvivorId::new(0), CellCoord::new(2, 2)),
            Err(ActionError::NotAdjacent)
        );
    }

    #[test]
    fn survivors_cannot_share_cells() {
        let world = playing(open_level());
        assert_eq!(
            world.validate_move(SurvivorId::new(0), CellCoord::new(2, 1)),
            Err(ActionError::Occupied)
        );
    }

    #[test]
    fn narrow_passages_admit_children_only() {
        let level = open_level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::NarrowPassage, CellCoord::new(1, 2)))
            .with_obstacle(ObstacleConfig::new(ObstacleKind::NarrowPassage, CellCoord::new(2, 2)));
        let world = playing(level);
        assert_eq!(
            world.validate_move(SurvivorId::new(0), CellCoord::new(1, 2)),
            Err(ActionError::Blocked)
        );
        assert_eq!(
            world.validate_move(SurvivorId::new(1), CellCoord::new(2, 2)),
            Ok(5)
        );
    }

    #[test]
    fn swamp_doubles_move_cost() {
        let level = open_level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Swamp, CellCoord::new(0, 1)));
        let mut world = playing(level);
        let mut events = Vec::new();
        world
            .move_survivor(SurvivorId::new(0), CellCoord::new(0, 1), &mut events)
            .expect("move");
        assert_eq!(
            events,
            vec![Event::SurvivorMoved {
                survivor: SurvivorId::new(0),
                from: CellCoord::new(1, 1),
                to: CellCoord::new(0, 1),
                energy_spent: 20,
            }]
        );
    }

    #[test]
    fn exhausted_survivors_cannot_move() {
        let mut level = open_level();
        level.survivors[0] = SurvivorConfig {
            max_energy: Some(4),
            ..SurvivorConfig::new(Role::Engineer, CellCoord::new(1, 1))
        };
        let world = playing(level);
        assert_eq!(
            world.validate_move(SurvivorId::new(0), CellCoord::new(1, 0)),
            Err(ActionError::InsufficientEnergy)
        );
    }

    #[test]
    fn valid_moves_exclude_blocked_and_occupied_cells() {
        let level = open_level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(1, 0)));
        let world = playing(level);
        assert_eq!(
            world.valid_moves(SurvivorId::new(0)),
            vec![CellCoord::new(1, 2), CellCoord::new(0, 1)]
        );
    }

    #[test]
    fn survivors_act_once_per_turn() {
        let mut world = playing(open_level());
        let mut events = Vec::new();
        world
            .move_survivor(SurvivorId::new(0), CellCoord::new(1, 0), &mut events)
            .expect("first move");
        assert_eq!(
            world.move_survivor(SurvivorId::new(0), CellCoord::new(0, 0), &mut events),
            Err(ActionError::AlreadyActed)
        );
        assert!(world.valid_moves(SurvivorId::new(0)).is_empty());
    }
}
