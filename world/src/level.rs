//! Level configuration validation.

use std::collections::{BTreeMap, BTreeSet};

use rescue_grid_core::{CellCoord, LevelConfig, ObstacleId};
use thiserror::Error;

use crate::{grid::Grid, obstacles::Obstacle};

/// Largest accepted width or height of a level grid.
pub const MAX_GRID_DIMENSION: u32 = 64;

/// Reasons a level configuration cannot be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The grid has no cells.
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The grid exceeds the supported dimensions.
    #[error("grid {width}x{height} exceeds the {max}x{max} limit", max = MAX_GRID_DIMENSION)]
    GridTooLarge {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The level declares no survivors.
    #[error("level has no survivors")]
    NoSurvivors,
    /// The rescue point lies outside the grid.
    #[error("rescue point ({column}, {row}) lies outside the grid")]
    RescuePointOutOfBounds {
        /// Column of the rescue point.
        column: u32,
        /// Row of the rescue point.
        row: u32,
    },
    /// A survivor starts outside the grid.
    #[error("survivor {index} starts outside the grid")]
    SurvivorOutOfBounds {
        /// Position of the survivor in the configuration.
        index: usize,
    },
    /// Two survivors start on the same cell away from the rescue point.
    #[error("survivors share cell ({column}, {row})")]
    SurvivorsOverlap {
        /// Column of the shared cell.
        column: u32,
        /// Row of the shared cell.
        row: u32,
    },
    /// A survivor starts on an obstacle it cannot stand on.
    #[error("survivor {index} starts on an impassable obstacle")]
    SurvivorOnObstacle {
        /// Position of the survivor in the configuration.
        index: usize,
    },
    /// An obstacle lies outside the grid.
    #[error("obstacle {index} lies outside the grid")]
    ObstacleOutOfBounds {
        /// Position of the obstacle in the configuration.
        index: usize,
    },
    /// Two obstacles occupy the same cell.
    #[error("obstacles share cell ({column}, {row})")]
    ObstaclesOverlap {
        /// Column of the shared cell.
        column: u32,
        /// Row of the shared cell.
        row: u32,
    },
    /// An obstacle depends on an obstacle that does not exist or on itself.
    #[error("obstacle {obstacle} is blocked by unknown obstacle {blocker}")]
    UnknownDependency {
        /// Obstacle declaring the dependency.
        obstacle: u32,
        /// Identifier it depends on.
        blocker: u32,
    },
    /// Obstacles lock each other through a circular dependency.
    #[error("obstacle {obstacle} is part of a dependency cycle")]
    DependencyCycle {
        /// Obstacle where the cycle was detected.
        obstacle: u32,
    },
}

/// Rejects configurations that would violate the world's invariants.
pub(crate) fn validate(config: &LevelConfig) -> Result<Grid, LevelError> {
    if config.width == 0 || config.height == 0 {
        return Err(LevelError::EmptyGrid {
            width: config.width,
            height: config.height,
        });
    }
    if config.width > MAX_GRID_DIMENSION || config.height > MAX_GRID_DIMENSION {
        return Err(LevelError::GridTooLarge {
            width: config.width,
            height: config.height,
        });
    }
    let grid = Grid::new(config.width, config.height);

    if config.survivors.is_empty() {
        return Err(LevelError::NoSurvivors);
    }
    if !grid.contains(config.rescue_point) {
        return Err(LevelError::RescuePointOutOfBounds {
            column: config.rescue_point.column(),
            row: config.rescue_point.row(),
        });
    }

    let mut standing: BTreeSet<CellCoord> = BTreeSet::new();
    for (index, survivor) in config.survivors.iter().enumerate() {
        if !grid.contains(survivor.position) {
            return Err(LevelError::SurvivorOutOfBounds { index });
        }
        if survivor.position != config.rescue_point && !standing.insert(survivor.position) {
            return Err(LevelError::SurvivorsOverlap {
                column: survivor.position.column(),
                row: survivor.position.row(),
            });
        }
    }

    let mut covered: BTreeSet<CellCoord> = BTreeSet::new();
    for (index, obstacle) in config.obstacles.iter().enumerate() {
        if !grid.contains(obstacle.position) {
            return Err(LevelError::ObstacleOutOfBounds { index });
        }
        if !covered.insert(obstacle.position) {
            return Err(LevelError::ObstaclesOverlap {
                column: obstacle.position.column(),
                row: obstacle.position.row(),
            });
        }
    }

    for (index, survivor) in config.survivors.iter().enumerate() {
        let blocked = config
            .obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| obstacle.position == survivor.position)
            .any(|(slot, obstacle)| {
                !Obstacle::new(obstacle_id(slot), obstacle.kind, obstacle.position)
                    .passable_for(survivor.role)
            });
        if blocked {
            return Err(LevelError::SurvivorOnObstacle { index });
        }
    }

    let declared = config.obstacles.len();
    for (index, obstacle) in config.obstacles.iter().enumerate() {
        let own = obstacle_id(index);
        for blocker in &obstacle.blocked_by {
            let known = usize::try_from(blocker.get()).map_or(false, |value| value < declared);
            if !known || *blocker == own {
                return Err(LevelError::UnknownDependency {
                    obstacle: own.get(),
                    blocker: blocker.get(),
                });
            }
        }
    }

    if let Some(obstacle) = find_cycle(config) {
        return Err(LevelError::DependencyCycle {
            obstacle: obstacle.get(),
        });
    }

    Ok(grid)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Open,
    Done,
}

/// First obstacle found on a `blocked_by` cycle, if any.
fn find_cycle(config: &LevelConfig) -> Option<ObstacleId> {
    let edges: BTreeMap<ObstacleId, Vec<ObstacleId>> = config
        .obstacles
        .iter()
        .enumerate()
        .map(|(index, obstacle)| (obstacle_id(index), obstacle.blocked_by.clone()))
        .collect();
    let mut visits: BTreeMap<ObstacleId, Visit> = BTreeMap::new();

    for start in edges.keys() {
        if visits.contains_key(start) {
            continue;
        }
        let mut stack = vec![(*start, 0_usize)];
        let _ = visits.insert(*start, Visit::Open);
        while let Some((node, next)) = stack.pop() {
            let blockers = edges.get(&node).map_or(&[][..], Vec::as_slice);
            let Some(blocker) = blockers.get(next).copied() else {
                let _ = visits.insert(node, Visit::Done);
                continue;
            };
            stack.push((node, next + 1));
            match visits.get(&blocker) {
                Some(Visit::Open) => return Some(blocker),
                Some(Visit::Done) => {}
                None => {
                    let _ = visits.insert(blocker, Visit::Open);
                    stack.push((blocker, 0));
                }
            }
        }
    }
    None
}

/// Identifier assigned to the obstacle declared at `index`.
pub(crate) fn obstacle_id(index: usize) -> ObstacleId {
    ObstacleId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use rescue_grid_core::{ObstacleConfig, ObstacleKind, Role};

    use super::*;

    fn level() -> LevelConfig {
        LevelConfig::new(3, 3, CellCoord::new(2, 2)).with_survivor(Role::Medic, CellCoord::new(0, 0))
    }

    #[test]
    fn accepts_a_minimal_level() {
        assert_eq!(validate(&level()), Ok(Grid::new(3, 3)));
    }

    #[test]
    fn rejects_zero_sized_grid() {
        let config = LevelConfig::new(0, 3, CellCoord::new(0, 0))
            .with_survivor(Role::Medic, CellCoord::new(0, 0));
        assert_eq!(
            validate(&config),
            Err(LevelError::EmptyGrid {
                width: 0,
                height: 3
            })
        );
    }

    #[test]
    fn rejects_levels_without_survivors() {
        let config = LevelConfig::new(3, 3, CellCoord::new(2, 2));
        assert_eq!(validate(&config), Err(LevelError::NoSurvivors));
    }

    #[test]
    fn survivors_may_share_only_the_rescue_point() {
        let shared_rescue = level()
            .with_survivor(Role::Cook, CellCoord::new(2, 2))
            .with_survivor(Role::Child, CellCoord::new(2, 2));
        assert!(validate(&shared_rescue).is_ok());

        let overlapping = level().with_survivor(Role::Cook, CellCoord::new(0, 0));
        assert_eq!(
            validate(&overlapping),
            Err(LevelError::SurvivorsOverlap { column: 0, row: 0 })
        );
    }

    #[test]
    fn rejects_stacked_obstacles() {
        let config = level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(1, 1)))
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Tree, CellCoord::new(1, 1)));
        assert_eq!(
            validate(&config),
            Err(LevelError::ObstaclesOverlap { column: 1, row: 1 })
        );
    }

    #[test]
    fn rejects_dangling_and_self_dependencies() {
        let dangling = level().with_obstacle(
            ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(1, 1))
                .blocked_by(ObstacleId::new(4)),
        );
        assert_eq!(
            validate(&dangling),
            Err(LevelError::UnknownDependency {
                obstacle: 0,
                blocker: 4
            })
        );

        let selfish = level().with_obstacle(
            ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(1, 1))
                .blocked_by(ObstacleId::new(0)),
        );
        assert!(matches!(
            validate(&selfish),
            Err(LevelError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn rejects_oversized_grids_before_allocating() {
        let huge = LevelConfig::new(u32::MAX, u32::MAX, CellCoord::new(0, 0))
            .with_survivor(Role::Child, CellCoord::new(0, 0));
        assert_eq!(
            validate(&huge),
            Err(LevelError::GridTooLarge {
                width: u32::MAX,
                height: u32::MAX
            })
        );
        assert!(crate::World::from_level(huge).is_err());

        let widest = LevelConfig::new(MAX_GRID_DIMENSION, 1, CellCoord::new(0, 0))
            .with_survivor(Role::Child, CellCoord::new(1, 0));
        assert!(validate(&widest).is_ok());
    }

    #[test]
    fn rejects_circular_dependencies() {
        let pair = level()
            .with_obstacle(
                ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(1, 1))
                    .blocked_by(ObstacleId::new(1)),
            )
            .with_obstacle(
                ObstacleConfig::new(ObstacleKind::Tree, CellCoord::new(1, 2))
                    .blocked_by(ObstacleId::new(0)),
            );
        assert!(matches!(
            validate(&pair),
            Err(LevelError::DependencyCycle { .. })
        ));

        let chain = level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(1, 1)))
            .with_obstacle(
                ObstacleConfig::new(ObstacleKind::Tree, CellCoord::new(1, 2))
                    .blocked_by(ObstacleId::new(0)),
            )
            .with_obstacle(
                ObstacleConfig::new(ObstacleKind::Ice, CellCoord::new(2, 1))
                    .blocked_by(ObstacleId::new(0))
                    .blocked_by(ObstacleId::new(1)),
            );
        assert!(validate(&chain).is_ok());
    }

    #[test]
    fn survivors_cannot_start_inside_impassable_obstacles() {
        let on_rock = level()
            .with_obstacle(ObstacleConfig::new(ObstacleKind::Rock, CellCoord::new(0, 0)));
        assert_eq!(
            validate(&on_rock),
            Err(LevelError::SurvivorOnObstacle { index: 0 })
        );

        let child_in_passage = LevelConfig::new(3, 3, CellCoord::new(2, 2))
            .with_survivor(Role::Child, CellCoord::new(0, 0))
            .with_obstacle(ObstacleConfig::new(
                ObstacleKind::NarrowPassage,
                CellCoord::new(0, 0),
            ));
        assert!(validate(&child_in_passage).is_ok());
    }

    #[test]
    fn out_of_bounds_placements_are_reported_by_index() {
        let config = level().with_survivor(Role::Child, CellCoord::new(3, 0));
        assert_eq!(
            validate(&config),
            Err(LevelError::SurvivorOutOfBounds { index: 1 })
        );
    }
}
