//! Chain-reaction target resolution and propagation.

use std::collections::{BTreeSet, VecDeque};

use rescue_grid_core::{
    CellCoord, ChainReaction, DestructionCause, Event, ObstacleId, ObstacleKind,
};
use tracing::info;

use crate::{
    obstacles::{Obstacle, ObstacleRegistry},
    survivors::Squad,
};

/// Health lost by survivors caught in a blast.
const EXPLOSION_DAMAGE: u32 = 25;
/// Seconds a fire created by spreading burns before it dies out.
pub(crate) const FIRE_BURNOUT_SECONDS: u32 = 20;

#[derive(Clone, Debug)]
struct PendingReaction {
    source: ObstacleId,
    origin: CellCoord,
    reaction: ChainReaction,
}

/// Fires `reactions` originating from `source` at `origin`.
///
/// Obstacles destroyed along the way fire their own reaction in turn; every
/// obstacle fires at most once. Returns the number of obstacles destroyed or
/// transformed.
pub(crate) fn resolve(
    obstacles: &mut ObstacleRegistry,
    squad: &mut Squad,
    source: ObstacleId,
    origin: CellCoord,
    reactions: Vec<ChainReaction>,
    out_events: &mut Vec<Event>,
) -> u32 {
    let mut queue: VecDeque<PendingReaction> = reactions
        .into_iter()
        .map(|reaction| PendingReaction {
            source,
            origin,
            reaction,
        })
        .collect();
    let mut fired: BTreeSet<ObstacleId> = BTreeSet::new();
    let _ = fired.insert(source);
    let mut total = 0;

    while let Some(pending) = queue.pop_front() {
        let hits = targets(obstacles, pending.source, pending.origin, &pending.reaction);
        let mut count = 0;

        if let ChainReaction::Explosion { radius } = pending.reaction {
            damage_survivors(squad, pending.origin, radius, out_events);
        }

        for target in hits {
            if matches!(pending.reaction, ChainReaction::SpreadFire { .. }) {
                if let Some(burnt) = ignite(obstacles, target, out_events) {
                    count += 1;
                    if let Some(reaction) = burnt.chain_reaction {
                        if fired.insert(burnt.id) {
                            queue.push_back(PendingReaction {
                                source: burnt.id,
                                origin: burnt.cell,
                                reaction,
                            });
                        }
                    }
                }
                continue;
            }

            let Some(destroyed) = obstacles.remove(target) else {
                continue;
            };
            count += 1;
            out_events.push(Event::ObstacleDestroyed {
                obstacle: destroyed.id,
                kind: destroyed.kind,
                cause: DestructionCause::ChainReaction {
                    source: pending.source,
                },
            });
            if let Some(reaction) = destroyed.chain_reaction {
                if fired.insert(destroyed.id) {
                    queue.push_back(PendingReaction {
                        source: destroyed.id,
                        origin: destroyed.cell,
                        reaction,
                    });
                }
            }
        }

        info!(
            source = pending.source.get(),
            reaction = ?pending.reaction,
            count,
            "chain reaction fired"
        );
        out_events.push(Event::ChainReactionFired {
            source: pending.source,
            count,
        });
        total += count;
    }

    total
}

/// Obstacles affected by a reaction, in identifier order.
pub(crate) fn targets(
    obstacles: &ObstacleRegistry,
    source: ObstacleId,
    origin: CellCoord,
    reaction: &ChainReaction,
) -> Vec<ObstacleId> {
    let within = |cell: CellCoord, range: u32| origin.manhattan_distance(cell) <= range;
    obstacles
        .iter()
        .filter(|obstacle| obstacle.id != source)
        .filter(|obstacle| match reaction {
            ChainReaction::Explosion { radius } => within(obstacle.cell, *radius),
            ChainReaction::Flood { range } => {
                obstacle.kind == ObstacleKind::Fire
                    && obstacle.cell.row() > origin.row()
                    && obstacle.cell.row() - origin.row() <= *range
                    && obstacle.cell.column().abs_diff(origin.column()) <= 1
            }
            ChainReaction::Extinguish { range } => {
                obstacle.kind == ObstacleKind::Fire && within(obstacle.cell, *range)
            }
            ChainReaction::MeltIce { range } => {
                obstacle.kind == ObstacleKind::Ice && within(obstacle.cell, *range)
            }
            ChainReaction::SpreadFire { range } => {
                let distance = origin.manhattan_distance(obstacle.cell);
                obstacle.kind == ObstacleKind::Tree && distance >= 1 && distance <= *range
            }
            ChainReaction::Collapse { targets } => targets.contains(&obstacle.id),
        })
        .map(|obstacle| obstacle.id)
        .collect()
}

/// Turns a tree into a fire on the same cell, returning the burnt tree.
///
/// A reaction declared on the tree is left to the caller to fire.
pub(crate) fn ignite(
    obstacles: &mut ObstacleRegistry,
    tree: ObstacleId,
    out_events: &mut Vec<Event>,
) -> Option<Obstacle> {
    if obstacles.get(tree)?.kind != ObstacleKind::Tree {
        return None;
    }
    let burnt = obstacles.remove(tree)?;
    out_events.push(Event::ObstacleDestroyed {
        obstacle: burnt.id,
        kind: burnt.kind,
        cause: DestructionCause::Transformed,
    });

    if let Some(fire) = obstacles.spawn(ObstacleKind::Fire, burnt.cell) {
        if let Some(obstacle) = obstacles.get_mut(fire) {
            obstacle.natural_decay_seconds = Some(FIRE_BURNOUT_SECONDS);
        }
        out_events.push(Event::ObstacleSpawned {
            obstacle: fire,
            kind: ObstacleKind::Fire,
            cell: burnt.cell,
        });
    }
    Some(burnt)
}

fn damage_survivors(squad: &mut Squad, origin: CellCoord, radius: u32, out_events: &mut Vec<Event>) {
    for survivor in squad.iter_mut() {
        if origin.manhattan_distance(survivor.cell) > radius {
            continue;
        }
        let amount = survivor.damage(EXPLOSION_DAMAGE);
        if amount > 0 {
            out_events.push(Event::SurvivorDamaged {
                survivor: survivor.id,
                amount,
                health: survivor.health,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn registry_with(kinds: &[(ObstacleKind, CellCoord)]) -> ObstacleRegistry {
        let mut registry = ObstacleRegistry::new(Grid::new(6, 6));
        for (kind, cell) in kinds {
            assert!(registry.spawn(*kind, *cell).is_some());
        }
        registry
    }

    fn empty_squad() -> Squad {
        Squad::new(Vec::new())
    }

    #[test]
    fn explosion_destroys_everything_within_radius() {
        let mut registry = registry_with(&[
            (ObstacleKind::Tree, CellCoord::new(2, 1)),
            (ObstacleKind::Rock, CellCoord::new(3, 2)),
            (ObstacleKind::Rock, CellCoord::new(4, 4)),
        ]);
        let mut events = Vec::new();
        let count = resolve(
            &mut registry,
            &mut empty_squad(),
            ObstacleId::new(99),
            CellCoord::new(2, 2),
            vec![ChainReaction::Explosion { radius: 1 }],
            &mut events,
        );
        assert_eq!(count, 2);
        assert_eq!(registry.iter().count(), 1);
        assert!(registry.at(CellCoord::new(4, 4)).is_some());
    }

    #[test]
    fn second_explosion_on_cleared_area_is_a_no_op() {
        let mut registry = registry_with(&[(ObstacleKind::Tree, CellCoord::new(1, 2))]);
        let mut squad = empty_squad();
        let mut events = Vec::new();
        let origin = CellCoord::new(2, 2);
        let reaction = ChainReaction::Explosion { radius: 1 };

        let first = resolve(
            &mut registry,
            &mut squad,
            ObstacleId::new(99),
            origin,
            vec![reaction.clone()],
            &mut events,
        );
        let remaining: Vec<_> = registry.iter().map(|obstacle| obstacle.id).collect();
        let second = resolve(
            &mut registry,
            &mut squad,
            ObstacleId::new(99),
            origin,
            vec![reaction],
            &mut events,
        );

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(
            registry.iter().map(|obstacle| obstacle.id).collect::<Vec<_>>(),
            remaining
        );
    }

    #[test]
    fn flood_reaches_fires_below_only() {
        let registry = registry_with(&[
            (ObstacleKind::Fire, CellCoord::new(2, 3)),
            (ObstacleKind::Fire, CellCoord::new(3, 4)),
            (ObstacleKind::Fire, CellCoord::new(4, 3)),
            (ObstacleKind::Fire, CellCoord::new(2, 1)),
            (ObstacleKind::Fire, CellCoord::new(2, 5)),
            (ObstacleKind::Rock, CellCoord::new(2, 4)),
        ]);
        let hits = targets(
            &registry,
            ObstacleId::new(99),
            CellCoord::new(2, 2),
            &ChainReaction::Flood { range: 2 },
        );
        assert_eq!(hits, vec![ObstacleId::new(0), ObstacleId::new(1)]);
    }

    #[test]
    fn extinguish_and_melt_select_their_kind() {
        let registry = registry_with(&[
            (ObstacleKind::Fire, CellCoord::new(1, 1)),
            (ObstacleKind::Ice, CellCoord::new(2, 1)),
            (ObstacleKind::Fire, CellCoord::new(5, 5)),
        ]);
        let origin = CellCoord::new(1, 2);
        assert_eq!(
            targets(&registry, ObstacleId::new(99), origin, &ChainReaction::Extinguish { range: 2 }),
            vec![ObstacleId::new(0)]
        );
        assert_eq!(
            targets(&registry, ObstacleId::new(99), origin, &ChainReaction::MeltIce { range: 2 }),
            vec![ObstacleId::new(1)]
        );
    }

    #[test]
    fn spread_fire_turns_adjacent_trees_into_fire() {
        let mut registry = registry_with(&[
            (ObstacleKind::Tree, CellCoord::new(1, 0)),
            (ObstacleKind::Tree, CellCoord::new(3, 3)),
        ]);
        let mut events = Vec::new();
        let count = resolve(
            &mut registry,
            &mut empty_squad(),
            ObstacleId::new(99),
            CellCoord::new(1, 1),
            vec![ChainReaction::SpreadFire { range: 1 }],
            &mut events,
        );
        assert_eq!(count, 1);
        let fire = registry.at(CellCoord::new(1, 0)).expect("fire");
        assert_eq!(fire.kind, ObstacleKind::Fire);
        assert_eq!(fire.natural_decay_seconds, Some(FIRE_BURNOUT_SECONDS));
        assert_eq!(
            registry.at(CellCoord::new(3, 3)).map(|obstacle| obstacle.kind),
            Some(ObstacleKind::Tree)
        );
    }

    #[test]
    fn burning_trees_fire_their_declared_reaction() {
        let mut registry = registry_with(&[
            (ObstacleKind::Tree, CellCoord::new(1, 0)),
            (ObstacleKind::Rock, CellCoord::new(4, 4)),
        ]);
        if let Some(tree) = registry.get_mut(ObstacleId::new(0)) {
            tree.chain_reaction = Some(ChainReaction::Collapse {
                targets: vec![ObstacleId::new(1)],
            });
        }
        let mut events = Vec::new();
        let count = resolve(
            &mut registry,
            &mut empty_squad(),
            ObstacleId::new(99),
            CellCoord::new(1, 1),
            vec![ChainReaction::SpreadFire { range: 1 }],
            &mut events,
        );
        assert_eq!(count, 2);
        assert!(!registry.contains(ObstacleId::new(1)));
        assert_eq!(
            registry.at(CellCoord::new(1, 0)).map(|obstacle| obstacle.kind),
            Some(ObstacleKind::Fire)
        );
        assert!(events.contains(&Event::ChainReactionFired {
            source: ObstacleId::new(0),
            count: 1,
        }));
    }

    #[test]
    fn collapse_targets_named_obstacles() {
        let mut registry = registry_with(&[
            (ObstacleKind::Rock, CellCoord::new(0, 0)),
            (ObstacleKind::Rock, CellCoord::new(5, 5)),
        ]);
        let mut events = Vec::new();
        let count = resolve(
            &mut registry,
            &mut empty_squad(),
            ObstacleId::new(99),
            CellCoord::new(3, 3),
            vec![ChainReaction::Collapse {
                targets: vec![ObstacleId::new(1), ObstacleId::new(42)],
            }],
            &mut events,
        );
        assert_eq!(count, 1);
        assert!(registry.contains(ObstacleId::new(0)));
        assert!(!registry.contains(ObstacleId::new(1)));
    }

    #[test]
    fn destroyed_explosives_detonate_in_turn() {
        let mut registry = ObstacleRegistry::new(Grid::new(6, 1));
        for column in 1..5 {
            assert!(registry.insert(Obstacle::new(
                ObstacleId::new(column),
                ObstacleKind::Explosive,
                CellCoord::new(column, 0),
            )));
        }
        let mut events = Vec::new();
        let count = resolve(
            &mut registry,
            &mut empty_squad(),
            ObstacleId::new(0),
            CellCoord::new(0, 0),
            vec![ChainReaction::Explosion { radius: 1 }],
            &mut events,
        );
        assert_eq!(count, 4);
        assert_eq!(registry.iter().count(), 0);
        let fired = events
            .iter()
            .filter(|event| matches!(event, Event::ChainReactionFired { .. }))
            .count();
        assert_eq!(fired, 5);
    }
}
