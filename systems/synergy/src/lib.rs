#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure synergy system that detects two-role combos among available survivors.

use std::collections::BTreeSet;

use rescue_grid_core::{RemovalMethod, Role, SynergyId};

/// Predefined combo unlocking a special removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Synergy {
    /// Identifier of the combo.
    pub id: SynergyId,
    /// Roles that must both be available.
    pub roles: [Role; 2],
    /// Removal method the combo unlocks.
    pub effect: RemovalMethod,
}

/// Every combo known to the game, in discovery-priority order.
pub const SYNERGIES: [Synergy; 4] = [
    Synergy {
        id: SynergyId::HeavyLift,
        roles: [Role::Engineer, Role::Cook],
        effect: RemovalMethod::HeavyLift,
    },
    Synergy {
        id: SynergyId::Scaffold,
        roles: [Role::Engineer, Role::Child],
        effect: RemovalMethod::Scaffold,
    },
    Synergy {
        id: SynergyId::Smother,
        roles: [Role::Cook, Role::Medic],
        effect: RemovalMethod::Smother,
    },
    Synergy {
        id: SynergyId::SafeDefuse,
        roles: [Role::Engineer, Role::Medic],
        effect: RemovalMethod::SafeDefuse,
    },
];

/// Looks up the definition of a combo.
#[must_use]
pub fn synergy(id: SynergyId) -> Synergy {
    match id {
        SynergyId::HeavyLift => SYNERGIES[0],
        SynergyId::Scaffold => SYNERGIES[1],
        SynergyId::Smother => SYNERGIES[2],
        SynergyId::SafeDefuse => SYNERGIES[3],
    }
}

/// Returns every combo whose roles are all present in `roles`.
///
/// Callers pass the roles of survivors that are still unused this turn.
#[must_use]
pub fn available_synergies<I>(roles: I) -> Vec<Synergy>
where
    I: IntoIterator<Item = Role>,
{
    let present: BTreeSet<Role> = roles.into_iter().collect();
    SYNERGIES
        .iter()
        .copied()
        .filter(|combo| combo.roles.iter().all(|role| present.contains(role)))
        .collect()
}

/// Set of combos discovered during a level. Only ever grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynergyLedger {
    discovered: BTreeSet<SynergyId>,
}

impl SynergyLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a discovery, returning `true` only the first time.
    pub fn record(&mut self, id: SynergyId) -> bool {
        self.discovered.insert(id)
    }

    /// Discovered combos in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = SynergyId> + '_ {
        self.discovered.iter().copied()
    }
}
