use rescue_grid_core::{RemovalMethod, Role, SynergyId};
use rescue_grid_system_synergy::{available_synergies, SynergyLedger};

#[test]
fn single_role_unlocks_nothing() {
    assert!(available_synergies([Role::Engineer]).is_empty());
    assert!(available_synergies([Role::Cook, Role::Cook]).is_empty());
}

#[test]
fn engineer_and_cook_unlock_heavy_lift() {
    let combos = available_synergies([Role::Cook, Role::Engineer]);
    assert_eq!(combos.len(), 1);
    assert_eq!(combos[0].id, SynergyId::HeavyLift);
    assert_eq!(combos[0].effect, RemovalMethod::HeavyLift);
}

#[test]
fn full_squad_unlocks_every_combo() {
    let ids: Vec<SynergyId> = available_synergies(Role::ALL)
        .into_iter()
        .map(|combo| combo.id)
        .collect();
    assert_eq!(
        ids,
        vec![
            SynergyId::HeavyLift,
            SynergyId::Scaffold,
            SynergyId::Smother,
            SynergyId::SafeDefuse,
        ]
    );
}

#[test]
fn medic_pairs_with_cook_and_engineer() {
    let ids: Vec<SynergyId> = available_synergies([Role::Medic, Role::Cook, Role::Engineer])
        .into_iter()
        .map(|combo| combo.id)
        .collect();
    assert!(ids.contains(&SynergyId::Smother));
    assert!(ids.contains(&SynergyId::SafeDefuse));
    assert!(ids.contains(&SynergyId::HeavyLift));
    assert!(!ids.contains(&SynergyId::Scaffold));
}

#[test]
fn rediscovery_is_a_no_op() {
    let mut ledger = SynergyLedger::new();
    assert_eq!(ledger.iter().count(), 0);
    assert!(ledger.record(SynergyId::Smother));
    assert!(!ledger.record(SynergyId::Smother));
    assert_eq!(ledger.iter().collect::<Vec<_>>(), vec![SynergyId::Smother]);
}
