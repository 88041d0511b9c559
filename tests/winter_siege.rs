mod common;

use common::{run, set_needs, WorldBuilder};
use std::collections::HashSet;
use wolfpack_core::systems::siege::{RetreatReason, Settlement, SiegeDecision};
use wolfpack_data::{AgentId, PackId, Season, SiegeType, Species, Vec3};
use wolfpack_lib::model::metrics::{SIEGES_ENDED, SIEGES_STARTED};
use wolfpack_lib::model::world::{Identity, Vitals, WolfMind};
use wolfpack_lib::World;

const VILLAGE: Vec3 = Vec3::flat(128.0, 128.0);

/// A pack camped next to a guardless village, ranks already evaluated, with
/// every winter check guaranteed to start a siege.
fn camped_pack(seed: u64, size: usize) -> (World, PackId, Vec<AgentId>, Settlement) {
    let mut world = WorldBuilder::new()
        .with_seed(seed)
        .with_config(|c| {
            c.scheduler.check_interval = 1;
            c.scheduler.base_chance = 1.0;
            c.scheduler.blizzard_chance = 1.0;
            c.hierarchy.bonding_howl = false;
        })
        .build();
    let settlement = world.spawn_settlement(VILLAGE, 4, 8, 0);
    let (pack, members) = world.spawn_pack(VILLAGE + Vec3::flat(30.0, 0.0), size);
    run(&mut world, 1);
    world.climate.season = Season::Winter;
    (world, pack, members, settlement)
}

fn engaged(world: &World, members: &[AgentId]) -> usize {
    world
        .ecs
        .query::<(&Identity, &WolfMind)>()
        .iter()
        .filter(|(_, (identity, mind))| members.contains(&identity.id) && mind.siege.is_engaged())
        .count()
}

fn decision_for(report: &wolfpack_lib::model::world::TickReport, pack: PackId) -> Option<SiegeDecision> {
    report
        .siege_decisions
        .iter()
        .find(|(p, _)| *p == pack)
        .map(|(_, d)| *d)
}

#[test]
fn test_hungry_pack_besieges_nearby_village_in_winter() {
    let (mut world, pack, members, settlement) = camped_pack(21, 4);
    let report = world.update().unwrap();

    let Some(SiegeDecision::Begin(siege)) = decision_for(&report, pack) else {
        panic!("Expected a siege to begin, got {:?}", report.siege_decisions);
    };
    assert_eq!(siege.settlement, settlement);
    assert_eq!(siege.starting_size, 4);
    assert_eq!(siege.starting_guardians, 0);
    assert_eq!(siege.siege_type, SiegeType::FullAssault);
    assert!(siege.alpha_id.is_some());
    assert!(world.is_sieging(pack));
    assert_eq!(engaged(&world, &members), 4);
    assert_eq!(world.metrics.counter(SIEGES_STARTED), 1);
}

#[test]
fn test_no_siege_outside_winter() {
    let (mut world, pack, members, _) = camped_pack(22, 4);
    world.climate.season = Season::Autumn;
    run(&mut world, 100);

    assert!(!world.is_sieging(pack));
    assert_eq!(engaged(&world, &members), 0);
    assert_eq!(world.metrics.counter(SIEGES_STARTED), 0);
}

#[test]
fn test_small_pack_never_sieges() {
    let (mut world, pack, _, _) = camped_pack(23, 2);
    run(&mut world, 100);
    assert!(!world.is_sieging(pack));
}

#[test]
fn test_fed_pack_retreats() {
    let (mut world, pack, members, _) = camped_pack(24, 4);
    world.update().unwrap();
    assert!(world.is_sieging(pack));

    for id in &members {
        set_needs(&mut world, *id, 100.0, 95.0);
    }
    let report = world.update().unwrap();
    assert_eq!(
        decision_for(&report, pack),
        Some(SiegeDecision::Retreat(RetreatReason::Fed))
    );
    assert_eq!(engaged(&world, &members), 0);
    assert_eq!(world.metrics.counter(SIEGES_ENDED), 1);
}

#[test]
fn test_arriving_guardian_forces_retreat() {
    let (mut world, pack, _, _) = camped_pack(25, 4);
    world.update().unwrap();
    assert!(world.is_sieging(pack));

    let golem = Vitals {
        health: 100.0,
        max_health: 100.0,
        ..Default::default()
    };
    world.spawn_agent(Species::IronGolem, VILLAGE, golem);
    let report = world.update().unwrap();
    assert_eq!(
        decision_for(&report, pack),
        Some(SiegeDecision::Retreat(RetreatReason::Reinforced))
    );
    assert!(!world.is_sieging(pack));
}

#[test]
fn test_heavy_losses_force_retreat() {
    let (mut world, pack, members, _) = camped_pack(26, 4);
    world.update().unwrap();
    assert!(world.is_sieging(pack));

    for id in &members[..2] {
        let entity = world.find(*id).unwrap();
        world.ecs.despawn(entity).unwrap();
    }
    let report = world.update().unwrap();
    assert_eq!(
        decision_for(&report, pack),
        Some(SiegeDecision::Retreat(RetreatReason::Casualties))
    );
}

#[test]
fn test_siege_takes_villagers_or_livestock_never_guardians() {
    let (mut world, _, members, _) = camped_pack(27, 4);
    let dwellers: HashSet<AgentId> = world
        .ecs
        .query::<&Identity>()
        .iter()
        .filter(|(_, identity)| identity.species != Species::Wolf)
        .map(|(_, identity)| identity.id)
        .collect();

    let mut kill = None;
    for _ in 0..1_500 {
        let report = world.update().unwrap();
        if let Some(k) = report.kills.first() {
            kill = Some(*k);
            break;
        }
    }
    let (killer, victim) = kill.expect("Siege never took a target");
    assert!(members.contains(&killer));
    assert!(dwellers.contains(&victim));
    assert_eq!(world.count_species(Species::IronGolem), 0);
    assert_gone!(world, victim);
}
