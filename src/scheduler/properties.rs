//! Property tests over randomly generated colony snapshots.

use super::config::SchedulerConfig;
use super::runner::plan;
use crate::archetype::{Archetype, ArchetypeCategory};
use crate::build::ArchetypeCatalog;
use crate::ids::{ColonyId, NodeId};
use crate::world::{
    EconomySnapshot, EmergencyFlags, EmergencyReason, HostileComposition, RemoteSite, Roster,
    StructureInventory, ThreatLevel, ThreatSnapshot, WorldState,
};
use proptest::prelude::*;
use std::ops::Range;

const LEVELS: [ThreatLevel; 5] = [
    ThreatLevel::None,
    ThreatLevel::Low,
    ThreatLevel::Medium,
    ThreatLevel::High,
    ThreatLevel::Critical,
];

prop_compose! {
    fn arb_site(tick: u64)(
        sources in 1u32..4,
        age in 0u64..3_000,
        hostile in any::<bool>(),
        occupied in any::<bool>(),
        claimable in any::<bool>(),
        reservation in 0u32..3_000,
    ) -> RemoteSite {
        let name = format!("site-{sources}-{age}");
        let mut site = RemoteSite::new(name, sources, tick.saturating_sub(age));
        site.hostile = hostile;
        site.occupied = occupied;
        site.claimable = claimable;
        site.reservation_ticks = reservation;
        site
    }
}

prop_compose! {
    fn arb_roster(gatherer_range: Range<u32>, transporter_range: Range<u32>)(
        counts in prop::collection::vec(0u32..4, Archetype::ALL.len()),
        gatherers in gatherer_range,
        transporters in transporter_range,
    ) -> Roster {
        let mut roster = Roster::new()
            .with(Archetype::Gatherer, gatherers)
            .with(Archetype::Transporter, transporters);
        for (&archetype, &count) in Archetype::ALL.iter().zip(counts.iter()).skip(2) {
            roster = roster.with(archetype, count);
        }
        roster
    }
}

prop_compose! {
    fn arb_economy()(
        available in 0u32..3_000,
        headroom in 0u32..2_000,
        income in prop_oneof![Just(0.0), 0.1f64..40.0],
        reserve in 0u32..300_000,
        trend in -50.0f64..50.0,
    ) -> EconomySnapshot {
        EconomySnapshot {
            available,
            capacity: available + headroom,
            reserve,
            income_per_tick: income,
            reserve_trend: trend,
            theoretical_income: 0.0,
        }
    }
}

prop_compose! {
    fn arb_threat()(
        level in 0usize..5,
        melee in 0u32..4,
        ranged in 0u32..4,
        healers in 0u32..3,
        strength in 0.0f64..5_000.0,
    ) -> ThreatSnapshot {
        if level == 0 {
            return ThreatSnapshot::default();
        }
        ThreatSnapshot {
            level: LEVELS[level],
            hostiles: HostileComposition { melee, ranged, healers, dismantlers: 0 },
            strength,
        }
    }
}

prop_compose! {
    fn arb_structures()(
        nodes in 0usize..4,
        has_storage in any::<bool>(),
        relay_points in 0u32..3,
        defense_towers in 0u32..3,
    ) -> StructureInventory {
        StructureInventory {
            facilities: Vec::new(),
            defense_towers,
            has_storage,
            relay_points,
            nodes: (0..nodes).map(|i| NodeId::new(format!("n{i}"))).collect(),
        }
    }
}

prop_compose! {
    fn arb_world_with(gatherer_range: Range<u32>, transporter_range: Range<u32>)(
        roster in arb_roster(gatherer_range, transporter_range),
        economy in arb_economy(),
        threat in arb_threat(),
        structures in arb_structures(),
        tier in 1u8..=8,
        sites in 0u32..4,
        progress in 0u32..20_000,
        remote in prop::collection::vec(arb_site(10_000), 0..4),
        damaged in any::<bool>(),
    ) -> WorldState {
        let mut world = WorldState::default();
        world.colony = ColonyId::new("W1N1");
        world.tick = 10_000;
        world.development.tier = tier;
        world.development.colony_ceiling = 3;
        world.economy = economy;
        world.economy.theoretical_income = structures.nodes.len() as f64 * 10.0;
        world.threat = threat;
        world.structures = structures;
        world.construction.sites = sites;
        world.construction.remaining_progress = if sites == 0 { 0 } else { progress };
        world.remote_sites = remote;

        let mut reasons = Vec::new();
        if roster.count(Archetype::Gatherer) == 0 {
            reasons.push(EmergencyReason::NoProductionWorkers);
        }
        if damaged {
            reasons.push(EmergencyReason::FacilityCriticallyDamaged);
        }
        world.emergency = EmergencyFlags::new(reasons);
        world.roster = roster;
        world
    }
}

fn arb_world() -> impl Strategy<Value = WorldState> {
    arb_world_with(0..5, 0..4)
}

fn selected(world: &WorldState) -> Option<crate::scheduler::Candidate> {
    plan(world, &ArchetypeCatalog::default(), &SchedulerConfig::default()).into_admitted()
}

fn minimum_cost(archetype: Archetype) -> u32 {
    ArchetypeCatalog::default()
        .get(archetype)
        .map_or(0, |c| c.minimum_cost)
}

proptest! {
    #[test]
    fn prop_bootstrap_selects_gatherer(world in arb_world_with(0..1, 0..4)) {
        prop_assume!(world.economy.available >= minimum_cost(Archetype::Gatherer));
        let c = selected(&world);
        prop_assert!(c.is_some());
        prop_assert_eq!(c.map(|c| c.archetype), Some(Archetype::Gatherer));
    }

    #[test]
    fn prop_missing_transporter_is_selected(world in arb_world_with(1..5, 0..1)) {
        prop_assume!(world.economy.available >= minimum_cost(Archetype::Transporter));
        let c = selected(&world);
        prop_assert_eq!(c.map(|c| c.archetype), Some(Archetype::Transporter));
    }

    #[test]
    fn prop_no_remote_without_staffed_economy(world in arb_world_with(0..3, 0..2)) {
        let decision = plan(&world, &ArchetypeCatalog::default(), &SchedulerConfig::default());
        if !world.home_economy_staffed() {
            prop_assert!(decision
                .candidates
                .iter()
                .all(|c| c.archetype.category() != ArchetypeCategory::Remote));
        }
    }

    #[test]
    fn prop_no_defense_without_threat(mut world in arb_world()) {
        world.threat.level = ThreatLevel::None;
        if let Some(c) = selected(&world) {
            prop_assert_ne!(c.archetype.category(), ArchetypeCategory::Defense);
        }
    }

    #[test]
    fn prop_no_builder_without_backlog(mut world in arb_world()) {
        world.construction.sites = 0;
        world.construction.remaining_progress = 0;
        if let Some(c) = selected(&world) {
            prop_assert_ne!(c.archetype, Archetype::Builder);
        }
    }

    #[test]
    fn prop_selection_is_affordable(world in arb_world()) {
        if let Some(c) = selected(&world) {
            prop_assert!(c.cost() <= world.economy.available);
            prop_assert!(c.utility.is_finite() && c.utility > 0.0);
        }
    }

    #[test]
    fn prop_planning_is_deterministic_and_read_only(world in arb_world()) {
        let before = world.clone();
        let catalog = ArchetypeCatalog::default();
        let config = SchedulerConfig::default();
        let first = plan(&world, &catalog, &config);
        let second = plan(&world, &catalog, &config);
        prop_assert_eq!(first, second);
        prop_assert_eq!(world, before);
    }

    #[test]
    fn prop_facility_admissions_stay_within_budget(world in arb_world(), facilities in 1usize..4) {
        let catalog = ArchetypeCatalog::default();
        let config = SchedulerConfig::default();
        let available = world.economy.available;
        let mut state = world;
        let mut spent = 0u32;
        for _ in 0..facilities {
            let Some(c) = plan(&state, &catalog, &config).into_admitted() else {
                break;
            };
            spent += c.cost();
            state = state.after_admission(c.archetype, c.cost(), None);
        }
        prop_assert!(spent <= available);
    }

    #[test]
    fn prop_utilities_finite_and_ranked(world in arb_world()) {
        let decision = plan(&world, &ArchetypeCatalog::default(), &SchedulerConfig::default());
        for pair in decision.candidates.windows(2) {
            prop_assert!(pair[0].utility + 1e-9 >= pair[1].utility);
        }
        prop_assert!(decision.candidates.iter().all(|c| c.utility.is_finite()));
    }
}
