//! Target populations and effective deficits.

use super::config::SchedulerConfig;
use crate::archetype::Archetype;
use crate::world::{RemoteSite, ThreatLevel, WorldState};

/// Remote sites the colony may currently operate, in inventory order.
///
/// A site is eligible when it is neither hostile nor occupied and its
/// intel is no older than the configured maximum age. The count is capped
/// by development tier.
pub fn eligible_sites<'w>(world: &'w WorldState, config: &SchedulerConfig) -> Vec<&'w RemoteSite> {
    let policy = &config.remote;
    if world.development.tier < policy.min_tier {
        return Vec::new();
    }
    let limit = policy.sites_per_tier as usize * world.development.tier.saturating_sub(1) as usize;
    world
        .remote_sites
        .iter()
        .filter(|s| !s.hostile && !s.occupied && s.age(world.tick) <= policy.max_intel_age)
        .take(limit)
        .collect()
}

/// Whether any known site has stale intel, or none is known at all.
pub fn intel_is_stale(world: &WorldState, config: &SchedulerConfig) -> bool {
    world.remote_sites.is_empty()
        || world
            .remote_sites
            .iter()
            .any(|s| s.age(world.tick) > config.remote.max_intel_age)
}

fn threat_index(level: ThreatLevel) -> usize {
    match level {
        ThreatLevel::None => 0,
        ThreatLevel::Low => 1,
        ThreatLevel::Medium => 2,
        ThreatLevel::High => 3,
        ThreatLevel::Critical => 4,
    }
}

/// Desired population of `archetype` in the current world.
pub fn target_count(archetype: Archetype, world: &WorldState, config: &SchedulerConfig) -> u32 {
    let t = &config.targets;
    let nodes = world.structures.nodes.len() as u32;
    let tier = world.development.tier;
    let reserve = world.economy.reserve;

    match archetype {
        Archetype::Gatherer => {
            let per_node = if tier < t.early_tier {
                t.gatherers_per_node_early
            } else {
                t.gatherers_per_node
            };
            (nodes * per_node).max(1)
        }
        Archetype::Transporter => {
            let relays_ready = world.structures.relay_points >= t.relay_min_points
                && reserve >= t.relay_reserve_threshold;
            if relays_ready {
                1
            } else {
                (nodes * t.transporters_per_node).max(1) + u32::from(world.structures.has_storage)
            }
        }
        Archetype::RelayOperator => u32::from(
            world.structures.relay_points >= t.relay_min_points
                && reserve >= t.relay_reserve_threshold,
        ),
        Archetype::Upgrader => {
            if tier >= 8 {
                1
            } else {
                let ceiling = t.max_upgraders.min(u32::from(tier.max(1)));
                ceiling.min(1 + reserve / t.reserve_per_upgrader)
            }
        }
        Archetype::Builder => {
            if world.construction.is_empty() {
                0
            } else {
                t.max_builders
                    .min(1 + world.construction.remaining_progress / t.progress_per_builder)
            }
        }
        Archetype::Defender | Archetype::RangedDefender => {
            t.defenders_by_level[threat_index(world.threat.level)]
        }
        Archetype::Healer => {
            let needed = world.threat.hostiles.healers > 0 || world.threat.level >= ThreatLevel::High;
            if !needed {
                0
            } else if world.threat.level == ThreatLevel::Critical {
                2
            } else {
                1
            }
        }
        Archetype::RemoteGatherer => eligible_sites(world, config)
            .iter()
            .map(|s| s.source_count)
            .sum(),
        Archetype::RemoteTransporter => eligible_sites(world, config)
            .iter()
            .filter(|s| world.assignments.at_site(&s.name, Archetype::RemoteGatherer) > 0)
            .map(|s| s.source_count)
            .sum(),
        Archetype::Reserver => {
            if tier < config.remote.reserver_min_tier {
                0
            } else {
                eligible_sites(world, config).len() as u32
            }
        }
        Archetype::Scout => {
            if tier >= config.remote.min_tier && intel_is_stale(world, config) {
                1
            } else {
                0
            }
        }
        Archetype::Claimer => {
            let d = &world.development;
            let room_to_grow = d.owned_colonies < d.colony_ceiling;
            let claimable = eligible_sites(world, config).iter().any(|s| s.claimable);
            u32::from(tier >= config.remote.claimer_min_tier && room_to_grow && claimable)
        }
    }
}

/// `target - live + about_to_expire`; may be negative.
pub fn effective_deficit(archetype: Archetype, world: &WorldState, config: &SchedulerConfig) -> i64 {
    let target = i64::from(target_count(archetype, world, config));
    let live = i64::from(world.roster.count(archetype));
    let expiring = i64::from(world.roster.expiring(archetype));
    target - live + expiring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;
    use crate::store::AssignmentRecord;
    use crate::world::{AssignmentTable, Roster};

    fn base_world() -> WorldState {
        let mut world = WorldState::default();
        world.tick = 2_000;
        world.structures.nodes = vec![NodeId::new("n1"), NodeId::new("n2")];
        world
    }

    #[test]
    fn test_gatherer_target_scales_with_tier() {
        let mut world = base_world();
        world.development.tier = 1;
        assert_eq!(target_count(Archetype::Gatherer, &world, &SchedulerConfig::default()), 4);
        world.development.tier = 3;
        assert_eq!(target_count(Archetype::Gatherer, &world, &SchedulerConfig::default()), 2);
        world.structures.nodes.clear();
        assert_eq!(target_count(Archetype::Gatherer, &world, &SchedulerConfig::default()), 1);
    }

    #[test]
    fn test_deficit_counts_expiring_workers() {
        let mut world = base_world();
        world.development.tier = 3;
        world.roster = Roster::new().with(Archetype::Gatherer, 2).with_expiring(Archetype::Gatherer, 1);
        let config = SchedulerConfig::default();
        assert_eq!(effective_deficit(Archetype::Gatherer, &world, &config), 1);
    }

    #[test]
    fn test_deficit_may_be_negative() {
        let mut world = base_world();
        world.development.tier = 3;
        world.roster = Roster::new().with(Archetype::Gatherer, 5);
        assert_eq!(effective_deficit(Archetype::Gatherer, &world, &SchedulerConfig::default()), -3);
    }

    #[test]
    fn test_builder_target_zero_without_backlog() {
        let mut world = base_world();
        let config = SchedulerConfig::default();
        assert_eq!(target_count(Archetype::Builder, &world, &config), 0);
        world.construction.sites = 2;
        world.construction.remaining_progress = 12_000;
        assert_eq!(target_count(Archetype::Builder, &world, &config), 3);
    }

    #[test]
    fn test_eligible_sites_filters_and_caps() {
        let mut world = base_world();
        world.development.tier = 2;
        let mut hostile = RemoteSite::new("hostile", 2, 1_900);
        hostile.hostile = true;
        world.remote_sites = vec![
            hostile,
            RemoteSite::new("stale", 2, 0),
            RemoteSite::new("a", 1, 1_900),
            RemoteSite::new("b", 2, 1_950),
        ];
        let config = SchedulerConfig::default();
        let sites: Vec<_> = eligible_sites(&world, &config)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(sites, vec!["a"]);
        assert!(intel_is_stale(&world, &config));
    }

    #[test]
    fn test_remote_transporter_needs_gatherer_assignment() {
        let mut world = base_world();
        world.development.tier = 3;
        world.remote_sites = vec![RemoteSite::new("a", 2, 1_900), RemoteSite::new("b", 1, 1_900)];
        world.roster = Roster::new().with(Archetype::RemoteGatherer, 1);
        let config = SchedulerConfig::default();
        assert_eq!(target_count(Archetype::RemoteGatherer, &world, &config), 3);
        assert_eq!(target_count(Archetype::RemoteTransporter, &world, &config), 0);

        world.assignments = AssignmentTable::new(vec![AssignmentRecord::RemoteSite {
            worker: "remote_gatherer-0".into(),
            archetype: Archetype::RemoteGatherer,
            site: "b".into(),
        }]);
        assert_eq!(target_count(Archetype::RemoteTransporter, &world, &config), 1);
    }

    #[test]
    fn test_defense_target_by_level() {
        let mut world = base_world();
        let config = SchedulerConfig::default();
        assert_eq!(target_count(Archetype::Defender, &world, &config), 0);
        world.threat.level = ThreatLevel::Medium;
        assert_eq!(target_count(Archetype::Defender, &world, &config), 2);
        assert_eq!(target_count(Archetype::Healer, &world, &config), 0);
        world.threat.level = ThreatLevel::High;
        assert_eq!(target_count(Archetype::Healer, &world, &config), 1);
    }
}
