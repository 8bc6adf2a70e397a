//! Assignment target resolution.
//!
//! Every candidate carries the place it will work. Archetypes that need a
//! concrete site are dropped from a cycle when none can be resolved.

use super::config::SchedulerConfig;
use super::demand::{eligible_sites, intel_is_stale};
use crate::archetype::Archetype;
use crate::ids::{NodeId, SiteName, WorkerId};
use crate::store::AssignmentRecord;
use crate::world::{RemoteSite, WorldState};
use std::fmt;

/// Where a new worker will be put to work.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssignmentTarget {
    /// General duty inside the home colony.
    Home,
    /// A specific home resource node.
    SourceNode(NodeId),
    /// A gatherer with no known node; it picks one once it exists.
    Unassigned,
    /// The relay position next to storage.
    Relay,
    /// A remote expansion site.
    RemoteSite(SiteName),
    /// Scouting; `None` explores blindly when no site is known.
    Explore(Option<SiteName>),
}

impl AssignmentTarget {
    /// The persistent record for `worker` once it has been produced, if
    /// this target is one the store tracks.
    pub fn record_for(&self, worker: WorkerId, archetype: Archetype) -> Option<AssignmentRecord> {
        match self {
            AssignmentTarget::SourceNode(node) => Some(AssignmentRecord::SourceNode {
                worker,
                archetype,
                node: node.clone(),
            }),
            AssignmentTarget::RemoteSite(site) => Some(AssignmentRecord::RemoteSite {
                worker,
                archetype,
                site: site.clone(),
            }),
            AssignmentTarget::Relay => Some(AssignmentRecord::Relay { worker, archetype }),
            AssignmentTarget::Home | AssignmentTarget::Unassigned | AssignmentTarget::Explore(_) => {
                None
            }
        }
    }
}

impl fmt::Display for AssignmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentTarget::Home => f.write_str("home"),
            AssignmentTarget::SourceNode(node) => write!(f, "node:{node}"),
            AssignmentTarget::Unassigned => f.write_str("unassigned"),
            AssignmentTarget::Relay => f.write_str("relay"),
            AssignmentTarget::RemoteSite(site) => write!(f, "site:{site}"),
            AssignmentTarget::Explore(Some(site)) => write!(f, "explore:{site}"),
            AssignmentTarget::Explore(None) => f.write_str("explore"),
        }
    }
}

/// Intel freshness of `site` in `[0, 1]`: 1 when just scanned, 0 at the
/// maximum age.
pub fn freshness(site: &RemoteSite, world: &WorldState, config: &SchedulerConfig) -> f64 {
    let max_age = config.remote.max_intel_age as f64;
    (1.0 - site.age(world.tick) as f64 / max_age).clamp(0.0, 1.0)
}

/// Resolves where a new worker of `archetype` would work.
///
/// Returns `None` when the archetype needs a concrete target and none is
/// available. Gatherers always resolve.
pub fn resolve(
    archetype: Archetype,
    world: &WorldState,
    config: &SchedulerConfig,
) -> Option<AssignmentTarget> {
    match archetype {
        Archetype::Gatherer => Some(
            least_staffed_node(world)
                .map(AssignmentTarget::SourceNode)
                .unwrap_or(AssignmentTarget::Unassigned),
        ),
        Archetype::RelayOperator => Some(AssignmentTarget::Relay),
        Archetype::RemoteGatherer
        | Archetype::RemoteTransporter
        | Archetype::Reserver
        | Archetype::Claimer => {
            remote_site_for(archetype, world, config).map(|s| AssignmentTarget::RemoteSite(s.name.clone()))
        }
        Archetype::Scout => scout_target(world, config),
        Archetype::Transporter
        | Archetype::Upgrader
        | Archetype::Builder
        | Archetype::Defender
        | Archetype::RangedDefender
        | Archetype::Healer => Some(AssignmentTarget::Home),
    }
}

/// The remote site a new worker of `archetype` would take, if any.
pub fn remote_site_for<'w>(
    archetype: Archetype,
    world: &'w WorldState,
    config: &SchedulerConfig,
) -> Option<&'w RemoteSite> {
    let table = &world.assignments;
    let mut sites = eligible_sites(world, config).into_iter();
    match archetype {
        Archetype::RemoteGatherer => sites.find(|s| {
            table.at_site(&s.name, Archetype::RemoteGatherer) < s.source_count as usize
        }),
        Archetype::RemoteTransporter => sites.find(|s| {
            let gatherers = table.at_site(&s.name, Archetype::RemoteGatherer);
            gatherers > 0
                && table.at_site(&s.name, Archetype::RemoteTransporter) < s.source_count as usize
        }),
        Archetype::Reserver => {
            if world.development.tier < config.remote.reserver_min_tier {
                return None;
            }
            sites.find(|s| {
                table.at_site(&s.name, Archetype::Reserver) == 0
                    && s.reservation_ticks < config.remote.reservation_refresh
            })
        }
        Archetype::Claimer => {
            if world.development.tier < config.remote.claimer_min_tier {
                return None;
            }
            sites.find(|s| s.claimable && table.at_site(&s.name, Archetype::Claimer) == 0)
        }
        _ => None,
    }
}

fn least_staffed_node(world: &WorldState) -> Option<NodeId> {
    world
        .structures
        .nodes
        .iter()
        .enumerate()
        .min_by_key(|(i, node)| (world.assignments.on_node(node), *i))
        .map(|(_, node)| node.clone())
}

fn scout_target(world: &WorldState, config: &SchedulerConfig) -> Option<AssignmentTarget> {
    if world.development.tier < config.remote.min_tier || !intel_is_stale(world, config) {
        return None;
    }
    let stalest = world
        .remote_sites
        .iter()
        .filter(|s| s.age(world.tick) > config.remote.max_intel_age)
        .max_by_key(|s| s.age(world.tick))
        .map(|s| s.name.clone());
    Some(AssignmentTarget::Explore(stalest))
}
