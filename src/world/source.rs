//! Collaborator interfaces feeding the cache.
//!
//! The live environment, the intel collaborator and the clock are injected
//! so the cache can be driven by fakes in tests.

use super::types::{ConstructionBacklog, DevelopmentFacts, RemoteSite, StructureInventory};
use crate::archetype::Archetype;
use crate::ids::{ColonyId, FacilityId, WorkerId};
use std::cell::Cell;

/// Raw budget figures read from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceFacts {
    pub available: u32,
    pub capacity: u32,
    pub reserve: u32,
}

/// One live worker as reported by the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFacts {
    pub id: WorkerId,
    pub archetype: Archetype,
    pub ticks_to_live: u32,
}

impl WorkerFacts {
    pub fn new(id: impl Into<String>, archetype: Archetype, ticks_to_live: u32) -> Self {
        Self {
            id: WorkerId::new(id),
            archetype,
            ticks_to_live,
        }
    }
}

/// Module counts of one hostile unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostileFacts {
    pub melee_parts: u32,
    pub ranged_parts: u32,
    pub heal_parts: u32,
    pub dismantle_parts: u32,
}

/// Live environment facts for a colony.
///
/// Per-cycle methods are called on every refresh; periodic methods only
/// when the periodic tier is due.
pub trait WorldSource {
    /// Whether the colony is currently controlled and visible.
    fn is_visible(&self, colony: &ColonyId) -> bool;

    // ---- per-cycle ----

    fn resources(&self, colony: &ColonyId) -> ResourceFacts;

    fn workers(&self, colony: &ColonyId) -> Vec<WorkerFacts>;

    fn hostiles(&self, colony: &ColonyId) -> Vec<HostileFacts>;

    fn development(&self, colony: &ColonyId) -> DevelopmentFacts;

    /// Facilities already occupied with production.
    fn busy_facilities(&self, colony: &ColonyId) -> Vec<FacilityId>;

    // ---- periodic ----

    fn structures(&self, colony: &ColonyId) -> StructureInventory;

    fn construction(&self, colony: &ColonyId) -> ConstructionBacklog;

    /// Adjacent expansion sites with their cached intel.
    fn remote_sites(&self, colony: &ColonyId) -> Vec<RemoteSite>;
}

/// Source of the current time step.
pub trait Clock {
    fn now(&self) -> u64;
}

/// A clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: Cell<u64>,
}

impl ManualClock {
    pub fn new(tick: u64) -> Self {
        Self {
            tick: Cell::new(tick),
        }
    }

    pub fn set(&self, tick: u64) {
        self.tick.set(tick);
    }

    pub fn advance(&self, ticks: u64) {
        self.tick.set(self.tick.get() + ticks);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.tick.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

impl<S: WorldSource + ?Sized> WorldSource for &S {
    fn is_visible(&self, colony: &ColonyId) -> bool {
        (**self).is_visible(colony)
    }
    fn resources(&self, colony: &ColonyId) -> ResourceFacts {
        (**self).resources(colony)
    }
    fn workers(&self, colony: &ColonyId) -> Vec<WorkerFacts> {
        (**self).workers(colony)
    }
    fn hostiles(&self, colony: &ColonyId) -> Vec<HostileFacts> {
        (**self).hostiles(colony)
    }
    fn development(&self, colony: &ColonyId) -> DevelopmentFacts {
        (**self).development(colony)
    }
    fn busy_facilities(&self, colony: &ColonyId) -> Vec<FacilityId> {
        (**self).busy_facilities(colony)
    }
    fn structures(&self, colony: &ColonyId) -> StructureInventory {
        (**self).structures(colony)
    }
    fn construction(&self, colony: &ColonyId) -> ConstructionBacklog {
        (**self).construction(colony)
    }
    fn remote_sites(&self, colony: &ColonyId) -> Vec<RemoteSite> {
        (**self).remote_sites(colony)
    }
}
