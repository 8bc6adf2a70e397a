//! Colony world-state snapshots.
//!
//! [`WorldStateCache`] turns live environment facts ([`WorldSource`]), the
//! caller-owned [`crate::store::ColonyStore`] and a [`Clock`] into one
//! immutable [`WorldState`] per colony per decision cycle.
//!
//! # Refresh tiers
//!
//! Budget, roster, threat and emergency flags are rebuilt every new tick.
//! Structures, construction backlog, remote intel and assignment records
//! are rebuilt every [`CacheConfig::refresh_interval`] ticks; that interval
//! bounds how stale any snapshot field can be.

mod cache;
mod config;
mod source;
mod types;

pub use cache::{
    build_roster, classify_threat, derive_emergency, economy_snapshot, CacheStats,
    WorldStateCache,
};
pub use config::{CacheConfig, ThreatThresholds};
pub use source::{Clock, HostileFacts, ManualClock, ResourceFacts, WorkerFacts, WorldSource};
pub use types::{
    AssignmentTable, ConstructionBacklog, DevelopmentFacts, EconomySnapshot, EmergencyFlags,
    EmergencyReason, Facility, HostileComposition, RemoteSite, Roster, StructureInventory,
    ThreatLevel, ThreatSnapshot, WorldState,
};
