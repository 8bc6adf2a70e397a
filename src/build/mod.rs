//! Capability loadout planning.
//!
//! Maps an archetype's static [`ArchetypeConfig`] and an available budget to
//! a concrete, ordered [`BuildSpec`] with a deterministic cost. Planning is a
//! pure function: the same inputs always yield the same spec, and an
//! unaffordable archetype yields `None` rather than an error.

mod config;
mod planner;
mod types;

pub use config::{ArchetypeCatalog, ArchetypeConfig};
pub use planner::BuildPlanner;
pub use types::{
    modules_cost, yields, BuildSpec, BuildStats, Capability, MobilityMode, MAX_MODULES,
};
