//! Utility-driven production scheduling for autonomous colonies.
//!
//! Each decision cycle answers one question per colony: which worker
//! archetype should be produced next, with which capability loadout, and
//! where should it work?
//!
//! - **World**: [`world::WorldStateCache`] assembles one immutable
//!   [`world::WorldState`] per colony per cycle from injected environment
//!   facts, with a periodic tier for slow-changing structure and intel.
//! - **Build**: [`build::BuildPlanner`] turns an archetype's module pattern
//!   and a budget into a concrete [`build::BuildSpec`] with a guaranteed
//!   mobility module for every mobile archetype.
//! - **Scheduler**: [`scheduler::UtilityScheduler`] scores every archetype,
//!   ranks the affordable ones and admits at most one per free facility
//!   while protecting the economic bootstrap.
//! - **Store**: [`store::ColonyStore`] keeps typed assignment records and
//!   economy history across cycles.
//!
//! # Architecture
//!
//! Scheduling is a pure function of the snapshot. Every tunable lives in
//! [`scheduler::SchedulerConfig`], [`world::CacheConfig`] and
//! [`build::ArchetypeCatalog`]; with the `serde` feature all three load
//! from any serde format. The `parallel` feature scores archetypes on the
//! rayon thread pool.

pub mod archetype;
pub mod build;
pub mod error;
pub mod ids;
pub mod scheduler;
pub mod store;
pub mod world;

pub use archetype::{Archetype, ArchetypeCategory};
pub use error::{ConfigError, StoreError};
pub use ids::{ColonyId, FacilityId, NodeId, SiteName, WorkerId};
