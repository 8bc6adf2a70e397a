//! Persistent per-colony records.
//!
//! Assignment records (which worker holds which node or site) and economy
//! history samples. The scheduler's callers own and mutate the store; the
//! scheduler reads it through [`crate::world::WorldStateCache`].

mod store;
mod types;

pub use store::{ColonyStore, DEFAULT_HISTORY_CAPACITY};
pub use types::{AssignmentRecord, EconomySample};
