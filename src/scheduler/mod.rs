//! Utility-based production scheduling.
//!
//! Each decision cycle scores every archetype against the current
//! [`crate::world::WorldState`], resolves where a new worker would work,
//! plans a build it can afford and ranks the survivors. The admission
//! policy then decides between producing now, waiting for budget, and
//! settling for a reduced build when income has collapsed.
//!
//! # Guarantees
//!
//! - With no gatherers alive and enough budget for one, a gatherer is selected.
//! - With gatherers but no transporters, a transporter is selected.
//! - Remote, improvement and construction work wait for a staffed home economy.
//! - Defense is never selected without a threat, construction never
//!   without a backlog.
//! - A selected candidate never costs more than the budget available now.
//!
//! # References
//!
//! - Dill (2015), "Dual-Utility Reasoning", Game AI Pro 2
//! - Mark (2009), "Behavioral Mathematics for Game AI"

mod assignment;
mod config;
mod curves;
mod demand;
mod ranking;
mod runner;
mod types;
mod utility;

#[cfg(test)]
mod properties;

pub use assignment::{freshness, resolve, AssignmentTarget};
pub use config::{
    DefensePolicy, EconomyPolicy, RemotePolicy, SchedulerConfig, TargetPolicy, UtilityWeights,
};
pub use curves::{
    bounded, diminishing_returns, geometric_mean, scarcity_multiplier, sigmoid, smooth_ramp,
};
pub use demand::{effective_deficit, eligible_sites, target_count};
pub use ranking::{CandidateRanker, CheapestBuild, RankingRule};
pub use runner::{plan, plan_with, spend_now, UtilityScheduler};
pub use types::{Candidate, Decision, Outcome};
pub use utility::utility;
