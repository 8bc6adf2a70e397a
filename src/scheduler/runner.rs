//! Scheduling cycle execution.
//!
//! [`plan`] is the pure core: world snapshot in, [`Decision`] out.
//! [`UtilityScheduler`] wires it to a [`WorldStateCache`] so callers only
//! hand over a colony id and their store.
//!
//! One planning pass:
//!
//! 1. Compute every archetype's effective deficit.
//! 2. Compute its utility; drop archetypes scoring 0.
//! 3. Resolve an assignment target; drop unresolvable archetypes.
//! 4. Plan a build against the budget; drop archetypes with no build.
//! 5. Rank the survivors.
//! 6. Admit the best if affordable. Otherwise wait while income is
//!    positive, or during collapse take the first candidate that fits the
//!    available budget, re-planning each at that budget.
//!
//! Builds are sized against capacity, except in an emergency or with no
//! transporters alive, when they are sized against what is available now.

use super::assignment::resolve;
use super::config::SchedulerConfig;
use super::demand::effective_deficit;
use super::ranking::CandidateRanker;
use super::types::{Candidate, Decision, Outcome};
use super::utility::utility;
use crate::archetype::Archetype;
use crate::build::{ArchetypeCatalog, BuildPlanner};
use crate::error::ConfigError;
use crate::ids::ColonyId;
use crate::store::ColonyStore;
use crate::world::{Clock, WorldSource, WorldState, WorldStateCache};

/// Whether builds should be sized against the budget available now.
pub fn spend_now(world: &WorldState) -> bool {
    world.emergency.is_emergency() || world.roster.count(Archetype::Transporter) == 0
}

/// Plans one cycle with the default ranking.
pub fn plan(world: &WorldState, catalog: &ArchetypeCatalog, config: &SchedulerConfig) -> Decision {
    let ranker = CandidateRanker::default().with_epsilon(config.epsilon);
    plan_with(world, catalog, config, &ranker)
}

/// Plans one cycle with custom tie-break rules.
pub fn plan_with(
    world: &WorldState,
    catalog: &ArchetypeCatalog,
    config: &SchedulerConfig,
    ranker: &CandidateRanker,
) -> Decision {
    let spend = spend_now(world);
    let available = world.economy.available;
    let budget = if spend {
        available
    } else {
        world.economy.capacity
    };

    let mut candidates = evaluate_all(world, catalog, config, budget);
    ranker.rank(&mut candidates, world);

    let outcome = admit(&candidates, world, catalog);
    match &outcome {
        Outcome::Admit(c) => tracing::debug!(
            colony = %world.colony,
            tick = world.tick,
            archetype = %c.archetype,
            cost = c.cost(),
            utility = c.utility,
            assignment = %c.assignment,
            "candidate admitted"
        ),
        Outcome::Wait {
            archetype,
            cost,
            available,
        } => tracing::debug!(
            colony = %world.colony,
            tick = world.tick,
            archetype = %archetype,
            cost,
            available,
            "waiting for budget"
        ),
        Outcome::Idle => tracing::trace!(
            colony = %world.colony,
            tick = world.tick,
            candidates = candidates.len(),
            "nothing to produce"
        ),
    }

    Decision {
        candidates,
        outcome,
        spend_now: spend,
    }
}

fn evaluate_all(
    world: &WorldState,
    catalog: &ArchetypeCatalog,
    config: &SchedulerConfig,
    budget: u32,
) -> Vec<Candidate> {
    let archetypes: Vec<Archetype> = catalog.archetypes().collect();

    #[cfg(feature = "parallel")]
    if config.parallel {
        use rayon::prelude::*;
        return archetypes
            .par_iter()
            .filter_map(|&a| evaluate(a, world, catalog, config, budget))
            .collect();
    }

    archetypes
        .iter()
        .filter_map(|&a| evaluate(a, world, catalog, config, budget))
        .collect()
}

fn evaluate(
    archetype: Archetype,
    world: &WorldState,
    catalog: &ArchetypeCatalog,
    config: &SchedulerConfig,
    budget: u32,
) -> Option<Candidate> {
    let build_config = catalog.get(archetype)?;
    let deficit = effective_deficit(archetype, world, config);
    let utility = utility(archetype, deficit, world, config);
    if utility <= 0.0 {
        return None;
    }
    let Some(assignment) = resolve(archetype, world, config) else {
        tracing::trace!(archetype = %archetype, utility, "no assignment target");
        return None;
    };
    let Some(spec) = BuildPlanner::build(build_config, budget) else {
        tracing::trace!(archetype = %archetype, budget, "no affordable build");
        return None;
    };
    Some(Candidate {
        archetype,
        utility,
        spec,
        assignment,
        facility: None,
    })
}

fn admit(candidates: &[Candidate], world: &WorldState, catalog: &ArchetypeCatalog) -> Outcome {
    let Some(best) = candidates.first() else {
        return Outcome::Idle;
    };
    let available = world.economy.available;
    if best.cost() <= available {
        return Outcome::Admit(best.clone());
    }
    if world.economy.has_positive_income() {
        return Outcome::Wait {
            archetype: best.archetype,
            cost: best.cost(),
            available,
        };
    }

    // Collapse: no income will refill the budget, so spend what is there.
    for candidate in candidates {
        if candidate.cost() <= available {
            return Outcome::Admit(candidate.clone());
        }
        let rebuilt = catalog
            .get(candidate.archetype)
            .and_then(|cfg| BuildPlanner::build(cfg, available));
        if let Some(spec) = rebuilt {
            tracing::info!(
                colony = %world.colony,
                archetype = %candidate.archetype,
                cost = spec.cost(),
                available,
                "income collapsed, admitting reduced build"
            );
            return Outcome::Admit(Candidate {
                spec,
                ..candidate.clone()
            });
        }
    }
    Outcome::Idle
}

/// Utility-based production scheduler over a world-state cache.
///
/// # Examples
///
/// ```ignore
/// let cache = WorldStateCache::new(source, clock, CacheConfig::default());
/// let mut scheduler = UtilityScheduler::new(
///     cache,
///     ArchetypeCatalog::default(),
///     SchedulerConfig::default(),
/// );
/// if let Some(candidate) = scheduler.select_candidate(&colony, &store) {
///     // produce candidate.spec, then record candidate.assignment
/// }
/// ```
pub struct UtilityScheduler<S, C> {
    cache: WorldStateCache<S, C>,
    catalog: ArchetypeCatalog,
    config: SchedulerConfig,
    ranker: CandidateRanker,
}

impl<S: WorldSource, C: Clock> UtilityScheduler<S, C> {
    /// Creates a scheduler, validating the catalog and configuration.
    pub fn try_new(
        cache: WorldStateCache<S, C>,
        catalog: ArchetypeCatalog,
        config: SchedulerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        catalog.validate()?;
        let ranker = CandidateRanker::default().with_epsilon(config.epsilon);
        Ok(Self {
            cache,
            catalog,
            config,
            ranker,
        })
    }

    /// Creates a scheduler.
    ///
    /// # Panics
    /// Panics if the catalog or configuration is invalid (use
    /// [`UtilityScheduler::try_new`] to get the error instead).
    pub fn new(
        cache: WorldStateCache<S, C>,
        catalog: ArchetypeCatalog,
        config: SchedulerConfig,
    ) -> Self {
        match Self::try_new(cache, catalog, config) {
            Ok(scheduler) => scheduler,
            Err(e) => panic!("invalid scheduler configuration: {e}"),
        }
    }

    pub fn cache(&self) -> &WorldStateCache<S, C> {
        &self.cache
    }

    pub fn catalog(&self) -> &ArchetypeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Drops the cached snapshot of `colony`.
    pub fn invalidate(&mut self, colony: &ColonyId) -> bool {
        self.cache.invalidate(colony)
    }

    /// Plans one cycle for `colony`; `None` when the colony is not visible.
    pub fn decide(&mut self, colony: &ColonyId, store: &ColonyStore) -> Option<Decision> {
        let world = self.cache.get(colony, store)?;
        Some(plan_with(&world, &self.catalog, &self.config, &self.ranker))
    }

    /// The candidate to produce this cycle, bound to the first free
    /// facility if there is one.
    ///
    /// Returns `None` when nothing qualifies or the best candidate must
    /// wait for budget.
    pub fn select_candidate(&mut self, colony: &ColonyId, store: &ColonyStore) -> Option<Candidate> {
        let world = self.cache.get(colony, store)?;
        let mut candidate =
            plan_with(&world, &self.catalog, &self.config, &self.ranker).into_admitted()?;
        candidate.facility = world.free_facilities().next().map(|f| f.id.clone());
        Some(candidate)
    }

    /// One admitted candidate per free production facility.
    ///
    /// Each subsequent facility is planned against a derived snapshot that
    /// has already paid for and counted the earlier admissions.
    pub fn select_for_facilities(&mut self, colony: &ColonyId, store: &ColonyStore) -> Vec<Candidate> {
        let Some(world) = self.cache.get(colony, store) else {
            return Vec::new();
        };
        let facilities: Vec<_> = world.free_facilities().map(|f| f.id.clone()).collect();

        let mut admitted = Vec::with_capacity(facilities.len());
        let mut state = WorldState::clone(&world);
        for facility in facilities {
            let decision = plan_with(&state, &self.catalog, &self.config, &self.ranker);
            let Some(mut candidate) = decision.into_admitted() else {
                break;
            };
            state = state.after_admission(candidate.archetype, candidate.cost(), Some(&facility));
            candidate.facility = Some(facility);
            admitted.push(candidate);
        }
        admitted
    }
}
