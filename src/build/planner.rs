//! Budget-constrained loadout planning.
//!
//! [`BuildPlanner::build`] turns an [`ArchetypeConfig`] and a budget into a
//! concrete [`BuildSpec`]:
//!
//! 1. reject budgets below the archetype's minimum cost;
//! 2. reserve the fixed prefix, when it fits alongside one pattern;
//! 3. repeat the pattern while the budget (including the mobility the
//!    ratio will demand) allows, up to `max_repeats`;
//! 4. append the suffix when it fits;
//! 5. top up mobility modules to the required ratio;
//! 6. substitute the fallback loadout for builds under three modules;
//! 7. guarantee one mobility module for mobile archetypes, evicting the most
//!    recently added non-mobility module if that is the only way;
//! 8. optionally reorder for survivability.

use super::config::ArchetypeConfig;
use super::types::{modules_cost, BuildSpec, Capability, MobilityMode, MAX_MODULES};

/// Builds with fewer modules than this are replaced by the fallback loadout.
const FALLBACK_THRESHOLD: usize = 3;

/// Stateless loadout planner.
pub struct BuildPlanner;

impl BuildPlanner {
    /// Plans a build for `config` within `budget`.
    ///
    /// Returns `None` when the archetype is unaffordable at any size or no
    /// build containing the required module set fits.
    pub fn build(config: &ArchetypeConfig, budget: u32) -> Option<BuildSpec> {
        if budget < config.minimum_cost {
            return None;
        }

        let mode = config.mobility;
        let mut draft = Draft::default();

        if !config.prefix.is_empty() {
            let mut probe = draft.clone();
            probe.push_all(&config.prefix);
            if probe.fits(&config.pattern, mode, budget) {
                draft = probe;
            }
        }

        for _ in 0..config.max_repeats {
            if !draft.fits(&config.pattern, mode, budget) {
                break;
            }
            draft.push_all(&config.pattern);
        }

        if !config.suffix.is_empty() && draft.fits(&config.suffix, mode, budget) {
            draft.push_all(&config.suffix);
        }

        draft.top_up_mobility(mode, budget);

        if draft.modules.len() < FALLBACK_THRESHOLD {
            if let Some(fallback) = &config.fallback {
                if modules_cost(fallback) <= budget {
                    draft = Draft::from_modules(fallback);
                }
            }
        }

        let mut degenerate = false;
        if config.requires_mobility() && !draft.has_mobility() {
            degenerate = !draft.force_mobility(budget, &config.required);
        }

        if config.sort_for_survivability {
            draft.modules.sort_by_key(|m| m.survivability_rank());
        }

        let spec = BuildSpec::new(draft.modules);
        if spec.is_empty() || !spec.contains_all(&config.required) {
            return None;
        }
        if degenerate {
            tracing::warn!(
                budget,
                cost = spec.cost(),
                modules = spec.len(),
                "build kept without any mobility module"
            );
            return Some(spec.mark_degenerate());
        }
        Some(spec)
    }
}

/// A build under construction with running cost.
#[derive(Debug, Clone, Default)]
struct Draft {
    modules: Vec<Capability>,
    cost: u32,
}

impl Draft {
    fn from_modules(modules: &[Capability]) -> Self {
        Self {
            modules: modules.to_vec(),
            cost: modules_cost(modules),
        }
    }

    fn push(&mut self, module: Capability) {
        self.modules.push(module);
        self.cost += module.cost();
    }

    fn push_all(&mut self, modules: &[Capability]) {
        for &m in modules {
            self.push(m);
        }
    }

    fn mobility(&self) -> usize {
        self.modules.iter().filter(|m| m.is_mobility()).count()
    }

    fn non_mobility(&self) -> usize {
        self.modules.len() - self.mobility()
    }

    fn has_mobility(&self) -> bool {
        self.mobility() > 0
    }

    /// Whether `extra` plus the mobility it makes necessary fits both the
    /// budget and the module ceiling.
    fn fits(&self, extra: &[Capability], mode: MobilityMode, budget: u32) -> bool {
        let extra_mobility = extra.iter().filter(|m| m.is_mobility()).count();
        let non_mobility = self.non_mobility() + extra.len() - extra_mobility;
        let mobility = self.mobility() + extra_mobility;
        let missing = mode.required_mobility(non_mobility).saturating_sub(mobility);

        let modules = self.modules.len() + extra.len() + missing;
        let cost = self.cost + modules_cost(extra) + missing as u32 * Capability::Move.cost();
        modules <= MAX_MODULES && cost <= budget
    }

    fn top_up_mobility(&mut self, mode: MobilityMode, budget: u32) {
        let needed = mode
            .required_mobility(self.non_mobility())
            .saturating_sub(self.mobility());
        for _ in 0..needed {
            if self.modules.len() >= MAX_MODULES || self.cost + Capability::Move.cost() > budget {
                break;
            }
            self.push(Capability::Move);
        }
    }

    /// Adds one mobility module, evicting the most recently added
    /// non-mobility module when the budget demands it.
    ///
    /// Returns `false` when no mobility module could be added; the draft is
    /// then left exactly as it was.
    fn force_mobility(&mut self, budget: u32, required: &[Capability]) -> bool {
        let move_cost = Capability::Move.cost();
        if self.modules.len() < MAX_MODULES && self.cost + move_cost <= budget {
            self.push(Capability::Move);
            return true;
        }

        let Some(index) = self.modules.iter().rposition(|m| !m.is_mobility()) else {
            return false;
        };
        let evicted = self.modules.remove(index);
        self.cost -= evicted.cost();

        if self.cost + move_cost <= budget {
            self.push(Capability::Move);
            if BuildSpec::new(self.modules.clone()).contains_all(required) {
                return true;
            }
            self.modules.pop();
            self.cost -= move_cost;
        }

        self.modules.insert(index, evicted);
        self.cost += evicted.cost();
        false
    }
}
