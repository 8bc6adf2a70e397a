//! Candidate ranking.
//!
//! Candidates are ordered by utility, highest first. Tie-break rules score
//! candidates so that a lower score means higher priority, and a later rule
//! is only consulted when utility and every earlier rule tie within
//! epsilon. Remaining ties fall back to archetype order, which makes the
//! ranking deterministic for identical inputs.

use super::types::Candidate;
use crate::world::WorldState;
use std::cmp::Ordering;

/// A tie-break rule between candidates of equal utility.
pub trait RankingRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower is better.
    fn score(&self, candidate: &Candidate, world: &WorldState) -> f64;
}

/// Cheapest build first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheapestBuild;

impl RankingRule for CheapestBuild {
    fn name(&self) -> &'static str {
        "cheapest_build"
    }

    fn score(&self, candidate: &Candidate, _world: &WorldState) -> f64 {
        candidate.cost() as f64
    }
}

/// Orders candidates by utility, then by tie-break rules.
///
/// # Examples
///
/// ```
/// use u_colony::scheduler::{CandidateRanker, CheapestBuild};
///
/// let ranker = CandidateRanker::new().with_tie_break(CheapestBuild);
/// assert_eq!(ranker.rule_names(), vec!["cheapest_build"]);
/// ```
pub struct CandidateRanker {
    tie_breaks: Vec<Box<dyn RankingRule>>,
    epsilon: f64,
}

impl Default for CandidateRanker {
    /// Highest utility, then cheapest build, then archetype order.
    fn default() -> Self {
        Self::new().with_tie_break(CheapestBuild)
    }
}

impl CandidateRanker {
    /// Utility first, archetype order on ties.
    pub fn new() -> Self {
        Self {
            tie_breaks: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Sets the tolerance under which two scores tie.
    pub fn with_epsilon(mut self, eps: f64) -> Self {
        self.epsilon = eps;
        self
    }

    /// Appends a rule consulted when all earlier comparisons tie.
    pub fn with_tie_break<R: RankingRule + 'static>(mut self, rule: R) -> Self {
        self.tie_breaks.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.tie_breaks.iter().map(|r| r.name()).collect()
    }

    fn scores(&self, candidate: &Candidate, world: &WorldState) -> Vec<f64> {
        std::iter::once(-candidate.utility)
            .chain(self.tie_breaks.iter().map(|r| r.score(candidate, world)))
            .collect()
    }

    /// Sorts `candidates` best first.
    pub fn rank(&self, candidates: &mut Vec<Candidate>, world: &WorldState) {
        let mut scored: Vec<(Vec<f64>, Candidate)> = candidates
            .drain(..)
            .map(|c| (self.scores(&c, world), c))
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            for (va, vb) in sa.iter().zip(sb.iter()) {
                if (va - vb).abs() > self.epsilon {
                    return va.partial_cmp(vb).unwrap_or(Ordering::Equal);
                }
            }
            a.archetype.cmp(&b.archetype)
        });

        candidates.extend(scored.into_iter().map(|(_, c)| c));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;
    use crate::build::{BuildSpec, Capability};
    use crate::scheduler::AssignmentTarget;

    fn candidate(archetype: Archetype, utility: f64, modules: Vec<Capability>) -> Candidate {
        Candidate {
            archetype,
            utility,
            spec: BuildSpec::new(modules),
            assignment: AssignmentTarget::Home,
            facility: None,
        }
    }

    /// Prefers defense on ties, used to check that utility still leads.
    struct DefenseFirst;

    impl RankingRule for DefenseFirst {
        fn name(&self) -> &'static str {
            "defense_first"
        }

        fn score(&self, candidate: &Candidate, _world: &WorldState) -> f64 {
            if candidate.archetype.category() == crate::ArchetypeCategory::Defense {
                0.0
            } else {
                1.0
            }
        }
    }

    #[test]
    fn test_highest_utility_first() {
        let world = WorldState::default();
        let mut candidates = vec![
            candidate(Archetype::Builder, 10.0, vec![Capability::Work, Capability::Move]),
            candidate(Archetype::Gatherer, 50.0, vec![Capability::Work, Capability::Move]),
        ];
        CandidateRanker::default().rank(&mut candidates, &world);
        assert_eq!(candidates[0].archetype, Archetype::Gatherer);
    }

    #[test]
    fn test_utility_tie_prefers_cheaper_build() {
        let world = WorldState::default();
        let mut candidates = vec![
            candidate(Archetype::Gatherer, 10.0, vec![Capability::Work, Capability::Move]),
            candidate(Archetype::Scout, 10.0, vec![Capability::Move]),
        ];
        CandidateRanker::default().rank(&mut candidates, &world);
        assert_eq!(candidates[0].archetype, Archetype::Scout);
    }

    #[test]
    fn test_full_tie_uses_archetype_order() {
        let world = WorldState::default();
        let mut candidates = vec![
            candidate(Archetype::Healer, 10.0, vec![Capability::Move]),
            candidate(Archetype::Transporter, 10.0 + 1e-12, vec![Capability::Move]),
        ];
        CandidateRanker::default().rank(&mut candidates, &world);
        assert_eq!(candidates[0].archetype, Archetype::Transporter);
    }

    #[test]
    fn test_tie_break_never_overrides_utility() {
        let world = WorldState::default();
        let ranker = CandidateRanker::new().with_tie_break(DefenseFirst);
        let mut candidates = vec![
            candidate(Archetype::Defender, 60.0, vec![Capability::Attack, Capability::Move]),
            candidate(Archetype::Gatherer, 800.0, vec![Capability::Work, Capability::Move]),
            candidate(Archetype::Transporter, 60.0, vec![Capability::Carry, Capability::Move]),
        ];
        ranker.rank(&mut candidates, &world);
        let order: Vec<_> = candidates.iter().map(|c| c.archetype).collect();
        assert_eq!(
            order,
            vec![Archetype::Gatherer, Archetype::Defender, Archetype::Transporter]
        );
    }

    #[test]
    fn test_bare_ranker_uses_archetype_order_on_ties() {
        let world = WorldState::default();
        let mut candidates = vec![
            candidate(Archetype::Scout, 1.0, vec![Capability::Move]),
            candidate(Archetype::Gatherer, 1.0, vec![Capability::Work, Capability::Move]),
        ];
        let ranker = CandidateRanker::new();
        ranker.rank(&mut candidates, &world);
        assert_eq!(candidates[0].archetype, Archetype::Gatherer);
        assert!(ranker.rule_names().is_empty());
    }
}
