//! Candidates and scheduling decisions.

use super::assignment::AssignmentTarget;
use crate::archetype::Archetype;
use crate::build::BuildSpec;
use crate::ids::FacilityId;

/// One archetype the scheduler may produce this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub archetype: Archetype,
    pub utility: f64,
    pub spec: BuildSpec,
    pub assignment: AssignmentTarget,
    /// Production facility the candidate is bound to, once admitted by
    /// [`super::UtilityScheduler::select_for_facilities`].
    pub facility: Option<FacilityId>,
}

impl Candidate {
    /// Total cost of the candidate's build.
    pub fn cost(&self) -> u32 {
        self.spec.cost()
    }
}

/// What the admission policy decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Produce this candidate now.
    Admit(Candidate),
    /// The best candidate is unaffordable while income is positive; wait
    /// for the budget to refill.
    Wait {
        archetype: Archetype,
        cost: u32,
        available: u32,
    },
    /// Nothing worth producing, or nothing affordable during collapse.
    Idle,
}

/// The full result of one planning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Every resolvable candidate with positive utility, best first.
    pub candidates: Vec<Candidate>,
    pub outcome: Outcome,
    /// Whether builds were sized against the available budget instead of
    /// capacity.
    pub spend_now: bool,
}

impl Decision {
    pub fn admitted(&self) -> Option<&Candidate> {
        match &self.outcome {
            Outcome::Admit(candidate) => Some(candidate),
            _ => None,
        }
    }

    pub fn into_admitted(self) -> Option<Candidate> {
        match self.outcome {
            Outcome::Admit(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// The highest-ranked candidate, whether or not it was admitted.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}
