//! Capability modules and the build specs assembled from them.

/// Hard ceiling on the number of modules in one build.
pub const MAX_MODULES: usize = 50;

/// A single capability module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    Move,
    Work,
    Carry,
    Attack,
    RangedAttack,
    Heal,
    Claim,
    Tough,
}

impl Capability {
    /// Production cost of this module.
    pub fn cost(self) -> u32 {
        match self {
            Capability::Move => 50,
            Capability::Work => 100,
            Capability::Carry => 50,
            Capability::Attack => 80,
            Capability::RangedAttack => 150,
            Capability::Heal => 250,
            Capability::Claim => 600,
            Capability::Tough => 10,
        }
    }

    /// Whether this is the mobility module.
    pub fn is_mobility(self) -> bool {
        self == Capability::Move
    }

    /// Rank in survivability order: damage soak first, primary function
    /// next, recovery and mobility last.
    pub(crate) fn survivability_rank(self) -> u8 {
        match self {
            Capability::Tough => 0,
            Capability::Work
            | Capability::Carry
            | Capability::Attack
            | Capability::RangedAttack
            | Capability::Claim => 1,
            Capability::Heal => 2,
            Capability::Move => 3,
        }
    }
}

/// Sum of module costs.
pub fn modules_cost(modules: &[Capability]) -> u32 {
    modules.iter().map(|m| m.cost()).sum()
}

/// How many mobility modules must accompany the non-mobility modules.
///
/// Each variant fixes a mobility-to-other ratio; see [`MobilityMode::required_mobility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MobilityMode {
    /// One mobility module per two others.
    Paved,
    /// One mobility module per other module.
    OpenTerrain,
    /// Five mobility modules per other module.
    RoughTerrain,
    /// One mobility module per five others, never fewer than one.
    Stationary,
    /// Mobility is embedded in the pattern; nothing is reserved or topped up.
    PatternDefined,
}

impl MobilityMode {
    /// Mobility modules required for `non_mobility` other modules.
    pub fn required_mobility(self, non_mobility: usize) -> usize {
        if non_mobility == 0 {
            return 0;
        }
        match self {
            MobilityMode::Paved => non_mobility.div_ceil(2),
            MobilityMode::OpenTerrain => non_mobility,
            MobilityMode::RoughTerrain => non_mobility * 5,
            MobilityMode::Stationary => non_mobility.div_ceil(5).max(1),
            MobilityMode::PatternDefined => 0,
        }
    }
}

/// Per-module contributions to [`BuildStats`].
pub mod yields {
    /// Resource gathered per tick per Work module.
    pub const THROUGHPUT_PER_WORK: u32 = 2;
    /// Transport capacity per Carry module.
    pub const CAPACITY_PER_CARRY: u32 = 50;
    pub const DAMAGE_PER_ATTACK: u32 = 30;
    pub const DAMAGE_PER_RANGED: u32 = 10;
    pub const RECOVERY_PER_HEAL: u32 = 12;
    /// Damage soaked by every module before it stops functioning.
    pub const SOAK_PER_MODULE: u32 = 100;
}

/// Capability statistics derived from a module list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildStats {
    pub throughput: u32,
    pub transport_capacity: u32,
    pub damage: u32,
    pub recovery: u32,
    pub soak: u32,
}

impl BuildStats {
    fn from_modules(modules: &[Capability]) -> Self {
        let mut stats = BuildStats::default();
        for m in modules {
            match m {
                Capability::Work => stats.throughput += yields::THROUGHPUT_PER_WORK,
                Capability::Carry => stats.transport_capacity += yields::CAPACITY_PER_CARRY,
                Capability::Attack => stats.damage += yields::DAMAGE_PER_ATTACK,
                Capability::RangedAttack => stats.damage += yields::DAMAGE_PER_RANGED,
                Capability::Heal => stats.recovery += yields::RECOVERY_PER_HEAL,
                Capability::Move | Capability::Claim | Capability::Tough => {}
            }
            stats.soak += yields::SOAK_PER_MODULE;
        }
        stats
    }
}

/// A concrete, ordered capability loadout.
///
/// The cost is always the exact sum of module costs; construct through
/// [`BuildSpec::new`] so the invariant cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BuildSpec {
    modules: Vec<Capability>,
    cost: u32,
    stats: BuildStats,
    degenerate: bool,
}

impl BuildSpec {
    pub fn new(modules: Vec<Capability>) -> Self {
        let cost = modules_cost(&modules);
        let stats = BuildStats::from_modules(&modules);
        Self {
            modules,
            cost,
            stats,
            degenerate: false,
        }
    }

    pub(crate) fn mark_degenerate(mut self) -> Self {
        self.degenerate = true;
        self
    }

    pub fn modules(&self) -> &[Capability] {
        &self.modules
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Number of modules of the given kind.
    pub fn count(&self, capability: Capability) -> usize {
        self.modules.iter().filter(|&&m| m == capability).count()
    }

    pub fn has_mobility(&self) -> bool {
        self.modules.iter().any(|m| m.is_mobility())
    }

    /// Whether the planner had to keep a spec below the quality floor
    /// (a mobile archetype without any mobility module).
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Whether every module in `required` is present at least as many times.
    pub fn contains_all(&self, required: &[Capability]) -> bool {
        required.iter().all(|&r| {
            let needed = required.iter().filter(|&&x| x == r).count();
            self.count(r) >= needed
        })
    }
}
