//! Scheduler configuration: the single table of utility constants.
//!
//! Every weight, threshold and ratio used by the utility formulas lives
//! here so the behaviour can be reproduced and tuned without code changes
//! (with the `serde` feature the whole table deserializes from any format).

use crate::archetype::Archetype;
use crate::error::ConfigError;

/// Base weight of every archetype's utility.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtilityWeights {
    pub gatherer: f64,
    pub transporter: f64,
    /// Multiplier while income is positive but no transporter is alive.
    pub transporter_starvation_boost: f64,
    pub relay_operator: f64,
    pub upgrader: f64,
    pub builder: f64,
    pub defender: f64,
    pub ranged_defender: f64,
    pub healer: f64,
    pub remote_gatherer: f64,
    pub remote_transporter: f64,
    pub reserver: f64,
    pub scout: f64,
    pub claimer: f64,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            gatherer: 100.0,
            transporter: 80.0,
            transporter_starvation_boost: 10.0,
            relay_operator: 30.0,
            upgrader: 20.0,
            builder: 25.0,
            defender: 60.0,
            ranged_defender: 60.0,
            healer: 40.0,
            remote_gatherer: 15.0,
            remote_transporter: 12.0,
            reserver: 10.0,
            scout: 5.0,
            claimer: 20.0,
        }
    }
}

impl UtilityWeights {
    /// Base weight for `archetype`.
    pub fn base(&self, archetype: Archetype) -> f64 {
        match archetype {
            Archetype::Gatherer => self.gatherer,
            Archetype::Transporter => self.transporter,
            Archetype::RelayOperator => self.relay_operator,
            Archetype::Upgrader => self.upgrader,
            Archetype::Builder => self.builder,
            Archetype::Defender => self.defender,
            Archetype::RangedDefender => self.ranged_defender,
            Archetype::Healer => self.healer,
            Archetype::RemoteGatherer => self.remote_gatherer,
            Archetype::RemoteTransporter => self.remote_transporter,
            Archetype::Reserver => self.reserver,
            Archetype::Scout => self.scout,
            Archetype::Claimer => self.claimer,
        }
    }

    fn all(&self) -> [(&'static str, f64); 14] {
        [
            ("gatherer", self.gatherer),
            ("transporter", self.transporter),
            ("transporter_starvation_boost", self.transporter_starvation_boost),
            ("relay_operator", self.relay_operator),
            ("upgrader", self.upgrader),
            ("builder", self.builder),
            ("defender", self.defender),
            ("ranged_defender", self.ranged_defender),
            ("healer", self.healer),
            ("remote_gatherer", self.remote_gatherer),
            ("remote_transporter", self.remote_transporter),
            ("reserver", self.reserver),
            ("scout", self.scout),
            ("claimer", self.claimer),
        ]
    }
}

/// Constants of the economic factors (scarcity, reserve ramp,
/// sustainability, trend, diminishing returns).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EconomyPolicy {
    /// Lower clamp on the realized income ratio; bounds the scarcity
    /// multiplier at `1 / income_ratio_floor`.
    pub income_ratio_floor: f64,

    /// Upper clamp on any utility.
    pub max_utility: f64,

    /// Reserve considered "full" once storage exists.
    pub reserve_target: u32,

    /// Reserve-level ramp bounds for improvement work.
    pub upgrade_reserve_low: f64,
    pub upgrade_reserve_high: f64,

    /// Reserve-level ramp bounds for construction work.
    pub build_reserve_low: f64,
    pub build_reserve_high: f64,

    /// Projected consumption per tick of one improvement worker.
    pub upgrader_consumption: f64,

    /// Projected consumption per tick of one construction worker.
    pub builder_consumption: f64,

    /// Steepness of the reserve-trend sigmoid.
    pub trend_steepness: f64,

    /// Population at which the diminishing-returns factor halves.
    pub population_half_point: f64,
}

impl Default for EconomyPolicy {
    fn default() -> Self {
        Self {
            income_ratio_floor: 1e-3,
            max_utility: 1e12,
            reserve_target: 100_000,
            upgrade_reserve_low: 0.2,
            upgrade_reserve_high: 0.8,
            build_reserve_low: 0.05,
            build_reserve_high: 0.4,
            upgrader_consumption: 5.0,
            builder_consumption: 5.0,
            trend_steepness: 0.05,
            population_half_point: 2.0,
        }
    }
}

/// Target-count policy per archetype.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetPolicy {
    /// Tier below which nodes are worked by more, smaller gatherers.
    pub early_tier: u8,
    pub gatherers_per_node_early: u32,
    pub gatherers_per_node: u32,
    pub transporters_per_node: u32,
    /// Relay points required before relay operators are targeted.
    pub relay_min_points: u32,
    /// Reserve required before relay operators are targeted.
    pub relay_reserve_threshold: u32,
    pub max_upgraders: u32,
    /// Reserve per additional upgrader.
    pub reserve_per_upgrader: u32,
    /// Remaining construction progress per builder.
    pub progress_per_builder: u32,
    pub max_builders: u32,
    /// Defenders targeted per threat level (None, Low, Medium, High, Critical).
    pub defenders_by_level: [u32; 5],
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self {
            early_tier: 3,
            gatherers_per_node_early: 2,
            gatherers_per_node: 1,
            transporters_per_node: 1,
            relay_min_points: 2,
            relay_reserve_threshold: 10_000,
            max_upgraders: 4,
            reserve_per_upgrader: 50_000,
            progress_per_builder: 5_000,
            max_builders: 3,
            defenders_by_level: [0, 1, 2, 3, 4],
        }
    }
}

/// Threat-response constants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefensePolicy {
    /// Strength at which the strength half of the magnitude reaches 0.5.
    pub strength_reference: f64,
    /// Each tower divides threat magnitude by `1 + tower_damping`.
    pub tower_damping: f64,
    /// Each existing defender of the same type divides utility by `1 + crowding`.
    pub crowding: f64,
}

impl Default for DefensePolicy {
    fn default() -> Self {
        Self {
            strength_reference: 1000.0,
            tower_damping: 0.25,
            crowding: 1.0,
        }
    }
}

/// Gates for remote and expansion archetypes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemotePolicy {
    pub min_tier: u8,
    pub reserver_min_tier: u8,
    pub claimer_min_tier: u8,
    /// Intel older than this is stale; sites with stale intel are ineligible.
    pub max_intel_age: u64,
    /// Eligible sites per tier above the first.
    pub sites_per_tier: u32,
    /// Reservations below this many ticks need a reserver.
    pub reservation_refresh: u32,
}

impl Default for RemotePolicy {
    fn default() -> Self {
        Self {
            min_tier: 2,
            reserver_min_tier: 4,
            claimer_min_tier: 3,
            max_intel_age: 1500,
            sites_per_tier: 1,
            reservation_refresh: 1000,
        }
    }
}

/// Configuration for [`super::UtilityScheduler`].
///
/// # Examples
///
/// ```
/// use u_colony::scheduler::SchedulerConfig;
///
/// let mut config = SchedulerConfig::default().with_income_ratio_floor(1e-4);
/// config.weights.scout = 2.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    pub weights: UtilityWeights,
    pub economy: EconomyPolicy,
    pub targets: TargetPolicy,
    pub defense: DefensePolicy,
    pub remote: RemotePolicy,

    /// Score archetypes in parallel (requires the `parallel` feature).
    pub parallel: bool,

    /// Utility differences below this are ties.
    pub epsilon: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            weights: UtilityWeights::default(),
            economy: EconomyPolicy::default(),
            targets: TargetPolicy::default(),
            defense: DefensePolicy::default(),
            remote: RemotePolicy::default(),
            parallel: false,
            epsilon: 1e-9,
        }
    }
}

impl SchedulerConfig {
    /// Sets the base utility weights.
    pub fn with_weights(mut self, weights: UtilityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the per-archetype target policy.
    pub fn with_targets(mut self, targets: TargetPolicy) -> Self {
        self.targets = targets;
        self
    }

    /// Sets the remote expansion policy.
    pub fn with_remote(mut self, remote: RemotePolicy) -> Self {
        self.remote = remote;
        self
    }

    /// Sets the income ratio floor that bounds the scarcity multiplier.
    pub fn with_income_ratio_floor(mut self, floor: f64) -> Self {
        self.economy.income_ratio_floor = floor;
        self
    }

    /// Enables or disables parallel archetype scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in self.weights.all() {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(ConfigError::Invalid {
                    field: "weights",
                    reason: format!("{name} must be finite and non-negative, got {weight}"),
                });
            }
        }

        let e = &self.economy;
        if !(e.income_ratio_floor > 0.0 && e.income_ratio_floor <= 1.0) {
            return Err(ConfigError::invalid(
                "income_ratio_floor",
                format!("must be in (0, 1], got {}", e.income_ratio_floor),
            ));
        }
        if !(e.max_utility.is_finite() && e.max_utility > 0.0) {
            return Err(ConfigError::invalid("max_utility", "must be finite and positive"));
        }
        if e.upgrade_reserve_low >= e.upgrade_reserve_high {
            return Err(ConfigError::invalid(
                "upgrade_reserve_low",
                "must be below upgrade_reserve_high",
            ));
        }
        if e.build_reserve_low >= e.build_reserve_high {
            return Err(ConfigError::invalid(
                "build_reserve_low",
                "must be below build_reserve_high",
            ));
        }
        if e.upgrader_consumption <= 0.0 || e.builder_consumption <= 0.0 {
            return Err(ConfigError::invalid("consumption", "must be positive"));
        }
        if e.population_half_point <= 0.0 {
            return Err(ConfigError::invalid("population_half_point", "must be positive"));
        }
        if e.reserve_target == 0 {
            return Err(ConfigError::invalid("reserve_target", "must be positive"));
        }

        let t = &self.targets;
        if t.gatherers_per_node == 0 || t.gatherers_per_node_early == 0 {
            return Err(ConfigError::invalid("gatherers_per_node", "must be at least 1"));
        }
        if t.progress_per_builder == 0 || t.reserve_per_upgrader == 0 {
            return Err(ConfigError::invalid("targets", "per-worker divisors must be positive"));
        }

        let d = &self.defense;
        if d.strength_reference <= 0.0 || d.tower_damping < 0.0 || d.crowding < 0.0 {
            return Err(ConfigError::invalid(
                "defense",
                "strength_reference must be positive, damping and crowding non-negative",
            ));
        }

        if self.remote.max_intel_age == 0 {
            return Err(ConfigError::invalid("max_intel_age", "must be at least 1"));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(ConfigError::invalid("epsilon", "must be non-negative"));
        }
        Ok(())
    }
}
