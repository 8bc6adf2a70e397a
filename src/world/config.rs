//! Cache refresh and derivation parameters.

use crate::error::ConfigError;

/// Hostile strength bounds separating threat levels.
///
/// A total strength of zero is `None`; below `low` is `Low`, below `medium`
/// is `Medium`, below `high` is `High`, anything else `Critical`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for ThreatThresholds {
    fn default() -> Self {
        Self {
            low: 300.0,
            medium: 1000.0,
            high: 3000.0,
        }
    }
}

/// Configuration for [`super::WorldStateCache`].
///
/// # Examples
///
/// ```
/// use u_colony::world::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_refresh_interval(25)
///     .with_income_window(10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    /// Ticks between refreshes of the periodic tier (structures,
    /// assignments, construction backlog, remote intel).
    ///
    /// An interval of 1 rebuilds everything every tick.
    pub refresh_interval: u64,

    /// Workers with fewer ticks to live than this count as about to expire.
    pub expiry_threshold: u32,

    /// Number of recent economy samples averaged into realized income.
    pub income_window: usize,

    /// Income one fully worked resource node yields per tick.
    pub node_yield_per_tick: f64,

    /// Facility integrity below which the colony is in an emergency.
    pub facility_critical_integrity: f64,

    /// Combined available + reserve below which reserves are critical.
    pub reserves_critical: u32,

    pub threat: ThreatThresholds,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 50,
            expiry_threshold: 150,
            income_window: 20,
            node_yield_per_tick: 10.0,
            facility_critical_integrity: 0.25,
            reserves_critical: 300,
            threat: ThreatThresholds::default(),
        }
    }
}

impl CacheConfig {
    pub fn with_refresh_interval(mut self, ticks: u64) -> Self {
        self.refresh_interval = ticks;
        self
    }

    pub fn with_expiry_threshold(mut self, ticks: u32) -> Self {
        self.expiry_threshold = ticks;
        self
    }

    pub fn with_income_window(mut self, samples: usize) -> Self {
        self.income_window = samples;
        self
    }

    pub fn with_node_yield(mut self, per_tick: f64) -> Self {
        self.node_yield_per_tick = per_tick;
        self
    }

    pub fn with_threat_thresholds(mut self, thresholds: ThreatThresholds) -> Self {
        self.threat = thresholds;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval == 0 {
            return Err(ConfigError::invalid("refresh_interval", "must be at least 1"));
        }
        if self.income_window == 0 {
            return Err(ConfigError::invalid("income_window", "must be at least 1"));
        }
        if self.node_yield_per_tick.is_nan() || self.node_yield_per_tick <= 0.0 {
            return Err(ConfigError::invalid(
                "node_yield_per_tick",
                format!("must be positive, got {}", self.node_yield_per_tick),
            ));
        }
        if !(0.0..=1.0).contains(&self.facility_critical_integrity) {
            return Err(ConfigError::invalid(
                "facility_critical_integrity",
                "must be in [0, 1]",
            ));
        }
        let t = self.threat;
        if !(t.low > 0.0 && t.low < t.medium && t.medium < t.high) {
            return Err(ConfigError::invalid(
                "threat",
                "thresholds must be positive and strictly increasing",
            ));
        }
        Ok(())
    }
}
