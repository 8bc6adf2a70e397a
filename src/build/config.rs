//! Static per-archetype build configuration.
//!
//! [`ArchetypeConfig`] describes how one worker type is assembled from
//! capability modules; [`ArchetypeCatalog`] holds one per archetype and is
//! loaded once at startup.

use super::types::{modules_cost, Capability, MobilityMode, MAX_MODULES};
use crate::archetype::Archetype;
use crate::error::ConfigError;
use std::collections::BTreeMap;

/// Build configuration for a single archetype.
///
/// # Examples
///
/// ```
/// use u_colony::build::{ArchetypeConfig, Capability, MobilityMode};
///
/// let config = ArchetypeConfig::new(vec![Capability::Work])
///     .with_suffix(vec![Capability::Carry])
///     .with_mobility(MobilityMode::Paved)
///     .with_max_repeats(6)
///     .with_fallback(vec![Capability::Work, Capability::Carry, Capability::Move])
///     .with_minimum_cost(200);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchetypeConfig {
    /// Core pattern repeated as many whole times as the budget allows.
    pub pattern: Vec<Capability>,

    /// Always-present modules placed before the pattern (typically soak).
    pub prefix: Vec<Capability>,

    /// Modules appended after the pattern when affordable.
    pub suffix: Vec<Capability>,

    /// Maximum number of pattern repeats.
    pub max_repeats: usize,

    /// Budgets below this cannot produce any valid build.
    pub minimum_cost: u32,

    /// Minimal loadout used when the planned build ends up with fewer than
    /// three modules.
    pub fallback: Option<Vec<Capability>>,

    /// Mobility ratio policy.
    pub mobility: MobilityMode,

    /// Reorder modules so soak is consumed before function.
    pub sort_for_survivability: bool,

    /// Minimum viable module set; builds lacking it are rejected.
    pub required: Vec<Capability>,
}

impl ArchetypeConfig {
    /// Creates a configuration around a core pattern with paved mobility.
    ///
    /// The minimum cost defaults to one pattern plus its mobility modules.
    pub fn new(pattern: Vec<Capability>) -> Self {
        let non_mobility = pattern.iter().filter(|m| !m.is_mobility()).count();
        let minimum_cost = modules_cost(&pattern)
            + (MobilityMode::Paved.required_mobility(non_mobility) as u32)
                * Capability::Move.cost();
        Self {
            pattern,
            prefix: Vec::new(),
            suffix: Vec::new(),
            max_repeats: 1,
            minimum_cost,
            fallback: None,
            mobility: MobilityMode::Paved,
            sort_for_survivability: false,
            required: Vec::new(),
        }
    }

    /// Sets the modules placed before the first pattern repeat.
    pub fn with_prefix(mut self, prefix: Vec<Capability>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Sets the modules appended after the last pattern repeat.
    pub fn with_suffix(mut self, suffix: Vec<Capability>) -> Self {
        self.suffix = suffix;
        self
    }

    /// Sets the maximum number of pattern repeats.
    pub fn with_max_repeats(mut self, n: usize) -> Self {
        self.max_repeats = n;
        self
    }

    /// Sets the budget below which no build is attempted.
    pub fn with_minimum_cost(mut self, cost: u32) -> Self {
        self.minimum_cost = cost;
        self
    }

    /// Sets the minimal loadout for builds under three modules.
    pub fn with_fallback(mut self, fallback: Vec<Capability>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Sets the mobility mode.
    pub fn with_mobility(mut self, mode: MobilityMode) -> Self {
        self.mobility = mode;
        self
    }

    /// Enables or disables survivability ordering.
    pub fn with_survivability_sort(mut self, enabled: bool) -> Self {
        self.sort_for_survivability = enabled;
        self
    }

    /// Sets the modules every valid build must contain.
    pub fn with_required(mut self, required: Vec<Capability>) -> Self {
        self.required = required;
        self
    }

    /// Whether a finished build must carry at least one mobility module.
    ///
    /// Pattern-defined archetypes whose pattern has no mobility module are
    /// intentionally immobile and exempt.
    pub fn requires_mobility(&self) -> bool {
        match self.mobility {
            MobilityMode::PatternDefined => self.pattern.iter().any(|m| m.is_mobility()),
            _ => true,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern.is_empty() {
            return Err(ConfigError::invalid("pattern", "must not be empty"));
        }
        if self.max_repeats == 0 {
            return Err(ConfigError::invalid("max_repeats", "must be at least 1"));
        }
        let fixed = self.prefix.len() + self.suffix.len() + self.pattern.len();
        if fixed > MAX_MODULES {
            return Err(ConfigError::invalid(
                "pattern",
                format!("prefix + pattern + suffix exceed {MAX_MODULES} modules"),
            ));
        }
        let required_cost = modules_cost(&self.required);
        if self.minimum_cost < required_cost {
            return Err(ConfigError::invalid(
                "minimum_cost",
                format!(
                    "{} is below the cost of the required modules ({required_cost})",
                    self.minimum_cost
                ),
            ));
        }
        if let Some(fallback) = &self.fallback {
            if fallback.is_empty() || fallback.len() > MAX_MODULES {
                return Err(ConfigError::invalid(
                    "fallback",
                    format!("must hold 1..={MAX_MODULES} modules"),
                ));
            }
        }
        Ok(())
    }
}

/// One [`ArchetypeConfig`] per archetype.
///
/// [`ArchetypeCatalog::default`] is the standard roster; individual entries
/// can be replaced with [`ArchetypeCatalog::with_config`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchetypeCatalog {
    configs: BTreeMap<Archetype, ArchetypeConfig>,
}

impl ArchetypeCatalog {
    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self {
            configs: BTreeMap::new(),
        }
    }

    pub fn with_config(mut self, archetype: Archetype, config: ArchetypeConfig) -> Self {
        self.configs.insert(archetype, config);
        self
    }

    pub fn get(&self, archetype: Archetype) -> Option<&ArchetypeConfig> {
        self.configs.get(&archetype)
    }

    /// Configured archetypes in tie-break order.
    pub fn archetypes(&self) -> impl Iterator<Item = Archetype> + '_ {
        self.configs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Validates every entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.configs.is_empty() {
            return Err(ConfigError::MissingArchetype(
                Archetype::Gatherer.name().to_string(),
            ));
        }
        for (archetype, config) in &self.configs {
            config.validate().map_err(|e| ConfigError::Archetype {
                archetype: archetype.name().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

impl Default for ArchetypeCatalog {
    fn default() -> Self {
        use Capability::*;

        Self::empty()
            .with_config(
                Archetype::Gatherer,
                ArchetypeConfig::new(vec![Work])
                    .with_suffix(vec![Carry])
                    .with_max_repeats(6)
                    .with_fallback(vec![Work, Carry, Move])
                    .with_minimum_cost(200)
                    .with_required(vec![Work]),
            )
            .with_config(
                Archetype::Transporter,
                ArchetypeConfig::new(vec![Carry, Carry])
                    .with_max_repeats(16)
                    .with_fallback(vec![Carry, Carry, Move])
                    .with_minimum_cost(150)
                    .with_required(vec![Carry]),
            )
            .with_config(
                Archetype::RelayOperator,
                ArchetypeConfig::new(vec![Carry, Carry])
                    .with_mobility(MobilityMode::Stationary)
                    .with_max_repeats(8)
                    .with_fallback(vec![Carry, Carry, Move])
                    .with_minimum_cost(150)
                    .with_required(vec![Carry]),
            )
            .with_config(
                Archetype::Upgrader,
                ArchetypeConfig::new(vec![Work])
                    .with_suffix(vec![Carry])
                    .with_mobility(MobilityMode::Stationary)
                    .with_max_repeats(15)
                    .with_fallback(vec![Work, Carry, Move])
                    .with_minimum_cost(200)
                    .with_required(vec![Work, Carry]),
            )
            .with_config(
                Archetype::Builder,
                ArchetypeConfig::new(vec![Work, Carry])
                    .with_mobility(MobilityMode::OpenTerrain)
                    .with_max_repeats(8)
                    .with_fallback(vec![Work, Carry, Move])
                    .with_minimum_cost(200)
                    .with_required(vec![Work, Carry]),
            )
            .with_config(
                Archetype::Defender,
                ArchetypeConfig::new(vec![Attack])
                    .with_prefix(vec![Tough, Tough])
                    .with_mobility(MobilityMode::OpenTerrain)
                    .with_max_repeats(10)
                    .with_fallback(vec![Tough, Attack, Move])
                    .with_minimum_cost(140)
                    .with_survivability_sort(true)
                    .with_required(vec![Attack]),
            )
            .with_config(
                Archetype::RangedDefender,
                ArchetypeConfig::new(vec![RangedAttack])
                    .with_prefix(vec![Tough])
                    .with_mobility(MobilityMode::OpenTerrain)
                    .with_max_repeats(8)
                    .with_fallback(vec![RangedAttack, Move])
                    .with_minimum_cost(200)
                    .with_survivability_sort(true)
                    .with_required(vec![RangedAttack]),
            )
            .with_config(
                Archetype::Healer,
                ArchetypeConfig::new(vec![Heal])
                    .with_mobility(MobilityMode::OpenTerrain)
                    .with_max_repeats(6)
                    .with_fallback(vec![Heal, Move])
                    .with_minimum_cost(300)
                    .with_survivability_sort(true)
                    .with_required(vec![Heal]),
            )
            .with_config(
                Archetype::RemoteGatherer,
                ArchetypeConfig::new(vec![Work, Move])
                    .with_suffix(vec![Carry])
                    .with_mobility(MobilityMode::PatternDefined)
                    .with_max_repeats(6)
                    .with_fallback(vec![Work, Carry, Move])
                    .with_minimum_cost(200)
                    .with_required(vec![Work]),
            )
            .with_config(
                Archetype::RemoteTransporter,
                ArchetypeConfig::new(vec![Carry, Carry, Move])
                    .with_prefix(vec![Work])
                    .with_mobility(MobilityMode::PatternDefined)
                    .with_max_repeats(10)
                    .with_fallback(vec![Carry, Carry, Move])
                    .with_minimum_cost(150)
                    .with_required(vec![Carry]),
            )
            .with_config(
                Archetype::Reserver,
                ArchetypeConfig::new(vec![Claim, Move])
                    .with_mobility(MobilityMode::PatternDefined)
                    .with_max_repeats(2)
                    .with_minimum_cost(650)
                    .with_required(vec![Claim]),
            )
            .with_config(
                Archetype::Scout,
                ArchetypeConfig::new(vec![Move])
                    .with_mobility(MobilityMode::PatternDefined)
                    .with_minimum_cost(50)
                    .with_required(vec![Move]),
            )
            .with_config(
                Archetype::Claimer,
                ArchetypeConfig::new(vec![Claim, Move])
                    .with_mobility(MobilityMode::PatternDefined)
                    .with_minimum_cost(650)
                    .with_required(vec![Claim]),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = ArchetypeCatalog::default();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.len(), Archetype::ALL.len());
    }

    #[test]
    fn test_catalog_order_follows_archetype_order() {
        let catalog = ArchetypeCatalog::default();
        let order: Vec<Archetype> = catalog.archetypes().collect();
        assert_eq!(order, Archetype::ALL.to_vec());
    }

    #[test]
    fn test_new_defaults_minimum_cost() {
        let config = ArchetypeConfig::new(vec![Capability::Work, Capability::Work]);
        // two Work + one Move for the paved ratio
        assert_eq!(config.minimum_cost, 250);
    }

    #[test]
    fn test_validate_empty_pattern() {
        let config = ArchetypeConfig::new(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_minimum_below_required() {
        let config = ArchetypeConfig::new(vec![Capability::Claim])
            .with_required(vec![Capability::Claim])
            .with_minimum_cost(100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_repeats() {
        let config = ArchetypeConfig::new(vec![Capability::Work]).with_max_repeats(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_requires_mobility() {
        let immobile = ArchetypeConfig::new(vec![Capability::Work])
            .with_mobility(MobilityMode::PatternDefined);
        assert!(!immobile.requires_mobility());

        let walking = ArchetypeConfig::new(vec![Capability::Claim, Capability::Move])
            .with_mobility(MobilityMode::PatternDefined);
        assert!(walking.requires_mobility());

        let stationary = ArchetypeConfig::new(vec![Capability::Work])
            .with_mobility(MobilityMode::Stationary);
        assert!(stationary.requires_mobility());
    }

    #[test]
    fn test_empty_catalog_invalid() {
        assert!(ArchetypeCatalog::empty().validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_catalog_round_trips_through_json() {
        let catalog = ArchetypeCatalog::default();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: ArchetypeCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
        assert!(back.validate().is_ok());
    }
}
