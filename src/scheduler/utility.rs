//! Per-archetype utility formulas.
//!
//! A utility is a non-negative, finite scalar; higher means more urgent.
//! Each formula combines the archetype's base weight with factors read from
//! the world snapshot:
//!
//! | Category     | Shape                                                     |
//! |--------------|-----------------------------------------------------------|
//! | Economic     | deficit x scarcity (inverse realized income ratio)        |
//! | Gatherer     | capped below the transporter while none is alive          |
//! | Improvement  | geometric mean of reserve, sustainability, trend, population |
//! | Construction | as improvement, plus a backlog factor                     |
//! | Defense      | threat magnitude x composition share / existing defenders |
//! | Remote       | intel freshness of the resolved site                      |
//!
//! Any archetype with a non-positive deficit scores 0, and improvement,
//! construction and remote archetypes score 0 until the home economy has
//! at least one gatherer and one transporter.

use super::assignment::{freshness, remote_site_for};
use super::config::SchedulerConfig;
use super::curves::{
    bounded, diminishing_returns, geometric_mean, scarcity_multiplier, sigmoid, smooth_ramp,
};
use super::demand::{eligible_sites, intel_is_stale};
use crate::archetype::Archetype;
use crate::world::{ThreatLevel, WorldState};

/// Utility of producing one more `archetype` given its effective `deficit`.
pub fn utility(
    archetype: Archetype,
    deficit: i64,
    world: &WorldState,
    config: &SchedulerConfig,
) -> f64 {
    if deficit <= 0 {
        return 0.0;
    }
    if archetype.category().needs_staffed_economy() && !world.home_economy_staffed() {
        return 0.0;
    }
    let weight = config.weights.base(archetype);
    let raw = match archetype {
        Archetype::Gatherer => gatherer(weight, deficit, world, config),
        Archetype::Transporter => transporter(weight, deficit, world, config),
        Archetype::RelayOperator => weight * deficit as f64,
        Archetype::Upgrader => weight * upgrade_factor(world, config),
        Archetype::Builder => weight * build_factor(world, config),
        Archetype::Defender | Archetype::RangedDefender | Archetype::Healer => {
            defense(archetype, weight, world, config)
        }
        Archetype::RemoteGatherer
        | Archetype::RemoteTransporter
        | Archetype::Reserver
        | Archetype::Claimer => remote_site_for(archetype, world, config)
            .map_or(0.0, |site| weight * freshness(site, world, config)),
        Archetype::Scout => weight * scout_urgency(world, config),
    };
    bounded(raw, config.economy.max_utility)
}

fn scarcity(world: &WorldState, config: &SchedulerConfig) -> f64 {
    scarcity_multiplier(world.income_ratio(), config.economy.income_ratio_floor)
}

fn gatherer(weight: f64, deficit: i64, world: &WorldState, config: &SchedulerConfig) -> f64 {
    let base = weight * deficit as f64;
    let hauling_missing = world.roster.count(Archetype::Gatherer) > 0
        && world.roster.count(Archetype::Transporter) == 0;
    if hauling_missing {
        // Stays below half of one starving transporter.
        return base.min(0.5 * config.weights.transporter * starvation(world, config));
    }
    base * scarcity(world, config)
}

fn transporter(weight: f64, deficit: i64, world: &WorldState, config: &SchedulerConfig) -> f64 {
    // Nothing to carry until something is gathered.
    if world.roster.count(Archetype::Gatherer) == 0 {
        return 0.0;
    }
    let base = weight * deficit as f64;
    if world.roster.count(Archetype::Transporter) > 0 {
        return base;
    }
    base * starvation(world, config)
}

/// Multiplier for a transporter while gatherers work without one.
fn starvation(world: &WorldState, config: &SchedulerConfig) -> f64 {
    if world.economy.has_positive_income() {
        config.weights.transporter_starvation_boost.max(1.0)
    } else {
        scarcity(world, config)
    }
}

/// Reserve level in `[0, 1]`: storage against its target once storage
/// exists, otherwise the spendable budget against capacity.
fn reserve_level(world: &WorldState, config: &SchedulerConfig) -> f64 {
    let e = &world.economy;
    if world.structures.has_storage {
        (e.reserve as f64 / config.economy.reserve_target as f64).min(1.0)
    } else if e.capacity == 0 {
        0.0
    } else {
        (e.available as f64 / e.capacity as f64).min(1.0)
    }
}

/// Share of income not yet committed to improvement and construction,
/// measured in units of one more worker's consumption.
fn sustainability(world: &WorldState, config: &SchedulerConfig, consumption: f64) -> f64 {
    let p = &config.economy;
    let committed = world.roster.count(Archetype::Upgrader) as f64 * p.upgrader_consumption
        + world.roster.count(Archetype::Builder) as f64 * p.builder_consumption;
    ((world.economy.income_per_tick - committed) / consumption).clamp(0.0, 1.0)
}

fn trend(world: &WorldState, config: &SchedulerConfig) -> f64 {
    sigmoid(world.economy.reserve_trend * config.economy.trend_steepness)
}

fn upgrade_factor(world: &WorldState, config: &SchedulerConfig) -> f64 {
    let p = &config.economy;
    geometric_mean(&[
        smooth_ramp(
            reserve_level(world, config),
            p.upgrade_reserve_low,
            p.upgrade_reserve_high,
        ),
        sustainability(world, config, p.upgrader_consumption),
        trend(world, config),
        diminishing_returns(world.roster.count(Archetype::Upgrader), p.population_half_point),
    ])
}

fn build_factor(world: &WorldState, config: &SchedulerConfig) -> f64 {
    let backlog = &world.construction;
    if backlog.is_empty() {
        return 0.0;
    }
    let p = &config.economy;
    let sites = backlog.sites.max(1) as f64;
    geometric_mean(&[
        smooth_ramp(reserve_level(world, config), p.build_reserve_low, p.build_reserve_high),
        sustainability(world, config, p.builder_consumption),
        trend(world, config),
        diminishing_returns(world.roster.count(Archetype::Builder), p.population_half_point),
        sites / (sites + 1.0),
    ])
}

/// Threat magnitude in `[0, 1]`, damped by defense towers.
fn threat_magnitude(world: &WorldState, config: &SchedulerConfig) -> f64 {
    let threat = &world.threat;
    if threat.level == ThreatLevel::None {
        return 0.0;
    }
    let d = &config.defense;
    let strength = threat.strength.max(0.0);
    let raw = 0.5 * threat.level.scalar() + 0.5 * strength / (strength + d.strength_reference);
    raw / (1.0 + world.structures.defense_towers as f64 * d.tower_damping)
}

fn defense(archetype: Archetype, weight: f64, world: &WorldState, config: &SchedulerConfig) -> f64 {
    let magnitude = threat_magnitude(world, config);
    if magnitude <= 0.0 {
        return 0.0;
    }
    let h = world.threat.hostiles;
    let total = h.total() as f64 + 2.0;
    let share = match archetype {
        Archetype::Defender => (h.melee + h.dismantlers + 1) as f64 / total,
        Archetype::RangedDefender => (h.ranged + h.healers + 1) as f64 / total,
        _ => 0.5,
    };
    let existing = world.roster.count(archetype) as f64;
    weight * magnitude * share / (1.0 + config.defense.crowding * existing)
}

fn scout_urgency(world: &WorldState, config: &SchedulerConfig) -> f64 {
    if world.development.tier < config.remote.min_tier || !intel_is_stale(world, config) {
        return 0.0;
    }
    if world.remote_sites.is_empty() || eligible_sites(world, config).is_empty() {
        return 1.0;
    }
    let max_age = config.remote.max_intel_age as f64;
    let oldest = world
        .remote_sites
        .iter()
        .map(|s| s.age(world.tick))
        .max()
        .unwrap_or(0) as f64;
    (oldest / (2.0 * max_age)).clamp(0.5, 1.0)
}
