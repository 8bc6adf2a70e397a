//! Tiered-refresh snapshot cache.
//!
//! [`WorldStateCache`] aggregates live environment facts into one
//! [`WorldState`] per colony per tick. Two tiers:
//!
//! - **per-cycle**: budget, roster, threat, development facts, busy
//!   facilities, economy history and emergency flags are rebuilt on the
//!   first `get` of every new tick;
//! - **periodic**: structure inventory, construction backlog, remote intel
//!   and the raw assignment records are rebuilt only once
//!   [`CacheConfig::refresh_interval`] ticks have elapsed since the last
//!   periodic refresh, otherwise the previous values are reused.
//!
//! Assignment records from the periodic tier are filtered against the
//! per-cycle roster, so dead workers never hold a node or site.

use super::config::{CacheConfig, ThreatThresholds};
use super::source::{Clock, HostileFacts, ResourceFacts, WorkerFacts, WorldSource};
use super::types::{
    AssignmentTable, ConstructionBacklog, EconomySnapshot, EmergencyFlags, EmergencyReason,
    HostileComposition, RemoteSite, Roster, StructureInventory, ThreatLevel, ThreatSnapshot,
    WorldState,
};
use crate::archetype::Archetype;
use crate::ids::ColonyId;
use crate::store::{AssignmentRecord, ColonyStore, EconomySample};
use std::collections::HashMap;
use std::sync::Arc;

/// Strength contributed by each hostile module kind.
const MELEE_STRENGTH: f64 = 30.0;
const RANGED_STRENGTH: f64 = 10.0;
const HEAL_STRENGTH: f64 = 12.0;
const DISMANTLE_STRENGTH: f64 = 50.0;

/// Refresh counters, mainly for observing the tiering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Snapshots built (one per colony per new tick).
    pub cycle_refreshes: u64,
    /// Periodic-tier rebuilds.
    pub periodic_refreshes: u64,
    /// `get` calls answered from an existing snapshot.
    pub hits: u64,
}

#[derive(Debug, Clone)]
struct PeriodicFields {
    refreshed_at: u64,
    structures: StructureInventory,
    construction: ConstructionBacklog,
    remote_sites: Vec<RemoteSite>,
    assignments: Vec<AssignmentRecord>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    periodic: PeriodicFields,
    snapshot: Option<Arc<WorldState>>,
}

/// Per-colony snapshot cache with injected environment and clock.
///
/// # Examples
///
/// ```ignore
/// let mut cache = WorldStateCache::new(source, ManualClock::new(0), CacheConfig::default());
/// if let Some(state) = cache.get(&colony, &store) {
///     // hand `state` to the scheduler
/// }
/// ```
pub struct WorldStateCache<S, C> {
    source: S,
    clock: C,
    config: CacheConfig,
    entries: HashMap<ColonyId, CacheEntry>,
    stats: CacheStats,
}

impl<S: WorldSource, C: Clock> WorldStateCache<S, C> {
    /// Creates an empty cache.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`CacheConfig::validate`]
    /// first to get a descriptive error).
    pub fn new(source: S, clock: C, config: CacheConfig) -> Self {
        if let Err(e) = config.validate() {
            panic!("invalid CacheConfig: {e}");
        }
        Self {
            source,
            clock,
            config,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns the snapshot for `colony` at the current tick.
    ///
    /// Returns `None` when the colony is not controlled or visible; the
    /// caller should take no scheduling action this cycle.
    pub fn get(&mut self, colony: &ColonyId, store: &ColonyStore) -> Option<Arc<WorldState>> {
        if !self.source.is_visible(colony) {
            tracing::trace!(colony = %colony, "colony not visible, no state");
            return None;
        }
        let now = self.clock.now();

        if let Some(snapshot) = self
            .entries
            .get(colony)
            .and_then(|e| e.snapshot.as_ref())
            .filter(|s| s.tick == now)
        {
            self.stats.hits += 1;
            return Some(Arc::clone(snapshot));
        }

        let periodic_due = match self.entries.get(colony) {
            None => true,
            Some(entry) => {
                let last = entry.periodic.refreshed_at;
                now < last || now - last >= self.config.refresh_interval
            }
        };
        if periodic_due {
            let periodic = self.load_periodic(colony, store, now);
            self.stats.periodic_refreshes += 1;
            tracing::debug!(
                colony = %colony,
                tick = now,
                facilities = periodic.structures.facilities.len(),
                remote_sites = periodic.remote_sites.len(),
                "periodic tier refreshed"
            );
            self.entries.insert(
                colony.clone(),
                CacheEntry {
                    periodic,
                    snapshot: None,
                },
            );
        }

        let entry = self.entries.get(colony)?;
        let snapshot = Arc::new(self.build_snapshot(colony, store, now, &entry.periodic));
        self.stats.cycle_refreshes += 1;
        if let Some(entry) = self.entries.get_mut(colony) {
            entry.snapshot = Some(Arc::clone(&snapshot));
        }
        Some(snapshot)
    }

    /// Drops everything cached for `colony`; the next `get` rebuilds both tiers.
    ///
    /// Returns whether anything was cached.
    pub fn invalidate(&mut self, colony: &ColonyId) -> bool {
        self.entries.remove(colony).is_some()
    }

    /// Drops every cached colony.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    fn load_periodic(&self, colony: &ColonyId, store: &ColonyStore, now: u64) -> PeriodicFields {
        PeriodicFields {
            refreshed_at: now,
            structures: self.source.structures(colony),
            construction: self.source.construction(colony),
            remote_sites: self.source.remote_sites(colony),
            assignments: store.assignments(colony).to_vec(),
        }
    }

    fn build_snapshot(
        &self,
        colony: &ColonyId,
        store: &ColonyStore,
        now: u64,
        periodic: &PeriodicFields,
    ) -> WorldState {
        let roster = build_roster(&self.source.workers(colony), self.config.expiry_threshold);
        let samples = store.recent_history(colony, self.config.income_window);
        let economy = economy_snapshot(
            self.source.resources(colony),
            &samples,
            periodic.structures.nodes.len(),
            self.config.node_yield_per_tick,
        );
        let threat = classify_threat(&self.source.hostiles(colony), &self.config.threat);
        let emergency = derive_emergency(&roster, &economy, &periodic.structures, &self.config);
        let assignments = AssignmentTable::live(&periodic.assignments, &roster);

        if emergency.is_emergency() {
            tracing::debug!(colony = %colony, tick = now, reasons = ?emergency.reasons(), "colony in emergency");
        }

        WorldState {
            colony: colony.clone(),
            tick: now,
            development: self.source.development(colony),
            economy,
            roster,
            threat,
            structures: periodic.structures.clone(),
            construction: periodic.construction,
            remote_sites: periodic.remote_sites.clone(),
            assignments,
            busy_facilities: self.source.busy_facilities(colony),
            emergency,
        }
    }
}

/// Partitions live workers by archetype and flags those about to expire.
pub fn build_roster(workers: &[WorkerFacts], expiry_threshold: u32) -> Roster {
    let mut roster = Roster::new();
    for w in workers {
        roster.add(w.id.clone(), w.archetype, w.ticks_to_live < expiry_threshold);
    }
    roster
}

/// Classifies hostiles into a threat level and composition.
pub fn classify_threat(hostiles: &[HostileFacts], thresholds: &ThreatThresholds) -> ThreatSnapshot {
    let mut composition = HostileComposition::default();
    let mut strength = 0.0;

    for h in hostiles {
        let melee = h.melee_parts as f64 * MELEE_STRENGTH;
        let ranged = h.ranged_parts as f64 * RANGED_STRENGTH;
        let heal = h.heal_parts as f64 * HEAL_STRENGTH;
        let dismantle = h.dismantle_parts as f64 * DISMANTLE_STRENGTH;
        let unit = melee + ranged + heal + dismantle;
        if unit <= 0.0 {
            continue;
        }
        strength += unit;

        // Dominant role; ties favour the more dangerous role listed first.
        let roles = [
            (dismantle, &mut composition.dismantlers),
            (melee, &mut composition.melee),
            (ranged, &mut composition.ranged),
            (heal, &mut composition.healers),
        ];
        let mut best: Option<(f64, &mut u32)> = None;
        for (value, slot) in roles {
            if best.as_ref().is_none_or(|(v, _)| value > *v) {
                best = Some((value, slot));
            }
        }
        if let Some((_, slot)) = best {
            *slot += 1;
        }
    }

    let level = if strength <= 0.0 {
        ThreatLevel::None
    } else if strength < thresholds.low {
        ThreatLevel::Low
    } else if strength < thresholds.medium {
        ThreatLevel::Medium
    } else if strength < thresholds.high {
        ThreatLevel::High
    } else {
        ThreatLevel::Critical
    };

    ThreatSnapshot {
        level,
        hostiles: composition,
        strength,
    }
}

/// Combines the live budget with recent history into an [`EconomySnapshot`].
pub fn economy_snapshot(
    resources: ResourceFacts,
    samples: &[EconomySample],
    node_count: usize,
    node_yield_per_tick: f64,
) -> EconomySnapshot {
    let income_per_tick = if samples.is_empty() {
        0.0
    } else {
        samples.iter().map(|s| s.income).sum::<f64>() / samples.len() as f64
    };
    EconomySnapshot {
        available: resources.available,
        capacity: resources.capacity.max(resources.available),
        reserve: resources.reserve,
        income_per_tick,
        reserve_trend: reserve_slope(samples),
        theoretical_income: node_count as f64 * node_yield_per_tick,
    }
}

/// Least-squares slope of reserve against tick.
fn reserve_slope(samples: &[EconomySample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|s| s.tick as f64).sum::<f64>() / n;
    let mean_y = samples.iter().map(|s| s.reserve as f64).sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for s in samples {
        let dx = s.tick as f64 - mean_x;
        num += dx * (s.reserve as f64 - mean_y);
        den += dx * dx;
    }
    if den <= 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Derives emergency reasons from the freshest available data.
pub fn derive_emergency(
    roster: &Roster,
    economy: &EconomySnapshot,
    structures: &StructureInventory,
    config: &CacheConfig,
) -> EmergencyFlags {
    let mut reasons = Vec::new();
    let gatherers = roster.count(Archetype::Gatherer);
    if gatherers == 0 {
        reasons.push(EmergencyReason::NoProductionWorkers);
    }
    if structures
        .facilities
        .iter()
        .any(|f| f.integrity() < config.facility_critical_integrity)
    {
        reasons.push(EmergencyReason::FacilityCriticallyDamaged);
    }
    let held = economy.available.saturating_add(economy.reserve);
    if held < config.reserves_critical && gatherers == 0 {
        reasons.push(EmergencyReason::ReservesCriticallyLow);
    }
    EmergencyFlags::new(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FacilityId;
    use crate::world::source::ManualClock;
    use crate::world::types::{DevelopmentFacts, Facility};
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeSource {
        visible: bool,
        resources: ResourceFacts,
        workers: Vec<WorkerFacts>,
        hostiles: Vec<HostileFacts>,
        structures: StructureInventory,
        structure_reads: Cell<u32>,
    }

    impl WorldSource for FakeSource {
        fn is_visible(&self, _: &ColonyId) -> bool {
            self.visible
        }
        fn resources(&self, _: &ColonyId) -> ResourceFacts {
            self.resources
        }
        fn workers(&self, _: &ColonyId) -> Vec<WorkerFacts> {
            self.workers.clone()
        }
        fn hostiles(&self, _: &ColonyId) -> Vec<HostileFacts> {
            self.hostiles.clone()
        }
        fn development(&self, _: &ColonyId) -> DevelopmentFacts {
            DevelopmentFacts::default()
        }
        fn busy_facilities(&self, _: &ColonyId) -> Vec<FacilityId> {
            Vec::new()
        }
        fn structures(&self, _: &ColonyId) -> StructureInventory {
            self.structure_reads.set(self.structure_reads.get() + 1);
            self.structures.clone()
        }
        fn construction(&self, _: &ColonyId) -> ConstructionBacklog {
            ConstructionBacklog::default()
        }
        fn remote_sites(&self, _: &ColonyId) -> Vec<RemoteSite> {
            Vec::new()
        }
    }

    fn source() -> FakeSource {
        FakeSource {
            visible: true,
            resources: ResourceFacts {
                available: 300,
                capacity: 800,
                reserve: 0,
            },
            workers: vec![
                WorkerFacts::new("g1", Archetype::Gatherer, 1200),
                WorkerFacts::new("g2", Archetype::Gatherer, 40),
            ],
            structures: StructureInventory {
                facilities: vec![Facility::new("f1", 5000, 5000)],
                nodes: vec!["a".into(), "b".into()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn colony() -> ColonyId {
        ColonyId::new("W1N1")
    }

    #[test]
    fn test_invisible_colony_has_no_state() {
        let src = FakeSource::default();
        let clock = ManualClock::new(1);
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());
        assert!(cache.get(&colony(), &ColonyStore::new()).is_none());
    }

    #[test]
    fn test_same_tick_returns_same_snapshot() {
        let src = source();
        let clock = ManualClock::new(1);
        let store = ColonyStore::new();
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());
        let a = cache.get(&colony(), &store).unwrap();
        let b = cache.get(&colony(), &store).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().cycle_refreshes, 1);
    }

    #[test]
    fn test_periodic_tier_reused_within_interval() {
        let src = source();
        let clock = ManualClock::new(100);
        let store = ColonyStore::new();
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());

        cache.get(&colony(), &store).unwrap();
        for _ in 0..49 {
            clock.advance(1);
            cache.get(&colony(), &store).unwrap();
        }
        assert_eq!(src.structure_reads.get(), 1);
        assert_eq!(cache.stats().cycle_refreshes, 50);

        clock.advance(1);
        cache.get(&colony(), &store).unwrap();
        assert_eq!(src.structure_reads.get(), 2);
        assert_eq!(cache.stats().periodic_refreshes, 2);
    }

    #[test]
    fn test_interval_of_one_rebuilds_every_tick() {
        let src = source();
        let clock = ManualClock::new(0);
        let store = ColonyStore::new();
        let config = CacheConfig::default().with_refresh_interval(1);
        let mut cache = WorldStateCache::new(&src, &clock, config);
        for _ in 0..5 {
            cache.get(&colony(), &store).unwrap();
            clock.advance(1);
        }
        assert_eq!(src.structure_reads.get(), 5);
    }

    #[test]
    fn test_invalidate_forces_periodic_refresh() {
        let src = source();
        let clock = ManualClock::new(0);
        let store = ColonyStore::new();
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());
        cache.get(&colony(), &store).unwrap();
        assert!(cache.invalidate(&colony()));
        assert!(!cache.invalidate(&colony()));
        cache.get(&colony(), &store).unwrap();
        assert_eq!(src.structure_reads.get(), 2);

        cache.invalidate_all();
        cache.get(&colony(), &store).unwrap();
        assert_eq!(src.structure_reads.get(), 3);
    }

    #[test]
    fn test_per_cycle_fields_follow_source() {
        let src = source();
        let clock = ManualClock::new(0);
        let store = ColonyStore::new();
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());
        let state = cache.get(&colony(), &store).unwrap();
        assert_eq!(state.roster.count(Archetype::Gatherer), 2);
        assert_eq!(state.roster.expiring(Archetype::Gatherer), 1);
        assert_eq!(state.economy.available, 300);
        assert!((state.economy.theoretical_income - 20.0).abs() < 1e-10);
        assert!(!state.emergency.is_emergency());
    }

    #[test]
    fn test_assignments_filtered_to_live_workers() {
        let src = source();
        let clock = ManualClock::new(0);
        let mut store = ColonyStore::new();
        store
            .assign(
                &colony(),
                AssignmentRecord::SourceNode {
                    worker: "g1".into(),
                    archetype: Archetype::Gatherer,
                    node: "a".into(),
                },
            )
            .unwrap();
        store
            .assign(
                &colony(),
                AssignmentRecord::SourceNode {
                    worker: "gone".into(),
                    archetype: Archetype::Gatherer,
                    node: "b".into(),
                },
            )
            .unwrap();
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());
        let state = cache.get(&colony(), &store).unwrap();
        assert_eq!(state.assignments.on_node(&"a".into()), 1);
        assert_eq!(state.assignments.on_node(&"b".into()), 0);
    }

    #[test]
    fn test_emergency_without_gatherers() {
        let mut src = source();
        src.workers.clear();
        src.resources.available = 100;
        src.structures.facilities = vec![Facility::new("f1", 100, 5000)];
        let clock = ManualClock::new(0);
        let mut cache = WorldStateCache::new(&src, &clock, CacheConfig::default());
        let state = cache.get(&colony(), &ColonyStore::new()).unwrap();
        assert!(state.emergency.contains(EmergencyReason::NoProductionWorkers));
        assert!(state.emergency.contains(EmergencyReason::FacilityCriticallyDamaged));
        assert!(state.emergency.contains(EmergencyReason::ReservesCriticallyLow));
        assert_eq!(state.income_ratio(), 0.0);
    }

    #[test]
    fn test_classify_threat_levels() {
        let t = ThreatThresholds::default();
        assert_eq!(classify_threat(&[], &t).level, ThreatLevel::None);

        let scout = HostileFacts {
            ranged_parts: 1,
            ..Default::default()
        };
        assert_eq!(classify_threat(&[scout], &t).level, ThreatLevel::Low);

        let brawler = HostileFacts {
            melee_parts: 10,
            heal_parts: 5,
            ..Default::default()
        };
        let snapshot = classify_threat(&[brawler, brawler, brawler], &t);
        // (300 + 60) * 3 = 1080
        assert_eq!(snapshot.level, ThreatLevel::High);
        assert_eq!(snapshot.hostiles.melee, 3);
        assert!((snapshot.strength - 1080.0).abs() < 1e-10);

        let siege = HostileFacts {
            dismantle_parts: 40,
            ..Default::default()
        };
        let snapshot = classify_threat(&[siege, siege], &t);
        assert_eq!(snapshot.level, ThreatLevel::Critical);
        assert_eq!(snapshot.hostiles.dismantlers, 2);
    }

    #[test]
    fn test_economy_snapshot_income_and_trend() {
        let samples: Vec<EconomySample> = (0..10)
            .map(|i| EconomySample::new(i * 10, 6.0, (i * 100) as u32, 300))
            .collect();
        let economy = economy_snapshot(
            ResourceFacts {
                available: 300,
                capacity: 550,
                reserve: 900,
            },
            &samples,
            2,
            10.0,
        );
        assert!((economy.income_per_tick - 6.0).abs() < 1e-10);
        assert!((economy.reserve_trend - 10.0).abs() < 1e-9);
        assert!((economy.theoretical_income - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_economy_snapshot_without_history() {
        let economy = economy_snapshot(ResourceFacts::default(), &[], 0, 10.0);
        assert_eq!(economy.income_per_tick, 0.0);
        assert_eq!(economy.reserve_trend, 0.0);
    }
}
