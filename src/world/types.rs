//! The immutable per-cycle colony snapshot.

use crate::archetype::Archetype;
use crate::ids::{ColonyId, FacilityId, NodeId, SiteName, WorkerId};
use crate::store::AssignmentRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Colony maturity and the global expansion ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DevelopmentFacts {
    /// Discrete maturity level, 1..=8.
    pub tier: u8,
    /// Colonies currently owned across the whole agent.
    pub owned_colonies: u32,
    /// Maximum colonies the agent may own.
    pub colony_ceiling: u32,
}

impl Default for DevelopmentFacts {
    fn default() -> Self {
        Self {
            tier: 1,
            owned_colonies: 1,
            colony_ceiling: 1,
        }
    }
}

/// Budget and income figures for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EconomySnapshot {
    /// Budget that can be spent right now.
    pub available: u32,
    /// Budget ceiling the available amount regenerates toward.
    pub capacity: u32,
    /// Amount held in reserve storage.
    pub reserve: u32,
    /// Realized income per tick over the recent history window.
    pub income_per_tick: f64,
    /// Least-squares slope of the reserve per tick over the same window.
    pub reserve_trend: f64,
    /// Income the known resource nodes could yield when fully worked.
    pub theoretical_income: f64,
}

impl EconomySnapshot {
    pub fn has_positive_income(&self) -> bool {
        self.income_per_tick > 0.0
    }
}

/// Live workers partitioned by archetype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    counts: BTreeMap<Archetype, u32>,
    expiring: BTreeMap<Archetype, u32>,
    workers: BTreeSet<WorkerId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a live worker; `expiring` marks remaining lifetime below the
    /// replacement threshold.
    pub fn add(&mut self, worker: WorkerId, archetype: Archetype, expiring: bool) {
        *self.counts.entry(archetype).or_insert(0) += 1;
        if expiring {
            *self.expiring.entry(archetype).or_insert(0) += 1;
        }
        self.workers.insert(worker);
    }

    /// Builder form of [`Roster::add`] with generated worker ids.
    pub fn with(mut self, archetype: Archetype, count: u32) -> Self {
        for _ in 0..count {
            let id = WorkerId::new(format!("{}-{}", archetype.name(), self.workers.len()));
            self.add(id, archetype, false);
        }
        self
    }

    /// Builder form marking `count` existing workers of `archetype` as expiring.
    pub fn with_expiring(mut self, archetype: Archetype, count: u32) -> Self {
        let live = self.count(archetype);
        self.expiring.insert(archetype, count.min(live));
        self
    }

    pub fn count(&self, archetype: Archetype) -> u32 {
        self.counts.get(&archetype).copied().unwrap_or(0)
    }

    pub fn expiring(&self, archetype: Archetype) -> u32 {
        self.expiring.get(&archetype).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_alive(&self, worker: &WorkerId) -> bool {
        self.workers.contains(worker)
    }

    pub(crate) fn increment(&mut self, archetype: Archetype) {
        *self.counts.entry(archetype).or_insert(0) += 1;
    }
}

/// Coarse threat level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThreatLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// Normalized magnitude of the level, 0.0 for `None` up to 1.0.
    pub fn scalar(self) -> f64 {
        match self {
            ThreatLevel::None => 0.0,
            ThreatLevel::Low => 0.25,
            ThreatLevel::Medium => 0.5,
            ThreatLevel::High => 0.75,
            ThreatLevel::Critical => 1.0,
        }
    }
}

/// Hostile units counted under their dominant role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostileComposition {
    pub melee: u32,
    pub ranged: u32,
    pub healers: u32,
    pub dismantlers: u32,
}

impl HostileComposition {
    pub fn total(&self) -> u32 {
        self.melee + self.ranged + self.healers + self.dismantlers
    }
}

/// Classified threat for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatSnapshot {
    pub level: ThreatLevel,
    pub hostiles: HostileComposition,
    /// Aggregated hostile strength (damage + recovery + dismantle output).
    pub strength: f64,
}

/// A production facility.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Facility {
    pub id: FacilityId,
    pub hits: u32,
    pub hits_max: u32,
}

impl Facility {
    pub fn new(id: impl Into<String>, hits: u32, hits_max: u32) -> Self {
        Self {
            id: FacilityId::new(id),
            hits,
            hits_max,
        }
    }

    /// Remaining integrity in [0, 1].
    pub fn integrity(&self) -> f64 {
        if self.hits_max == 0 {
            return 0.0;
        }
        (self.hits as f64 / self.hits_max as f64).clamp(0.0, 1.0)
    }
}

/// Structures relevant to production decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructureInventory {
    pub facilities: Vec<Facility>,
    pub defense_towers: u32,
    pub has_storage: bool,
    pub relay_points: u32,
    /// Home resource nodes.
    pub nodes: Vec<NodeId>,
}

/// Outstanding construction work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstructionBacklog {
    pub sites: u32,
    /// Build progress still required across all sites.
    pub remaining_progress: u32,
}

impl ConstructionBacklog {
    pub fn is_empty(&self) -> bool {
        self.sites == 0
    }
}

/// Cached intelligence on one adjacent expansion site.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteSite {
    pub name: SiteName,
    pub source_count: u32,
    /// Owned or reserved by someone else.
    pub occupied: bool,
    pub hostile: bool,
    /// Tick of the last scan.
    pub last_scan: u64,
    /// Suitable as a new colony.
    pub claimable: bool,
    /// Remaining ticks on our own reservation.
    pub reservation_ticks: u32,
}

impl RemoteSite {
    pub fn new(name: impl Into<String>, source_count: u32, last_scan: u64) -> Self {
        Self {
            name: SiteName::new(name),
            source_count,
            occupied: false,
            hostile: false,
            last_scan,
            claimable: false,
            reservation_ticks: 0,
        }
    }

    /// Ticks since the last scan.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_scan)
    }
}

/// Assignments held by live workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentTable {
    records: Vec<AssignmentRecord>,
}

impl AssignmentTable {
    pub fn new(records: Vec<AssignmentRecord>) -> Self {
        Self { records }
    }

    /// Keeps only records whose worker is alive in `roster`.
    pub fn live(records: &[AssignmentRecord], roster: &Roster) -> Self {
        Self {
            records: records
                .iter()
                .filter(|r| roster.is_alive(r.worker()))
                .cloned()
                .collect(),
        }
    }

    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    pub fn on_node(&self, node: &NodeId) -> usize {
        self.records
            .iter()
            .filter(|r| r.node() == Some(node))
            .count()
    }

    pub fn at_site(&self, site: &SiteName, archetype: Archetype) -> usize {
        self.records
            .iter()
            .filter(|r| r.site() == Some(site) && r.archetype() == archetype)
            .count()
    }

    pub fn of_archetype(&self, archetype: Archetype) -> usize {
        self.records
            .iter()
            .filter(|r| r.archetype() == archetype)
            .count()
    }
}

/// Why a colony is in an emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmergencyReason {
    /// Zero foundational gatherers alive.
    NoProductionWorkers,
    /// A production facility is below the critical integrity threshold.
    FacilityCriticallyDamaged,
    /// Reserves critically low and no gatherers to replenish them.
    ReservesCriticallyLow,
}

impl EmergencyReason {
    /// Whether the reason only holds while no gatherer is alive.
    pub fn requires_no_gatherers(self) -> bool {
        matches!(
            self,
            EmergencyReason::NoProductionWorkers | EmergencyReason::ReservesCriticallyLow
        )
    }
}

/// Derived emergency condition with itemized reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyFlags {
    reasons: Vec<EmergencyReason>,
}

impl EmergencyFlags {
    pub fn new(reasons: Vec<EmergencyReason>) -> Self {
        Self { reasons }
    }

    pub fn is_emergency(&self) -> bool {
        !self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[EmergencyReason] {
        &self.reasons
    }

    pub fn contains(&self, reason: EmergencyReason) -> bool {
        self.reasons.contains(&reason)
    }

    /// Drops the reasons that a live gatherer resolves.
    pub fn clear_gatherer_reasons(&mut self) {
        self.reasons.retain(|r| !r.requires_no_gatherers());
    }
}

/// One consistent snapshot of a colony for a single decision cycle.
///
/// Produced by [`crate::world::WorldStateCache`] and shared read-only with
/// the scheduler; nothing mutates a snapshot once it is handed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    pub colony: ColonyId,
    pub tick: u64,
    pub development: DevelopmentFacts,
    pub economy: EconomySnapshot,
    pub roster: Roster,
    pub threat: ThreatSnapshot,
    pub structures: StructureInventory,
    pub construction: ConstructionBacklog,
    pub remote_sites: Vec<RemoteSite>,
    pub assignments: AssignmentTable,
    /// Facilities already producing this cycle.
    pub busy_facilities: Vec<FacilityId>,
    pub emergency: EmergencyFlags,
}

impl WorldState {
    /// Facilities free to start production, in inventory order.
    pub fn free_facilities(&self) -> impl Iterator<Item = &Facility> {
        self.structures
            .facilities
            .iter()
            .filter(|f| !self.busy_facilities.contains(&f.id))
    }

    /// The realized-to-theoretical income ratio, forced to zero while no
    /// gatherer is alive.
    pub fn income_ratio(&self) -> f64 {
        if self.roster.count(Archetype::Gatherer) == 0 {
            return 0.0;
        }
        let theoretical = self.economy.theoretical_income;
        if theoretical <= 0.0 {
            return 0.0;
        }
        (self.economy.income_per_tick / theoretical).clamp(0.0, 1.0)
    }

    /// Whether the home economy has at least one gatherer and one transporter.
    pub fn home_economy_staffed(&self) -> bool {
        self.roster.count(Archetype::Gatherer) > 0 && self.roster.count(Archetype::Transporter) > 0
    }

    /// A derived snapshot as it would look after `archetype` is admitted at
    /// `cost` on `facility`. The receiver is left untouched.
    pub fn after_admission(
        &self,
        archetype: Archetype,
        cost: u32,
        facility: Option<&FacilityId>,
    ) -> WorldState {
        let mut next = self.clone();
        next.economy.available = next.economy.available.saturating_sub(cost);
        next.roster.increment(archetype);
        if next.roster.count(Archetype::Gatherer) > 0 {
            next.emergency.clear_gatherer_reasons();
        }
        if let Some(id) = facility {
            next.busy_facilities.push(id.clone());
        }
        next
    }
}
