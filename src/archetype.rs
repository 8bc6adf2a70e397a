//! Worker archetypes and their categories.

use std::fmt;

/// A producible worker type.
///
/// Declaration order doubles as the deterministic tie-break order when two
/// candidates score identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Archetype {
    /// Foundational resource gatherer; works a home resource node.
    Gatherer,
    /// Foundational transporter; moves gathered resources to storage.
    Transporter,
    /// Stationary worker servicing reserve-energy relay points.
    RelayOperator,
    /// Improvement worker; converts surplus into development progress.
    Upgrader,
    /// Construction worker; drains the construction-site backlog.
    Builder,
    /// Melee defender.
    Defender,
    /// Ranged defender.
    RangedDefender,
    /// Recovery support for defenders.
    Healer,
    /// Gatherer stationed at an adjacent expansion site.
    RemoteGatherer,
    /// Transporter hauling from a staffed expansion site.
    RemoteTransporter,
    /// Holds a reservation on an expansion site.
    Reserver,
    /// Refreshes stale expansion-site intelligence.
    Scout,
    /// Claims a new colony when the expansion ceiling allows it.
    Claimer,
}

impl Archetype {
    /// Every archetype in declaration order.
    pub const ALL: [Archetype; 13] = [
        Archetype::Gatherer,
        Archetype::Transporter,
        Archetype::RelayOperator,
        Archetype::Upgrader,
        Archetype::Builder,
        Archetype::Defender,
        Archetype::RangedDefender,
        Archetype::Healer,
        Archetype::RemoteGatherer,
        Archetype::RemoteTransporter,
        Archetype::Reserver,
        Archetype::Scout,
        Archetype::Claimer,
    ];

    /// Returns the category this archetype belongs to.
    pub fn category(self) -> ArchetypeCategory {
        match self {
            Archetype::Gatherer | Archetype::Transporter | Archetype::RelayOperator => {
                ArchetypeCategory::Economic
            }
            Archetype::Upgrader => ArchetypeCategory::Improvement,
            Archetype::Builder => ArchetypeCategory::Construction,
            Archetype::Defender | Archetype::RangedDefender | Archetype::Healer => {
                ArchetypeCategory::Defense
            }
            Archetype::RemoteGatherer
            | Archetype::RemoteTransporter
            | Archetype::Reserver
            | Archetype::Scout
            | Archetype::Claimer => ArchetypeCategory::Remote,
        }
    }

    /// Short lowercase name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Archetype::Gatherer => "gatherer",
            Archetype::Transporter => "transporter",
            Archetype::RelayOperator => "relay_operator",
            Archetype::Upgrader => "upgrader",
            Archetype::Builder => "builder",
            Archetype::Defender => "defender",
            Archetype::RangedDefender => "ranged_defender",
            Archetype::Healer => "healer",
            Archetype::RemoteGatherer => "remote_gatherer",
            Archetype::RemoteTransporter => "remote_transporter",
            Archetype::Reserver => "reserver",
            Archetype::Scout => "scout",
            Archetype::Claimer => "claimer",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse grouping used by staffing gates and invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArchetypeCategory {
    Economic,
    Improvement,
    Construction,
    Defense,
    Remote,
}

impl ArchetypeCategory {
    /// Whether this category is suppressed while the home economy is unstaffed.
    pub fn needs_staffed_economy(self) -> bool {
        matches!(
            self,
            ArchetypeCategory::Improvement
                | ArchetypeCategory::Construction
                | ArchetypeCategory::Remote
        )
    }
}
