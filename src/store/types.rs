//! Typed persistent records.

use crate::archetype::Archetype;
use crate::error::StoreError;
use crate::ids::{NodeId, SiteName, WorkerId};

/// Which external target a worker has been assigned to.
///
/// Each kind has a fixed schema and a fixed set of archetypes allowed to hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AssignmentRecord {
    /// A home resource node worked by a gatherer.
    SourceNode {
        worker: WorkerId,
        archetype: Archetype,
        node: NodeId,
    },
    /// An expansion site served by a remote worker.
    RemoteSite {
        worker: WorkerId,
        archetype: Archetype,
        site: SiteName,
    },
    /// The relay hub of the home colony.
    Relay {
        worker: WorkerId,
        archetype: Archetype,
    },
}

impl AssignmentRecord {
    pub fn worker(&self) -> &WorkerId {
        match self {
            AssignmentRecord::SourceNode { worker, .. }
            | AssignmentRecord::RemoteSite { worker, .. }
            | AssignmentRecord::Relay { worker, .. } => worker,
        }
    }

    pub fn archetype(&self) -> Archetype {
        match self {
            AssignmentRecord::SourceNode { archetype, .. }
            | AssignmentRecord::RemoteSite { archetype, .. }
            | AssignmentRecord::Relay { archetype, .. } => *archetype,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AssignmentRecord::SourceNode { .. } => "source_node",
            AssignmentRecord::RemoteSite { .. } => "remote_site",
            AssignmentRecord::Relay { .. } => "relay",
        }
    }

    /// The node this record points at, if it is a node assignment.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            AssignmentRecord::SourceNode { node, .. } => Some(node),
            _ => None,
        }
    }

    /// The site this record points at, if it is a site assignment.
    pub fn site(&self) -> Option<&SiteName> {
        match self {
            AssignmentRecord::RemoteSite { site, .. } => Some(site),
            _ => None,
        }
    }

    /// Checks the schema of this record.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.worker().is_empty() {
            return Err(StoreError::EmptyIdentifier("worker"));
        }
        let archetype = self.archetype();
        let allowed = match self {
            AssignmentRecord::SourceNode { node, .. } => {
                if node.is_empty() {
                    return Err(StoreError::EmptyIdentifier("node"));
                }
                archetype == Archetype::Gatherer
            }
            AssignmentRecord::RemoteSite { site, .. } => {
                if site.is_empty() {
                    return Err(StoreError::EmptyIdentifier("site"));
                }
                matches!(
                    archetype,
                    Archetype::RemoteGatherer
                        | Archetype::RemoteTransporter
                        | Archetype::Reserver
                        | Archetype::Scout
                        | Archetype::Claimer
                )
            }
            AssignmentRecord::Relay { .. } => archetype == Archetype::RelayOperator,
        };
        if !allowed {
            return Err(StoreError::IncompatibleArchetype {
                archetype: archetype.name().to_string(),
                kind: self.kind(),
            });
        }
        Ok(())
    }
}

/// One sample of a colony's economy, recorded by the caller each cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EconomySample {
    pub tick: u64,
    /// Resources gathered during the sampled tick.
    pub income: f64,
    /// Resources held in reserve storage.
    pub reserve: u32,
    /// Budget available for production.
    pub available: u32,
}

impl EconomySample {
    pub fn new(tick: u64, income: f64, reserve: u32, available: u32) -> Self {
        Self {
            tick,
            income,
            reserve,
            available,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if !self.income.is_finite() || self.income < 0.0 {
            return Err(StoreError::InvalidSample(format!(
                "income must be finite and non-negative, got {}",
                self.income
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_node_only_for_gatherers() {
        let ok = AssignmentRecord::SourceNode {
            worker: "w1".into(),
            archetype: Archetype::Gatherer,
            node: "n1".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = AssignmentRecord::SourceNode {
            worker: "w1".into(),
            archetype: Archetype::Builder,
            node: "n1".into(),
        };
        assert!(matches!(
            bad.validate(),
            Err(StoreError::IncompatibleArchetype { kind: "source_node", .. })
        ));
    }

    #[test]
    fn test_empty_identifiers_rejected() {
        let record = AssignmentRecord::RemoteSite {
            worker: "w1".into(),
            archetype: Archetype::Reserver,
            site: "".into(),
        };
        assert_eq!(record.validate(), Err(StoreError::EmptyIdentifier("site")));

        let record = AssignmentRecord::Relay {
            worker: "".into(),
            archetype: Archetype::RelayOperator,
        };
        assert_eq!(record.validate(), Err(StoreError::EmptyIdentifier("worker")));
    }

    #[test]
    fn test_sample_validation() {
        assert!(EconomySample::new(1, 4.0, 0, 300).validate().is_ok());
        assert!(EconomySample::new(1, -1.0, 0, 300).validate().is_err());
        assert!(EconomySample::new(1, f64::NAN, 0, 300).validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_record_serializes_with_kind_tag() {
        let record = AssignmentRecord::RemoteSite {
            worker: "rg1".into(),
            archetype: Archetype::RemoteGatherer,
            site: "W2N1".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""kind":"remote_site""#));
        let back: AssignmentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unknown_record_kind_rejected() {
        let json = r#"{"kind":"mystery","worker":"w","archetype":"Gatherer"}"#;
        assert!(serde_json::from_str::<AssignmentRecord>(json).is_err());
    }
}
