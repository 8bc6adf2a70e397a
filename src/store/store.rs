//! In-memory persistent store owned by the scheduler's callers.

use super::types::{AssignmentRecord, EconomySample};
use crate::error::StoreError;
use crate::ids::{ColonyId, WorkerId};
use std::collections::{HashMap, VecDeque};

/// Default number of economy samples retained per colony.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

#[derive(Debug, Clone, Default)]
struct ColonyRecords {
    assignments: Vec<AssignmentRecord>,
    history: VecDeque<EconomySample>,
}

/// Per-colony assignment records and economy history.
///
/// Callers write after admitting a worker or sampling the economy; the
/// scheduler only reads. Every write is validated here so readers can rely
/// on the record schema.
///
/// # Examples
///
/// ```
/// use u_colony::archetype::Archetype;
/// use u_colony::ids::ColonyId;
/// use u_colony::store::{AssignmentRecord, ColonyStore, EconomySample};
///
/// let colony = ColonyId::new("W1N1");
/// let mut store = ColonyStore::new();
/// store
///     .assign(&colony, AssignmentRecord::SourceNode {
///         worker: "g1".into(),
///         archetype: Archetype::Gatherer,
///         node: "src-a".into(),
///     })
///     .unwrap();
/// store.record_sample(&colony, EconomySample::new(10, 8.0, 0, 300)).unwrap();
/// assert_eq!(store.assignments(&colony).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ColonyStore {
    colonies: HashMap<ColonyId, ColonyRecords>,
    history_capacity: usize,
}

impl ColonyStore {
    pub fn new() -> Self {
        Self {
            colonies: HashMap::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Sets how many samples are retained per colony (minimum 1).
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    /// Records a new assignment.
    pub fn assign(
        &mut self,
        colony: &ColonyId,
        record: AssignmentRecord,
    ) -> Result<(), StoreError> {
        record.validate()?;
        let records = self.colonies.entry(colony.clone()).or_default();
        if records
            .assignments
            .iter()
            .any(|r| r.worker() == record.worker())
        {
            return Err(StoreError::DuplicateWorker(record.worker().to_string()));
        }
        records.assignments.push(record);
        Ok(())
    }

    /// Removes and returns the assignment held by `worker`.
    pub fn release(&mut self, colony: &ColonyId, worker: &WorkerId) -> Option<AssignmentRecord> {
        let records = self.colonies.get_mut(colony)?;
        let index = records.assignments.iter().position(|r| r.worker() == worker)?;
        Some(records.assignments.remove(index))
    }

    /// Drops assignments whose worker no longer satisfies `alive`.
    ///
    /// Returns the number of records removed.
    pub fn retain_workers<F>(&mut self, colony: &ColonyId, mut alive: F) -> usize
    where
        F: FnMut(&WorkerId) -> bool,
    {
        let Some(records) = self.colonies.get_mut(colony) else {
            return 0;
        };
        let before = records.assignments.len();
        records.assignments.retain(|r| alive(r.worker()));
        before - records.assignments.len()
    }

    /// Appends an economy sample, evicting the oldest beyond capacity.
    pub fn record_sample(
        &mut self,
        colony: &ColonyId,
        sample: EconomySample,
    ) -> Result<(), StoreError> {
        sample.validate()?;
        let capacity = self.history_capacity;
        let records = self.colonies.entry(colony.clone()).or_default();
        if let Some(last) = records.history.back() {
            if sample.tick <= last.tick {
                return Err(StoreError::NonMonotonicSample {
                    last: last.tick,
                    tick: sample.tick,
                });
            }
        }
        records.history.push_back(sample);
        while records.history.len() > capacity {
            records.history.pop_front();
        }
        Ok(())
    }

    pub fn assignments(&self, colony: &ColonyId) -> &[AssignmentRecord] {
        self.colonies
            .get(colony)
            .map(|r| r.assignments.as_slice())
            .unwrap_or(&[])
    }

    /// Economy samples, oldest first.
    pub fn history(
        &self,
        colony: &ColonyId,
    ) -> impl DoubleEndedIterator<Item = &EconomySample> + ExactSizeIterator {
        static EMPTY: VecDeque<EconomySample> = VecDeque::new();
        self.colonies
            .get(colony)
            .map_or(&EMPTY, |r| &r.history)
            .iter()
    }

    /// The most recent `n` samples, oldest first.
    pub fn recent_history(&self, colony: &ColonyId, n: usize) -> Vec<EconomySample> {
        let history = self.history(colony);
        let skip = history.len().saturating_sub(n);
        history.skip(skip).copied().collect()
    }
}

impl Default for ColonyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::Archetype;

    fn colony() -> ColonyId {
        ColonyId::new("W1N1")
    }

    fn gatherer(worker: &str, node: &str) -> AssignmentRecord {
        AssignmentRecord::SourceNode {
            worker: worker.into(),
            archetype: Archetype::Gatherer,
            node: node.into(),
        }
    }

    #[test]
    fn test_assign_and_release() {
        let mut store = ColonyStore::new();
        store.assign(&colony(), gatherer("g1", "a")).unwrap();
        store.assign(&colony(), gatherer("g2", "b")).unwrap();
        assert_eq!(store.assignments(&colony()).len(), 2);

        let released = store.release(&colony(), &"g1".into()).unwrap();
        assert_eq!(released.worker().as_str(), "g1");
        assert_eq!(store.assignments(&colony()).len(), 1);
        assert!(store.release(&colony(), &"g1".into()).is_none());
    }

    #[test]
    fn test_duplicate_worker_rejected() {
        let mut store = ColonyStore::new();
        store.assign(&colony(), gatherer("g1", "a")).unwrap();
        let err = store.assign(&colony(), gatherer("g1", "b")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateWorker("g1".into()));
    }

    #[test]
    fn test_invalid_record_rejected_at_boundary() {
        let mut store = ColonyStore::new();
        let record = AssignmentRecord::Relay {
            worker: "x".into(),
            archetype: Archetype::Gatherer,
        };
        assert!(store.assign(&colony(), record).is_err());
        assert!(store.assignments(&colony()).is_empty());
    }

    #[test]
    fn test_retain_workers() {
        let mut store = ColonyStore::new();
        store.assign(&colony(), gatherer("g1", "a")).unwrap();
        store.assign(&colony(), gatherer("g2", "a")).unwrap();
        let removed = store.retain_workers(&colony(), |w| w.as_str() == "g2");
        assert_eq!(removed, 1);
        assert_eq!(store.assignments(&colony())[0].worker().as_str(), "g2");
        assert_eq!(store.retain_workers(&ColonyId::new("none"), |_| false), 0);
    }

    #[test]
    fn test_history_capacity_and_order() {
        let mut store = ColonyStore::new().with_history_capacity(3);
        for tick in 1..=5 {
            store
                .record_sample(&colony(), EconomySample::new(tick, tick as f64, 0, 0))
                .unwrap();
        }
        let ticks: Vec<u64> = store.history(&colony()).map(|s| s.tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);

        let recent: Vec<u64> = store.recent_history(&colony(), 2).iter().map(|s| s.tick).collect();
        assert_eq!(recent, vec![4, 5]);
    }

    #[test]
    fn test_non_monotonic_sample_rejected() {
        let mut store = ColonyStore::new();
        store.record_sample(&colony(), EconomySample::new(10, 1.0, 0, 0)).unwrap();
        let err = store
            .record_sample(&colony(), EconomySample::new(10, 1.0, 0, 0))
            .unwrap_err();
        assert_eq!(err, StoreError::NonMonotonicSample { last: 10, tick: 10 });
    }

    #[test]
    fn test_unknown_colony_reads_empty() {
        let store = ColonyStore::new();
        assert!(store.assignments(&colony()).is_empty());
        assert_eq!(store.history(&colony()).len(), 0);
    }
}
