// File: crates/evpool/src/pool/event_pool.rs
use std::collections::VecDeque;

use crate::pool::snapshot::SnapshotArray;
use crate::pool::stats::PoolStats;
use crate::pool::PoolError;

/// Bounded FIFO of cached events for one classification bin.
///
/// New events enter at the front; once more than `capacity` events are held,
/// the oldest one is dropped from the back. Reading front to back visits the
/// most recent event first.
#[derive(Debug, Clone)]
pub struct EventPool {
    /// Cached events, most recent at the front
    events: VecDeque<SnapshotArray>,
    /// Maximum number of events held at once
    capacity: usize,
    /// Statistics tracking
    stats: PoolStats,
}

impl EventPool {
    /// Create an empty pool holding at most `capacity` events.
    ///
    /// # Examples
    /// ```
    /// # use evpool::pool::event_pool::EventPool;
    /// let pool = EventPool::new(10).unwrap();
    /// assert_eq!(pool.capacity(), 10);
    /// assert!(pool.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        Ok(Self {
            // One extra slot for the transient overflow before eviction.
            events: VecDeque::with_capacity(capacity + 1),
            capacity,
            stats: PoolStats::new(),
        })
    }

    /// Insert an event at the front, evicting the oldest one when the pool
    /// would otherwise exceed its capacity.
    ///
    /// Returns the evicted event, if any.
    pub fn push(&mut self, event: SnapshotArray) -> Option<SnapshotArray> {
        let n_snapshots = event.len();
        self.events.push_front(event);
        self.stats.record_insertion(n_snapshots, self.events.len().min(self.capacity));

        if self.events.len() > self.capacity {
            let evicted = self.events.pop_back();
            if let Some(evicted) = &evicted {
                self.stats.record_eviction(evicted.len());
            }
            evicted
        } else {
            None
        }
    }

    /// Number of cached events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.events.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Event at position `i`, counted from the most recent.
    pub fn get(&self, i: usize) -> Option<&SnapshotArray> {
        self.events.get(i)
    }

    /// Most recently inserted event.
    pub fn front(&self) -> Option<&SnapshotArray> {
        self.events.front()
    }

    /// Oldest event still cached.
    pub fn back(&self) -> Option<&SnapshotArray> {
        self.events.back()
    }

    /// Iterate most recent first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SnapshotArray> + ExactSizeIterator {
        self.events.iter()
    }

    /// Iterate oldest first.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &SnapshotArray> {
        self.events.iter().rev()
    }

    /// Total snapshots over all cached events.
    pub fn snapshot_count(&self) -> usize {
        self.events.iter().map(SnapshotArray::len).sum()
    }

    /// Drop every cached event.
    pub fn clear(&mut self) {
        self.events.clear();
        self.stats.record_clear();
    }

    /// Get pool statistics.
    pub fn get_stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Fraction of the capacity currently in use.
    pub fn occupancy(&self) -> f32 {
        self.events.len() as f32 / self.capacity as f32
    }
}

impl<'a> IntoIterator for &'a EventPool {
    type Item = &'a SnapshotArray;
    type IntoIter = std::collections::vec_deque::Iter<'a, SnapshotArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::snapshot::{ParticleSnapshot, SourceTag};

    fn event(id: u64, n: usize) -> SnapshotArray {
        let particles = (0..n)
            .map(|i| ParticleSnapshot::from_pt_eta_phi(1.0 + i as f64, 0.0, 0.5, SourceTag::Track))
            .collect();
        SnapshotArray::new(id, particles)
    }

    fn ids(pool: &EventPool) -> Vec<u64> {
        pool.iter().map(SnapshotArray::event_id).collect()
    }

    #[test]
    fn test_pool_creation() {
        let pool = EventPool::new(5).unwrap();
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.capacity(), 5);
        assert!(pool.is_empty());
        assert!(!pool.is_full());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(EventPool::new(0), Err(PoolError::ZeroCapacity)));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut pool = EventPool::new(3).unwrap();

        assert!(pool.push(event(1, 2)).is_none());
        assert!(pool.push(event(2, 2)).is_none());
        assert!(pool.push(event(3, 2)).is_none());
        let evicted = pool.push(event(4, 2)).unwrap();

        assert_eq!(evicted.event_id(), 1);
        assert_eq!(pool.len(), 3);
        assert_eq!(ids(&pool), vec![4, 3, 2]);
        assert_eq!(pool.front().unwrap().event_id(), 4);
        assert_eq!(pool.back().unwrap().event_id(), 2);
    }

    #[test]
    fn test_bound_holds_for_many_insertions() {
        let mut pool = EventPool::new(4).unwrap();
        for id in 0..100 {
            pool.push(event(id, 1));
            assert!(pool.len() <= 4);
        }
        assert!(pool.is_full());
        assert_eq!(pool.get_stats().total_insertions, 100);
        assert_eq!(pool.get_stats().total_evictions, 96);
        assert_eq!(pool.get_stats().peak_size, 4);
    }

    #[test]
    fn test_oldest_first_iteration() {
        let mut pool = EventPool::new(3).unwrap();
        for id in 1..=3 {
            pool.push(event(id, 0));
        }
        let oldest_first: Vec<u64> = pool.iter_oldest_first().map(SnapshotArray::event_id).collect();
        assert_eq!(oldest_first, vec![1, 2, 3]);
    }

    #[test]
    fn test_snapshot_accounting() {
        let mut pool = EventPool::new(2).unwrap();
        pool.push(event(1, 3));
        pool.push(event(2, 5));
        pool.push(event(3, 1));

        assert_eq!(pool.snapshot_count(), 6);
        assert_eq!(pool.get_stats().cached_snapshots, 6);

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.get_stats().cached_snapshots, 0);
    }
}
