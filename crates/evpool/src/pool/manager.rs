// File: crates/evpool/src/pool/manager.rs
use tracing::{debug, trace};

use crate::pool::binning::{BinGrid, BinIndex};
use crate::pool::event_pool::EventPool;
use crate::pool::snapshot::{SnapshotArray, SourceTag};
use crate::pool::stats::PoolStats;
use crate::pool::PoolError;

/// Result of a [`PoolManager::insert`] call.
///
/// Only `Inserted` changes any state; every other outcome drops the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored; carries the id of the event pushed out of the pool, if any.
    Inserted { evicted: Option<u64> },
    /// The classification fell outside the grid.
    InvalidBin,
    /// The same raw event was already inserted for this kind.
    Duplicate,
    /// No pool of this kind was ever requested.
    PoolAbsent,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// One pool per bin for a single snapshot kind.
#[derive(Debug, Clone)]
struct PoolSet {
    pools: Vec<EventPool>,
    /// Raw id of the last event stored, guards against double insertion
    last_inserted: Option<u64>,
}

impl PoolSet {
    fn new(grid: &BinGrid, capacity: usize) -> Result<Self, PoolError> {
        let pools = (0..grid.len())
            .map(|_| EventPool::new(capacity))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pools,
            last_inserted: None,
        })
    }
}

/// Owner of every event pool of an analysis run.
///
/// Holds one [`EventPool`] per classification bin for tracks and, when
/// requested, a parallel set for calorimeter clusters. The manager lives for
/// the whole run and is handed to the correlator by reference.
#[derive(Debug, Clone)]
pub struct PoolManager {
    grid: BinGrid,
    capacity: usize,
    tracks: PoolSet,
    clusters: Option<PoolSet>,
}

impl PoolManager {
    /// Create a manager with empty track pools for every bin of `grid`, and
    /// cluster pools as well when `with_clusters` is set.
    ///
    /// # Examples
    /// ```
    /// # use evpool::pool::{BinGrid, PoolManager, SourceTag};
    /// let grid = BinGrid::new(2, 3, 1).unwrap();
    /// let manager = PoolManager::new(grid, 5, false).unwrap();
    /// assert!(manager.lookup(grid.get_bin_index(1, 2, 0), SourceTag::Track).is_some());
    /// assert!(manager.lookup(grid.get_bin_index(1, 2, 0), SourceTag::Cluster).is_none());
    /// ```
    pub fn new(grid: BinGrid, capacity: usize, with_clusters: bool) -> Result<Self, PoolError> {
        let tracks = PoolSet::new(&grid, capacity)?;
        let clusters = if with_clusters {
            Some(PoolSet::new(&grid, capacity)?)
        } else {
            None
        };

        debug!(
            bins = grid.len(),
            capacity,
            with_clusters,
            "event pools created"
        );

        Ok(Self {
            grid,
            capacity,
            tracks,
            clusters,
        })
    }

    /// Add cluster pools to a manager created without them.
    ///
    /// Does nothing if they already exist.
    pub fn enable_clusters(&mut self) -> Result<(), PoolError> {
        if self.clusters.is_none() {
            self.clusters = Some(PoolSet::new(&self.grid, self.capacity)?);
            debug!(bins = self.grid.len(), "cluster pools created");
        }
        Ok(())
    }

    pub fn grid(&self) -> &BinGrid {
        &self.grid
    }

    /// Per-bin capacity shared by every pool.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether pools of `kind` were instantiated.
    pub fn has_kind(&self, kind: SourceTag) -> bool {
        self.set(kind).is_some()
    }

    /// Store an event's snapshots in the pool of `bin` for `kind`.
    ///
    /// The array is dropped without touching any pool when the bin is
    /// invalid, when `kind` has no pools, or when `raw_event_id` is the event
    /// last stored for `kind`.
    pub fn insert(
        &mut self,
        bin: BinIndex,
        raw_event_id: u64,
        array: SnapshotArray,
        kind: SourceTag,
    ) -> InsertOutcome {
        let Some(slot) = bin.as_usize().filter(|&i| i < self.grid.len()) else {
            trace!(raw_event_id, ?kind, "event outside classification grid, not cached");
            return InsertOutcome::InvalidBin;
        };

        let Some(set) = self.set_mut(kind) else {
            trace!(raw_event_id, ?kind, "no pool of this kind, not cached");
            return InsertOutcome::PoolAbsent;
        };

        if set.last_inserted == Some(raw_event_id) {
            trace!(raw_event_id, ?kind, "event already cached");
            return InsertOutcome::Duplicate;
        }

        set.last_inserted = Some(raw_event_id);
        let pool = &mut set.pools[slot];
        let evicted = pool.push(array).map(|old| old.event_id());

        trace!(
            raw_event_id,
            ?kind,
            %bin,
            size = pool.len(),
            ?evicted,
            "event cached"
        );

        InsertOutcome::Inserted { evicted }
    }

    /// Pool of `bin` for `kind`, or `None` for an invalid bin or a kind that
    /// was never instantiated.
    pub fn lookup(&self, bin: BinIndex, kind: SourceTag) -> Option<&EventPool> {
        let slot = bin.as_usize()?;
        self.set(kind)?.pools.get(slot)
    }

    /// Raw id of the last event stored for `kind`.
    pub fn last_inserted(&self, kind: SourceTag) -> Option<u64> {
        self.set(kind)?.last_inserted
    }

    /// Events cached over all bins of `kind`.
    pub fn total_cached_events(&self, kind: SourceTag) -> usize {
        self.set(kind)
            .map(|set| set.pools.iter().map(EventPool::len).sum())
            .unwrap_or(0)
    }

    /// Statistics of every pool of `kind` merged together.
    pub fn stats(&self, kind: SourceTag) -> Option<PoolStats> {
        let set = self.set(kind)?;
        let mut merged = PoolStats::new();
        for pool in &set.pools {
            merged.merge(pool.get_stats());
        }
        Some(merged)
    }

    /// Release every cached event. The pools themselves stay allocated.
    pub fn clear(&mut self) {
        for set in std::iter::once(&mut self.tracks).chain(self.clusters.as_mut()) {
            set.pools.iter_mut().for_each(EventPool::clear);
            set.last_inserted = None;
        }
    }

    fn set(&self, kind: SourceTag) -> Option<&PoolSet> {
        match kind {
            SourceTag::Track => Some(&self.tracks),
            SourceTag::Cluster => self.clusters.as_ref(),
        }
    }

    fn set_mut(&mut self, kind: SourceTag) -> Option<&mut PoolSet> {
        match kind {
            SourceTag::Track => Some(&mut self.tracks),
            SourceTag::Cluster => self.clusters.as_mut(),
        }
    }
}
