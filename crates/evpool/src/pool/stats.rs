// File: crates/evpool/src/pool/stats.rs
use std::time::Instant;

/// Insertion and eviction statistics for event pools.
///
/// Tracks how many events went through a pool, how many were pushed out
/// again, and how large the cached events were.
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Events pushed into the pool
    pub total_insertions: u64,
    /// Events pushed out of the back of the pool
    pub total_evictions: u64,
    /// Snapshots carried by all inserted events
    pub total_snapshots_inserted: u64,
    /// Snapshots currently held
    pub cached_snapshots: u64,
    /// Largest number of events held at once
    pub peak_size: usize,
    /// Creation time of the pool
    pub creation_time: Instant,
    /// Average snapshots per inserted event
    pub average_event_size: f64,
    /// Largest inserted event
    pub largest_event: usize,
    /// Smallest inserted event
    pub smallest_event: usize,
    /// Inserted event sizes in buckets: 0, 1, 2-3, 4-7, 8-15, 16-31, 32-63, 64+
    pub multiplicity_histogram: [u64; 8],
}

impl PoolStats {
    pub fn new() -> Self {
        Self {
            total_insertions: 0,
            total_evictions: 0,
            total_snapshots_inserted: 0,
            cached_snapshots: 0,
            peak_size: 0,
            creation_time: Instant::now(),
            average_event_size: 0.0,
            largest_event: 0,
            smallest_event: usize::MAX,
            multiplicity_histogram: [0; 8],
        }
    }

    /// Record an event entering the pool; `pool_len` is the size right
    /// after the push, before any eviction.
    pub fn record_insertion(&mut self, n_snapshots: usize, pool_len: usize) {
        self.total_insertions += 1;
        self.total_snapshots_inserted += n_snapshots as u64;
        self.cached_snapshots += n_snapshots as u64;

        self.largest_event = self.largest_event.max(n_snapshots);
        self.smallest_event = self.smallest_event.min(n_snapshots);

        self.average_event_size =
            self.total_snapshots_inserted as f64 / self.total_insertions as f64;

        let bucket = Self::multiplicity_to_index(n_snapshots);
        self.multiplicity_histogram[bucket] += 1;

        self.peak_size = self.peak_size.max(pool_len);
    }

    /// Record an event leaving the back of the pool.
    pub fn record_eviction(&mut self, n_snapshots: usize) {
        self.total_evictions += 1;
        self.cached_snapshots = self.cached_snapshots.saturating_sub(n_snapshots as u64);
    }

    /// Record the pool being emptied at the end of a run.
    pub fn record_clear(&mut self) {
        self.cached_snapshots = 0;
    }

    /// Fraction of inserted events that were eventually evicted.
    pub fn turnover(&self) -> f64 {
        if self.total_insertions == 0 {
            0.0
        } else {
            self.total_evictions as f64 / self.total_insertions as f64
        }
    }

    /// Insertions per second since creation.
    pub fn insertion_rate(&self) -> f64 {
        let elapsed = self.creation_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_insertions as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Fold the counters of another pool into this one.
    pub fn merge(&mut self, other: &PoolStats) {
        self.total_insertions += other.total_insertions;
        self.total_evictions += other.total_evictions;
        self.total_snapshots_inserted += other.total_snapshots_inserted;
        self.cached_snapshots += other.cached_snapshots;
        self.peak_size = self.peak_size.max(other.peak_size);
        self.creation_time = self.creation_time.min(other.creation_time);
        self.largest_event = self.largest_event.max(other.largest_event);
        self.smallest_event = self.smallest_event.min(other.smallest_event);
        for (mine, theirs) in self
            .multiplicity_histogram
            .iter_mut()
            .zip(other.multiplicity_histogram.iter())
        {
            *mine += theirs;
        }
        self.average_event_size = if self.total_insertions == 0 {
            0.0
        } else {
            self.total_snapshots_inserted as f64 / self.total_insertions as f64
        };
    }

    /// Summary of cached content.
    pub fn utilization(&self) -> PoolUtilization {
        PoolUtilization {
            total_insertions: self.total_insertions,
            total_evictions: self.total_evictions,
            cached_snapshots: self.cached_snapshots,
            peak_size: self.peak_size,
            average_event_size: self.average_event_size,
            largest_event: self.largest_event,
            smallest_event: if self.smallest_event == usize::MAX { 0 } else { self.smallest_event },
        }
    }

    fn multiplicity_to_index(n_snapshots: usize) -> usize {
        match n_snapshots {
            0 => 0,
            1 => 1,
            2..=3 => 2,
            4..=7 => 3,
            8..=15 => 4,
            16..=31 => 5,
            32..=63 => 6,
            _ => 7,
        }
    }

    /// Reset all statistics (useful for benchmarking).
    pub fn reset_stats(&mut self) {
        *self = Self::new();
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of pool utilization for reporting.
#[derive(Debug, Clone)]
pub struct PoolUtilization {
    pub total_insertions: u64,
    pub total_evictions: u64,
    pub cached_snapshots: u64,
    pub peak_size: usize,
    pub average_event_size: f64,
    pub largest_event: usize,
    pub smallest_event: usize,
}

impl PoolUtilization {
    /// Format utilization information as a human-readable string.
    pub fn format_summary(&self) -> String {
        format!(
            "Pool Utilization:\n\
             - Events inserted: {}\n\
             - Events evicted: {}\n\
             - Snapshots cached: {}\n\
             - Peak size: {} events\n\
             - Average event: {:.1} snapshots\n\
             - Event size range: {} - {} snapshots",
            self.total_insertions,
            self.total_evictions,
            self.cached_snapshots,
            self.peak_size,
            self.average_event_size,
            self.smallest_event,
            self.largest_event,
        )
    }
}
