//! # Evpool - Event Pools for Mixed-Event Backgrounds
//!
//! Evpool caches the particle content of past collision events so that a
//! trigger particle can be correlated with particles from other, similar
//! events. The cache is split into classification bins (centrality, z-vertex,
//! event plane) and every bin keeps a bounded FIFO of recent events.
//!
//! ## Core Features
//!
//! - **Classification Grid**: pure mapping of discretised event properties to a pool index
//! - **Event Pools**: O(1) insertion with oldest-first eviction at a fixed capacity
//! - **Pool Manager**: track and cluster pools with per-event duplicate protection
//! - **Statistics Tracking**: insertion, eviction and multiplicity counters
//!
//! ## Quick Start
//!
//! ```rust
//! use evpool::pool::{AcceptanceWindow, BinGrid, ParticleSnapshot, PoolManager, SnapshotArray, SourceTag};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 4 centrality bins, 2 vertex bins, 1 event-plane bin, 5 events per bin
//! let grid = BinGrid::new(4, 2, 1)?;
//! let mut pools = PoolManager::new(grid, 5, false)?;
//!
//! let tracks = vec![
//!     ParticleSnapshot::track(1.0, 0.5, 0.2, 1.2, 1),
//!     ParticleSnapshot::track(-0.3, 2.0, -1.0, 2.3, -1),
//! ];
//! let array = SnapshotArray::select(17, tracks, AcceptanceWindow::new(0.2, 100.0));
//!
//! let bin = grid.get_bin_index(2, 1, 0);
//! pools.insert(bin, 17, array, SourceTag::Track);
//!
//! let pool = pools.lookup(bin, SourceTag::Track).unwrap();
//! println!("Cached events in {}: {}", bin, pool.len());
//! # Ok(())
//! # }
//! ```

pub mod pool;

// Re-export commonly used types for convenience
pub use pool::{
    BinGrid, BinIndex, EventPool, InsertOutcome, ParticleSnapshot, PoolError, PoolManager,
    PoolStats, SnapshotArray, SourceTag,
};

/// Version information for the evpool crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for evpool components
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Events kept per classification bin
    pub pool_max_size: usize,
    /// Number of centrality bins
    pub n_centrality_bins: usize,
    /// Number of z-vertex bins
    pub n_z_vertex_bins: usize,
    /// Number of event-plane bins
    pub n_event_plane_bins: usize,
    /// Maintain a parallel pool of calorimeter clusters
    pub mix_clusters: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_max_size: 10,
            n_centrality_bins: 1,
            n_z_vertex_bins: 1,
            n_event_plane_bins: 1,
            mix_clusters: false,
        }
    }
}

impl PoolConfig {
    /// Small collision systems: one centrality class, vertex binning only
    pub fn optimized_for_small_systems() -> Self {
        Self {
            pool_max_size: 20,
            n_centrality_bins: 1,
            n_z_vertex_bins: 10,
            n_event_plane_bins: 1,
            mix_clusters: false,
        }
    }

    /// Heavy-ion collisions: fine centrality and event-plane binning
    pub fn optimized_for_heavy_ions() -> Self {
        Self {
            pool_max_size: 5,
            n_centrality_bins: 10,
            n_z_vertex_bins: 10,
            n_event_plane_bins: 4,
            mix_clusters: false,
        }
    }

    /// Classification grid described by this configuration
    pub fn grid(&self) -> Result<BinGrid, PoolError> {
        BinGrid::new(self.n_centrality_bins, self.n_z_vertex_bins, self.n_event_plane_bins)
    }

    /// Create a pool manager using this configuration
    pub fn create_manager(&self) -> Result<PoolManager, PoolError> {
        PoolManager::new(self.grid()?, self.pool_max_size, self.mix_clusters)
    }
}
