//! Bounded event pools for mixed-event correlation.
//!
//! This module holds the classification grid, the particle snapshots that
//! are cached per event, the per-bin FIFO pools and the manager owning them.

pub mod binning;
pub mod event_pool;
pub mod manager;
pub mod snapshot;
pub mod stats;

pub use binning::{BinEdges, BinGrid, BinIndex, BinKey};
pub use event_pool::EventPool;
pub use manager::{InsertOutcome, PoolManager};
pub use snapshot::{AcceptanceWindow, ParticleSnapshot, SnapshotArray, SourceTag};
pub use stats::{PoolStats, PoolUtilization};

/// Errors raised while setting up event pools
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Pool capacity must be at least one event")]
    ZeroCapacity,

    #[error("Empty classification grid: {n_centrality} x {n_z_vertex} x {n_event_plane} bins")]
    EmptyGrid {
        n_centrality: usize,
        n_z_vertex: usize,
        n_event_plane: usize,
    },

    #[error("Classification grid too large: {n_centrality} x {n_z_vertex} x {n_event_plane} bins")]
    GridTooLarge {
        n_centrality: usize,
        n_z_vertex: usize,
        n_event_plane: usize,
    },

    #[error("Invalid bin edges: need at least two strictly increasing edges, got {0}")]
    InvalidEdges(usize),
}
