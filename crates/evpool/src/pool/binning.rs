// File: crates/evpool/src/pool/binning.rs
//! Event classification binning.
//!
//! Every event is classified by centrality, z-vertex and event-plane bin.
//! [`BinGrid`] collapses the three discretised coordinates into one flat
//! pool index so that only events with similar characteristics are mixed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pool::PoolError;

/// Flat index of a classification bin.
///
/// Either a valid index in `[0, Nc*Nz*Nrp)` or [`BinIndex::INVALID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BinIndex(i32);

impl BinIndex {
    /// Sentinel for events whose classification fell outside the grid.
    pub const INVALID: BinIndex = BinIndex(-1);

    /// Raw signed value, `-1` for the sentinel.
    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// The index as a slot position, or `None` for the sentinel.
    pub fn as_usize(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for BinIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "bin {}", self.0)
        } else {
            write!(f, "invalid bin")
        }
    }
}

/// Discretised classification of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinKey {
    pub centrality: i32,
    pub z_vertex: i32,
    pub event_plane: i32,
}

impl BinKey {
    pub fn new(centrality: i32, z_vertex: i32, event_plane: i32) -> Self {
        Self {
            centrality,
            z_vertex,
            event_plane,
        }
    }
}

/// Dimensions of the centrality × z-vertex × event-plane grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinGrid {
    n_centrality: usize,
    n_z_vertex: usize,
    n_event_plane: usize,
}

impl BinGrid {
    /// Create a grid. Every dimension needs at least one bin and the total
    /// must fit the signed index range.
    pub fn new(n_centrality: usize, n_z_vertex: usize, n_event_plane: usize) -> Result<Self, PoolError> {
        if n_centrality == 0 || n_z_vertex == 0 || n_event_plane == 0 {
            return Err(PoolError::EmptyGrid {
                n_centrality,
                n_z_vertex,
                n_event_plane,
            });
        }

        let total = n_centrality
            .checked_mul(n_z_vertex)
            .and_then(|n| n.checked_mul(n_event_plane))
            .filter(|&n| n <= i32::MAX as usize)
            .ok_or(PoolError::GridTooLarge {
                n_centrality,
                n_z_vertex,
                n_event_plane,
            })?;
        debug_assert!(total > 0);

        Ok(Self {
            n_centrality,
            n_z_vertex,
            n_event_plane,
        })
    }

    /// A single-bin grid: every event mixes with every other.
    pub fn single() -> Self {
        Self {
            n_centrality: 1,
            n_z_vertex: 1,
            n_event_plane: 1,
        }
    }

    pub fn n_centrality(&self) -> usize {
        self.n_centrality
    }

    pub fn n_z_vertex(&self) -> usize {
        self.n_z_vertex
    }

    pub fn n_event_plane(&self) -> usize {
        self.n_event_plane
    }

    /// Total number of bins, `Nc*Nz*Nrp`.
    pub fn len(&self) -> usize {
        self.n_centrality * self.n_z_vertex * self.n_event_plane
    }

    /// A valid grid always holds at least one bin.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Collapse a classification into a flat index.
    ///
    /// Returns [`BinIndex::INVALID`] when any coordinate is negative or not
    /// below its dimension.
    pub fn get_bin_index(&self, centrality: i32, z_vertex: i32, event_plane: i32) -> BinIndex {
        let (Some(c), Some(z), Some(rp)) = (
            Self::checked(centrality, self.n_centrality),
            Self::checked(z_vertex, self.n_z_vertex),
            Self::checked(event_plane, self.n_event_plane),
        ) else {
            return BinIndex::INVALID;
        };

        let index = c * self.n_z_vertex * self.n_event_plane + z * self.n_event_plane + rp;
        BinIndex(index as i32)
    }

    /// Same as [`get_bin_index`](Self::get_bin_index) for a [`BinKey`].
    pub fn index_of(&self, key: BinKey) -> BinIndex {
        self.get_bin_index(key.centrality, key.z_vertex, key.event_plane)
    }

    /// Inverse of [`index_of`](Self::index_of) for valid indices.
    pub fn key_of(&self, index: BinIndex) -> Option<BinKey> {
        let i = index.as_usize().filter(|&i| i < self.len())?;
        let per_centrality = self.n_z_vertex * self.n_event_plane;
        let c = i / per_centrality;
        let z = (i % per_centrality) / self.n_event_plane;
        let rp = i % self.n_event_plane;
        Some(BinKey::new(c as i32, z as i32, rp as i32))
    }

    /// Iterate over every valid index in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = BinIndex> {
        (0..self.len()).map(|i| BinIndex(i as i32))
    }

    fn checked(value: i32, count: usize) -> Option<usize> {
        usize::try_from(value).ok().filter(|&v| v < count)
    }
}

impl Default for BinGrid {
    fn default() -> Self {
        Self::single()
    }
}

/// Ordered bin edges for turning a raw measurement into a bin number.
///
/// Bin `i` covers `[edges[i], edges[i + 1])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> Result<Self, PoolError> {
        if edges.len() < 2 || edges.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(PoolError::InvalidEdges(edges.len()));
        }
        Ok(Self { edges })
    }

    /// `n` equal-width bins between `min` and `max`.
    pub fn uniform(min: f64, max: f64, n: usize) -> Result<Self, PoolError> {
        if n == 0 || !(min < max) {
            return Err(PoolError::InvalidEdges(n + 1));
        }
        let width = (max - min) / n as f64;
        let mut edges: Vec<f64> = (0..n).map(|i| min + width * i as f64).collect();
        edges.push(max);
        Self::new(edges)
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin number containing `value`, or `-1` outside the covered range.
    pub fn locate(&self, value: f64) -> i32 {
        if value.is_nan() {
            return -1;
        }
        // Index of the first edge strictly greater than value.
        let upper = self.edges.partition_point(|&e| e <= value);
        if upper == 0 || upper == self.edges.len() {
            -1
        } else {
            (upper - 1) as i32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_index_layout() {
        let grid = BinGrid::new(3, 4, 2).unwrap();
        assert_eq!(grid.len(), 24);
        assert_eq!(grid.get_bin_index(0, 0, 0), BinIndex(0));
        assert_eq!(grid.get_bin_index(0, 0, 1), BinIndex(1));
        assert_eq!(grid.get_bin_index(0, 1, 0), BinIndex(2));
        assert_eq!(grid.get_bin_index(1, 0, 0), BinIndex(8));
        assert_eq!(grid.get_bin_index(2, 3, 1), BinIndex(23));
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let grid = BinGrid::new(2, 1, 1).unwrap();
        assert_eq!(grid.get_bin_index(3, 0, 0), BinIndex::INVALID);
        assert_eq!(grid.get_bin_index(2, 0, 0), BinIndex::INVALID);
        assert_eq!(grid.get_bin_index(-1, 0, 0), BinIndex::INVALID);
        assert_eq!(grid.get_bin_index(0, 1, 0), BinIndex::INVALID);
        assert_eq!(grid.get_bin_index(0, 0, -5), BinIndex::INVALID);
        assert_eq!(BinIndex::INVALID.raw(), -1);
        assert!(BinIndex::INVALID.as_usize().is_none());
    }

    #[test]
    fn test_index_is_deterministic_and_in_range() {
        let grid = BinGrid::new(5, 3, 4).unwrap();
        for c in -1..6 {
            for z in -1..4 {
                for rp in -1..5 {
                    let first = grid.get_bin_index(c, z, rp);
                    assert_eq!(first, grid.get_bin_index(c, z, rp));
                    if let Some(i) = first.as_usize() {
                        assert!(i < grid.len());
                    }
                }
            }
        }
    }

    #[test]
    fn test_key_round_trip() {
        let grid = BinGrid::new(3, 2, 5).unwrap();
        for index in grid.indices() {
            let key = grid.key_of(index).unwrap();
            assert_eq!(grid.index_of(key), index);
        }
        assert!(grid.key_of(BinIndex::INVALID).is_none());
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(matches!(BinGrid::new(0, 1, 1), Err(PoolError::EmptyGrid { .. })));
        assert!(matches!(BinGrid::new(1, 1, 0), Err(PoolError::EmptyGrid { .. })));
    }

    #[test]
    fn test_edges_locate() {
        let edges = BinEdges::new(vec![-10.0, -5.0, 0.0, 5.0, 10.0]).unwrap();
        assert_eq!(edges.n_bins(), 4);
        assert_eq!(edges.locate(-10.0), 0);
        assert_eq!(edges.locate(-0.1), 1);
        assert_eq!(edges.locate(0.0), 2);
        assert_eq!(edges.locate(9.99), 3);
        assert_eq!(edges.locate(10.0), -1);
        assert_eq!(edges.locate(-11.0), -1);
        assert_eq!(edges.locate(f64::NAN), -1);
    }

    #[test]
    fn test_uniform_edges() {
        let edges = BinEdges::uniform(0.0, 100.0, 10).unwrap();
        assert_eq!(edges.n_bins(), 10);
        assert_eq!(edges.locate(35.0), 3);
        assert!(BinEdges::uniform(1.0, 1.0, 4).is_err());
        assert!(BinEdges::new(vec![0.0, 2.0, 1.0]).is_err());
    }
}
