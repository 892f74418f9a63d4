use evpool::pool::BinEdges;

use crate::config::{ConfigError, MixingConfig};

/// Routing of associated particles into pT bins, optionally split by
/// z-vertex bin.
///
/// With vertex splitting the flat index is `assoc_bin * n_z + z_bin`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssocPtBinning {
    edges: BinEdges,
    n_z_vertex_bins: usize,
    split_by_vertex: bool,
}

impl AssocPtBinning {
    pub fn new(limits: Vec<f64>, n_z_vertex_bins: usize, split_by_vertex: bool) -> Result<Self, ConfigError> {
        let edges = BinEdges::new(limits).map_err(|_| ConfigError::InvalidAssocLimits)?;
        if n_z_vertex_bins == 0 {
            return Err(ConfigError::NotPositive { name: "n_z_vertex_bins" });
        }
        Ok(Self {
            edges,
            n_z_vertex_bins,
            split_by_vertex,
        })
    }

    pub fn from_config(config: &MixingConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.assoc_pt_limits.clone(),
            config.n_z_vertex_bins,
            config.correlate_vz_bin,
        )
    }

    pub fn n_assoc_bins(&self) -> usize {
        self.edges.n_bins()
    }

    /// Number of distinct flat indices.
    pub fn n_bins(&self) -> usize {
        if self.split_by_vertex {
            self.n_assoc_bins() * self.n_z_vertex_bins
        } else {
            self.n_assoc_bins()
        }
    }

    pub fn limits(&self) -> &[f64] {
        self.edges.edges()
    }

    /// pT bin alone, `None` outside the limits or exactly on one of them.
    pub fn assoc_bin(&self, pt: f64) -> Option<usize> {
        let bin = usize::try_from(self.edges.locate(pt)).ok()?;
        // Bins are open on both sides
        (pt > self.edges.edges()[bin]).then_some(bin)
    }

    /// Flat index for a particle of transverse momentum `pt` in an event of
    /// z-vertex bin `z_vertex_bin`.
    pub fn bin(&self, pt: f64, z_vertex_bin: i32) -> Option<usize> {
        let assoc = self.assoc_bin(pt)?;
        if !self.split_by_vertex {
            return Some(assoc);
        }
        let z = usize::try_from(z_vertex_bin).ok().filter(|&z| z < self.n_z_vertex_bins)?;
        Some(assoc * self.n_z_vertex_bins + z)
    }
}
