// File: crates/evpool/src/pool/snapshot.rs
//! Minimal particle copies kept in the event pools.
//!
//! A pool never references reconstruction objects of the event it came from.
//! Selected particles are deep-copied into [`ParticleSnapshot`]s and frozen
//! into a [`SnapshotArray`] per event.

use std::f64::consts::TAU;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Detector origin of a cached particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    /// Charged track from the central tracking system.
    Track,
    /// Neutral calorimeter cluster.
    Cluster,
}

/// Kinematics of one cached particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
    /// Charge sign for tracks, `None` for clusters.
    pub charge: Option<i8>,
    pub tag: SourceTag,
}

impl ParticleSnapshot {
    /// Snapshot of a charged track.
    pub fn track(px: f64, py: f64, pz: f64, energy: f64, charge: i8) -> Self {
        Self {
            px,
            py,
            pz,
            energy,
            charge: Some(charge.signum()),
            tag: SourceTag::Track,
        }
    }

    /// Snapshot of a neutral cluster, momentum assumed to point from the vertex.
    pub fn cluster(px: f64, py: f64, pz: f64, energy: f64) -> Self {
        Self {
            px,
            py,
            pz,
            energy,
            charge: None,
            tag: SourceTag::Cluster,
        }
    }

    /// Massless snapshot built from `(pt, eta, phi)`.
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64, tag: SourceTag) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let energy = pt * eta.cosh();
        match tag {
            SourceTag::Track => Self::track(px, py, pz, energy, 1),
            SourceTag::Cluster => Self::cluster(px, py, pz, energy),
        }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Azimuth in `[0, 2π)`.
    pub fn phi(&self) -> f64 {
        let phi = self.py.atan2(self.px);
        if phi < 0.0 {
            phi + TAU
        } else {
            phi
        }
    }

    /// Pseudorapidity; infinite along the beam axis.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
        }
        (self.pz / pt).asinh()
    }

    pub fn is_track(&self) -> bool {
        self.tag == SourceTag::Track
    }
}

/// Transverse-momentum window a particle must fall in to be cached.
///
/// Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceWindow {
    pub pt_min: f64,
    pub pt_max: f64,
}

impl AcceptanceWindow {
    pub fn new(pt_min: f64, pt_max: f64) -> Self {
        Self { pt_min, pt_max }
    }

    pub fn contains(&self, pt: f64) -> bool {
        pt >= self.pt_min && pt <= self.pt_max
    }
}

impl Default for AcceptanceWindow {
    fn default() -> Self {
        Self::new(0.0, 1000.0)
    }
}

/// Frozen particle content of one cached event.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotArray {
    event_id: u64,
    particles: Box<[ParticleSnapshot]>,
}

impl SnapshotArray {
    pub fn new(event_id: u64, particles: Vec<ParticleSnapshot>) -> Self {
        Self {
            event_id,
            particles: particles.into_boxed_slice(),
        }
    }

    /// Keep only the candidates whose pt lies inside `window`.
    pub fn select<I>(event_id: u64, candidates: I, window: AcceptanceWindow) -> Self
    where
        I: IntoIterator<Item = ParticleSnapshot>,
    {
        let particles = candidates
            .into_iter()
            .filter(|p| window.contains(p.pt()))
            .collect::<Vec<_>>();
        Self::new(event_id, particles)
    }

    /// Raw id of the event the snapshots were taken from.
    pub fn event_id(&self) -> u64 {
        self.event_id
    }

    pub fn particles(&self) -> &[ParticleSnapshot] {
        &self.particles
    }

    /// Number of cached particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Highest transverse momentum in the array.
    pub fn max_pt(&self) -> Option<f64> {
        self.particles.iter().map(ParticleSnapshot::pt).reduce(f64::max)
    }
}

impl Deref for SnapshotArray {
    type Target = [ParticleSnapshot];

    fn deref(&self) -> &Self::Target {
        &self.particles
    }
}
