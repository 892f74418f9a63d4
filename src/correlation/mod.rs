//! Mixed-event correlation of trigger particles with cached background
//! events.
//!
//! [`MixCorrelator`] replays the pool of the trigger's classification bin and
//! hands every derived quantity to a [`CorrelationSink`]. Nothing here
//! mutates a pool.

pub mod assoc_bins;
pub mod correlator;
pub mod sink;

use evpool::pool::{BinIndex, SourceTag};
use serde::{Deserialize, Serialize};

pub use assoc_bins::AssocPtBinning;
pub use correlator::{MixCorrelator, MixSummary};
pub use sink::{CorrelationSink, ImbalanceRecord, NullSink, RecordingSink};

/// A trigger particle of the current event.
///
/// Supplied by the event producer for each analysed event and consumed by
/// the correlator; it is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerParticle {
    pub pt: f64,
    pub eta: f64,
    /// Azimuth in radians, any range
    pub phi: f64,
    pub origin: SourceTag,
    /// Producer-defined identification bits, carried through untouched
    pub tag_bits: u32,
}

impl TriggerParticle {
    pub fn new(pt: f64, eta: f64, phi: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            origin: SourceTag::Track,
            tag_bits: 0,
        }
    }

    pub fn with_origin(mut self, origin: SourceTag) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_tag_bits(mut self, tag_bits: u32) -> Self {
        self.tag_bits = tag_bits;
        self
    }
}

/// Azimuthal region an imbalance entry was filled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImbalanceRegion {
    /// Away-side signal window.
    Signal,
    /// Underlying-event window, evaluated at a random signal-window angle.
    UnderlyingEvent,
}

/// Trigger accepted for mixing against one background event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixedTrigger {
    pub pt: f64,
    /// Azimuth normalised to `[0, 2π)`
    pub phi: f64,
    pub eta: f64,
    pub bin: BinIndex,
    pub z_vertex_bin: i32,
}

/// One pair routed to its associated-pT (and optionally z-vertex) bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssocBinEntry {
    pub bin: usize,
    pub pt_trig: f64,
    pub delta_phi: f64,
    pub delta_eta: f64,
    /// `|Δη| > 0.8`, only set when eta-gap filling is enabled
    pub large_eta_gap: bool,
    /// `|Δη| < 0.01`, only set when eta-gap filling is enabled
    pub no_eta_gap: bool,
}
