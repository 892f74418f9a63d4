// src/correlation/sink.rs
// Consumers of correlation output. Histogram storage lives outside the
// crate; a sink only receives values.

use crate::correlation::{AssocBinEntry, ImbalanceRegion, MixedTrigger};
use crate::numerics::hump_backed_plateau;

/// Receiver of everything the correlator derives from one trigger.
pub trait CorrelationSink {
    /// Trigger pT against the wrapped azimuthal difference.
    fn emit_angular(&mut self, pt_trig: f64, delta_phi: f64);

    /// Azimuthal against pseudorapidity difference.
    fn emit_angular_2d(&mut self, delta_phi: f64, delta_eta: f64);

    /// Momentum imbalance of one pair in the given region.
    fn emit_imbalance(&mut self, pt_trig: f64, x_e: f64, z_t: f64, region: ImbalanceRegion);

    /// Trigger accepted against one background event.
    fn emit_mixed_trigger(&mut self, _trigger: &MixedTrigger) {}

    /// Pair routed to an associated-pT bin.
    fn emit_assoc_bin(&mut self, _entry: &AssocBinEntry) {}
}

impl<S: CorrelationSink + ?Sized> CorrelationSink for &mut S {
    fn emit_angular(&mut self, pt_trig: f64, delta_phi: f64) {
        (**self).emit_angular(pt_trig, delta_phi)
    }

    fn emit_angular_2d(&mut self, delta_phi: f64, delta_eta: f64) {
        (**self).emit_angular_2d(delta_phi, delta_eta)
    }

    fn emit_imbalance(&mut self, pt_trig: f64, x_e: f64, z_t: f64, region: ImbalanceRegion) {
        (**self).emit_imbalance(pt_trig, x_e, z_t, region)
    }

    fn emit_mixed_trigger(&mut self, trigger: &MixedTrigger) {
        (**self).emit_mixed_trigger(trigger)
    }

    fn emit_assoc_bin(&mut self, entry: &AssocBinEntry) {
        (**self).emit_assoc_bin(entry)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CorrelationSink for NullSink {
    fn emit_angular(&mut self, _pt_trig: f64, _delta_phi: f64) {}

    fn emit_angular_2d(&mut self, _delta_phi: f64, _delta_eta: f64) {}

    fn emit_imbalance(&mut self, _pt_trig: f64, _x_e: f64, _z_t: f64, _region: ImbalanceRegion) {}
}

/// One imbalance emission, with the hump-backed plateau variable attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImbalanceRecord {
    pub pt_trig: f64,
    pub x_e: f64,
    pub z_t: f64,
    /// `ln(1/x_E)`, present when `x_E > 0`
    pub hbp_x_e: Option<f64>,
    pub region: ImbalanceRegion,
}

/// Keeps every emission in memory, in call order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub angular: Vec<(f64, f64)>,
    pub angular_2d: Vec<(f64, f64)>,
    pub imbalance: Vec<ImbalanceRecord>,
    pub mixed_triggers: Vec<MixedTrigger>,
    pub assoc_bins: Vec<AssocBinEntry>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imbalance records of one region.
    pub fn imbalance_in(&self, region: ImbalanceRegion) -> impl Iterator<Item = &ImbalanceRecord> {
        self.imbalance.iter().filter(move |r| r.region == region)
    }

    pub fn is_empty(&self) -> bool {
        self.angular.is_empty()
            && self.angular_2d.is_empty()
            && self.imbalance.is_empty()
            && self.mixed_triggers.is_empty()
            && self.assoc_bins.is_empty()
    }

    pub fn clear(&mut self) {
        self.angular.clear();
        self.angular_2d.clear();
        self.imbalance.clear();
        self.mixed_triggers.clear();
        self.assoc_bins.clear();
    }
}

impl CorrelationSink for RecordingSink {
    fn emit_angular(&mut self, pt_trig: f64, delta_phi: f64) {
        self.angular.push((pt_trig, delta_phi));
    }

    fn emit_angular_2d(&mut self, delta_phi: f64, delta_eta: f64) {
        self.angular_2d.push((delta_phi, delta_eta));
    }

    fn emit_imbalance(&mut self, pt_trig: f64, x_e: f64, z_t: f64, region: ImbalanceRegion) {
        self.imbalance.push(ImbalanceRecord {
            pt_trig,
            x_e,
            z_t,
            hbp_x_e: hump_backed_plateau(x_e),
            region,
        });
    }

    fn emit_mixed_trigger(&mut self, trigger: &MixedTrigger) {
        self.mixed_triggers.push(*trigger);
    }

    fn emit_assoc_bin(&mut self, entry: &AssocBinEntry) {
        self.assoc_bins.push(*entry);
    }
}
