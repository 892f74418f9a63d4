// src/correlation/correlator.rs
// Replays cached background events against a trigger of the current event.

use std::f64::consts::FRAC_PI_2;

use evpool::pool::{BinIndex, EventPool, ParticleSnapshot, PoolManager, SourceTag};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{trace, warn};

use crate::config::{ConfigError, LeadingMode, MixingConfig, PhiWindow};
use crate::correlation::{
    AssocBinEntry, AssocPtBinning, CorrelationSink, ImbalanceRegion, MixedTrigger, TriggerParticle,
};
use crate::numerics::{azimuthal_separation, normalize_phi, wrap_delta_phi, x_e, z_t};

/// `|Δη|` above which a pair counts as having a large pseudorapidity gap.
pub const LARGE_ETA_GAP: f64 = 0.8;

/// `|Δη|` below which a pair counts as having no pseudorapidity gap.
pub const NO_ETA_GAP: f64 = 0.01;

/// What one correlation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixSummary {
    /// Background events looked at
    pub events_scanned: usize,
    /// Background events that passed the leading veto
    pub events_accepted: usize,
    /// Background events rejected by the leading veto
    pub events_vetoed: usize,
    /// Trigger-associated pairs emitted
    pub pairs_emitted: usize,
}

impl MixSummary {
    pub fn merge(&mut self, other: &MixSummary) {
        self.events_scanned += other.events_scanned;
        self.events_accepted += other.events_accepted;
        self.events_vetoed += other.events_vetoed;
        self.pairs_emitted += other.pairs_emitted;
    }
}

/// Mixed-event correlation engine.
///
/// Owns its random generator, used for the underlying-event angle. Pools
/// are only ever borrowed immutably.
#[derive(Debug, Clone)]
pub struct MixCorrelator<R: Rng = StdRng> {
    leading_mode: LeadingMode,
    check_leading_with_clusters: bool,
    signal_window: PhiWindow,
    ue_window: PhiWindow,
    assoc_binning: AssocPtBinning,
    fill_eta_gaps: bool,
    rng: R,
}

impl MixCorrelator<StdRng> {
    /// Correlator seeded from `config.seed`, or from the OS when unset.
    pub fn from_config(config: &MixingConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> MixCorrelator<R> {
    pub fn with_rng(config: &MixingConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            leading_mode: config.leading_mode,
            check_leading_with_clusters: config.check_leading_with_clusters,
            signal_window: config.signal_window,
            ue_window: config.ue_window,
            assoc_binning: AssocPtBinning::from_config(config)?,
            fill_eta_gaps: config.fill_eta_gaps,
            rng,
        })
    }

    pub fn leading_mode(&self) -> LeadingMode {
        self.leading_mode
    }

    pub fn assoc_binning(&self) -> &AssocPtBinning {
        &self.assoc_binning
    }

    /// Correlate `trigger` with the pools of classification bin `bin`.
    ///
    /// Returns an empty summary when the bin is invalid or has no track pool.
    pub fn correlate<S: CorrelationSink>(
        &mut self,
        trigger: &TriggerParticle,
        pools: &PoolManager,
        bin: BinIndex,
        z_vertex_bin: i32,
        sink: &mut S,
    ) -> MixSummary {
        let Some(tracks) = pools.lookup(bin, SourceTag::Track) else {
            trace!("No track pool for {}, nothing to mix", bin);
            return MixSummary::default();
        };

        let clusters = if self.check_leading_with_clusters {
            let clusters = pools.lookup(bin, SourceTag::Cluster);
            if clusters.is_none() {
                warn!("Cluster pool not available for {}, leading check uses tracks only", bin);
            }
            clusters
        } else {
            None
        };

        self.mix_pool(trigger, tracks, clusters, bin, z_vertex_bin, sink)
    }

    /// Correlate `trigger` with every event of `tracks`, most recent first.
    ///
    /// `clusters` is the parallel cluster pool of the same bin; it only takes
    /// part in the leading veto.
    pub fn mix_pool<S: CorrelationSink>(
        &mut self,
        trigger: &TriggerParticle,
        tracks: &EventPool,
        clusters: Option<&EventPool>,
        bin: BinIndex,
        z_vertex_bin: i32,
        sink: &mut S,
    ) -> MixSummary {
        let mut summary = MixSummary::default();

        if !(trigger.pt > 0.0) {
            warn!("Trigger with pT {} cannot be mixed", trigger.pt);
            return summary;
        }

        let clusters = match clusters {
            Some(pool) if pool.len() != tracks.len() => {
                warn!(
                    "Track and cluster pools of {} differ in size ({} vs {}), leading check uses tracks only",
                    bin,
                    tracks.len(),
                    pool.len()
                );
                None
            }
            other => other,
        };

        let phi_trig = normalize_phi(trigger.phi);
        trace!(
            "Mixing trigger pt={:.3} phi={:.3} eta={:.3} with {} events of {}",
            trigger.pt,
            phi_trig,
            trigger.eta,
            tracks.len(),
            bin
        );

        for (i, event) in tracks.iter().enumerate() {
            summary.events_scanned += 1;

            // Clusters of the same raw event; a pool slot alone may belong to another one
            let paired = clusters
                .and_then(|pool| {
                    pool.get(i)
                        .filter(|array| array.event_id() == event.event_id())
                        .or_else(|| pool.iter().find(|array| array.event_id() == event.event_id()))
                })
                .map(|array| array.particles());
            if !self.passes_leading_veto(trigger.pt, phi_trig, event.particles(), paired) {
                summary.events_vetoed += 1;
                continue;
            }
            summary.events_accepted += 1;

            sink.emit_mixed_trigger(&MixedTrigger {
                pt: trigger.pt,
                phi: phi_trig,
                eta: trigger.eta,
                bin,
                z_vertex_bin,
            });

            for snapshot in event.iter() {
                self.emit_pair(trigger, phi_trig, snapshot, z_vertex_bin, sink);
                summary.pairs_emitted += 1;
            }
        }

        summary
    }

    /// Whether a background event may be mixed with a trigger of the given
    /// pT and normalised azimuth.
    pub fn passes_leading_veto(
        &self,
        pt_trig: f64,
        phi_trig: f64,
        tracks: &[ParticleSnapshot],
        clusters: Option<&[ParticleSnapshot]>,
    ) -> bool {
        let harder = |s: &ParticleSnapshot| match self.leading_mode {
            LeadingMode::None => false,
            LeadingMode::Absolute => s.pt() > pt_trig,
            LeadingMode::NearSide => s.pt() > pt_trig && azimuthal_separation(s.phi(), phi_trig) < FRAC_PI_2,
        };

        if self.leading_mode == LeadingMode::None {
            return true;
        }
        !tracks.iter().any(harder) && !clusters.is_some_and(|c| c.iter().any(harder))
    }

    fn emit_pair<S: CorrelationSink>(
        &mut self,
        trigger: &TriggerParticle,
        phi_trig: f64,
        snapshot: &ParticleSnapshot,
        z_vertex_bin: i32,
        sink: &mut S,
    ) {
        let pt_trig = trigger.pt;
        let pt_assoc = snapshot.pt();
        let delta_phi = wrap_delta_phi(phi_trig - snapshot.phi());
        let delta_eta = trigger.eta - snapshot.eta();

        sink.emit_angular(pt_trig, delta_phi);
        sink.emit_angular_2d(delta_phi, delta_eta);

        let ratio = z_t(pt_assoc, pt_trig);
        if self.signal_window.contains(delta_phi) {
            sink.emit_imbalance(pt_trig, x_e(pt_assoc, pt_trig, delta_phi), ratio, ImbalanceRegion::Signal);
        } else if self.ue_window.contains(delta_phi) {
            let random_phi = self.rng.random_range(self.signal_window.min..=self.signal_window.max);
            let ue_x_e = x_e(pt_assoc, pt_trig, random_phi).abs();
            sink.emit_imbalance(pt_trig, ue_x_e, ratio, ImbalanceRegion::UnderlyingEvent);
        }

        if let Some(bin) = self.assoc_binning.bin(pt_assoc, z_vertex_bin) {
            let gap = delta_eta.abs();
            sink.emit_assoc_bin(&AssocBinEntry {
                bin,
                pt_trig,
                delta_phi,
                delta_eta,
                large_eta_gap: self.fill_eta_gaps && gap > LARGE_ETA_GAP,
                no_eta_gap: self.fill_eta_gaps && gap < NO_ETA_GAP,
            });
        }
    }
}
