//! Per-bin bookkeeping of the mixing analysis.

use evpool::pool::BinIndex;

/// Counters filled while events are processed.
///
/// Per-bin vectors are indexed by the flat classification bin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixingStats {
    /// Events handed to the analysis
    pub events_seen: u64,
    /// Events whose classification fell outside the grid
    pub invalid_classification: u64,
    /// Triggers correlated against a pool
    pub triggers_mixed: u64,
    /// Minimum-bias events not cached because they were already stored
    pub duplicate_insertions: u64,
    /// Events with a valid classification, per bin
    pub events_per_bin: Vec<u64>,
    /// Background events accepted for mixing, per bin
    pub mixed_events_per_bin: Vec<u64>,
    /// Minimum-bias events cached, per bin
    pub minimum_bias_per_bin: Vec<u64>,
    /// Track snapshots cached from minimum-bias events, per bin
    pub minimum_bias_tracks_per_bin: Vec<u64>,
}

impl MixingStats {
    pub fn new(n_bins: usize) -> Self {
        Self {
            events_per_bin: vec![0; n_bins],
            mixed_events_per_bin: vec![0; n_bins],
            minimum_bias_per_bin: vec![0; n_bins],
            minimum_bias_tracks_per_bin: vec![0; n_bins],
            ..Self::default()
        }
    }

    pub fn n_bins(&self) -> usize {
        self.events_per_bin.len()
    }

    pub(crate) fn record_event(&mut self, bin: BinIndex) {
        self.events_seen += 1;
        match self.slot(bin) {
            Some(i) => self.events_per_bin[i] += 1,
            None => self.invalid_classification += 1,
        }
    }

    pub(crate) fn record_mixing(&mut self, bin: BinIndex, accepted_events: usize) {
        self.triggers_mixed += 1;
        if let Some(i) = self.slot(bin) {
            self.mixed_events_per_bin[i] += accepted_events as u64;
        }
    }

    pub(crate) fn record_cached(&mut self, bin: BinIndex, n_tracks: usize) {
        if let Some(i) = self.slot(bin) {
            self.minimum_bias_per_bin[i] += 1;
            self.minimum_bias_tracks_per_bin[i] += n_tracks as u64;
        }
    }

    pub fn total_mixed_events(&self) -> u64 {
        self.mixed_events_per_bin.iter().sum()
    }

    pub fn total_cached_events(&self) -> u64 {
        self.minimum_bias_per_bin.iter().sum()
    }

    /// Mean track multiplicity of cached events in `bin`.
    pub fn mean_cached_tracks(&self, bin: BinIndex) -> Option<f64> {
        let i = self.slot(bin)?;
        let events = self.minimum_bias_per_bin[i];
        (events > 0).then(|| self.minimum_bias_tracks_per_bin[i] as f64 / events as f64)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Events: {} ({} unclassified) | Triggers mixed: {} | Mixed events: {} | Cached: {} ({} duplicates)",
            self.events_seen,
            self.invalid_classification,
            self.triggers_mixed,
            self.total_mixed_events(),
            self.total_cached_events(),
            self.duplicate_insertions,
        )
    }

    fn slot(&self, bin: BinIndex) -> Option<usize> {
        bin.as_usize().filter(|&i| i < self.n_bins())
    }
}
