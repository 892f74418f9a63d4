//! Event-by-event driver tying pools and correlator together.
//!
//! For every event [`MixingAnalysis::process_event`] classifies it, mixes
//! each trigger with the pool of its bin, and only then caches the event
//! itself when it is minimum-bias. An event therefore never meets its own
//! snapshots.

pub mod source;
pub mod stats;

use evpool::pool::{BinIndex, InsertOutcome, PoolError, PoolManager, SnapshotArray, SourceTag};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, trace};

use crate::config::{ConfigError, MixingConfig};
use crate::correlation::{CorrelationSink, MixCorrelator, MixSummary};

pub use source::{EventClassification, EventSource, OwnedEvent};
pub use stats::MixingStats;

/// Errors that stop an analysis from starting
#[derive(Debug, thiserror::Error)]
pub enum MixError {
    #[error("Mixing requested but no pool manager was provided")]
    PoolsNotInitialized,

    #[error(
        "Pool grid {found:?} does not match the configured grid {expected:?} (centrality, z-vertex, event plane)"
    )]
    PoolGridMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("Cluster mixing requested but the pool manager has no cluster pools")]
    ClusterPoolMissing,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOutcome {
    pub bin: BinIndex,
    pub triggers: usize,
    /// Merged over all triggers of the event
    pub mix: MixSummary,
    /// `None` when the event was not offered to the track pools
    pub tracks: Option<InsertOutcome>,
    /// `None` when the event was not offered to the cluster pools
    pub clusters: Option<InsertOutcome>,
}

/// Mixed-event analysis of one run.
pub struct MixingAnalysis<R: Rng = StdRng> {
    config: MixingConfig,
    pools: Option<PoolManager>,
    correlator: MixCorrelator<R>,
    stats: MixingStats,
}

impl MixingAnalysis<StdRng> {
    /// Validate `config` and create the pools it describes.
    pub fn from_config(config: MixingConfig) -> Result<Self, MixError> {
        config.validate()?;
        let pools = if config.do_own_mix {
            Some(config.pool_config().create_manager()?)
        } else {
            None
        };
        let correlator = MixCorrelator::from_config(&config)?;
        Self::assemble(config, pools, correlator)
    }

    /// Use an externally created pool manager.
    pub fn new(config: MixingConfig, pools: Option<PoolManager>) -> Result<Self, MixError> {
        let correlator = MixCorrelator::from_config(&config)?;
        Self::assemble(config, pools, correlator)
    }
}

impl<R: Rng> MixingAnalysis<R> {
    pub fn with_rng(config: MixingConfig, pools: Option<PoolManager>, rng: R) -> Result<Self, MixError> {
        let correlator = MixCorrelator::with_rng(&config, rng)?;
        Self::assemble(config, pools, correlator)
    }

    fn assemble(
        config: MixingConfig,
        pools: Option<PoolManager>,
        correlator: MixCorrelator<R>,
    ) -> Result<Self, MixError> {
        config.validate()?;

        if config.do_own_mix {
            let manager = pools.as_ref().ok_or(MixError::PoolsNotInitialized)?;

            let grid = manager.grid();
            let found = (grid.n_centrality(), grid.n_z_vertex(), grid.n_event_plane());
            let expected = (
                config.n_centrality_bins,
                config.n_z_vertex_bins,
                config.n_event_plane_bins,
            );
            if found != expected {
                return Err(MixError::PoolGridMismatch { expected, found });
            }

            if config.mix_clusters && !manager.has_kind(SourceTag::Cluster) {
                return Err(MixError::ClusterPoolMissing);
            }

            if manager.capacity() != config.pool_max_size {
                debug!(
                    configured = config.pool_max_size,
                    actual = manager.capacity(),
                    "pool capacity differs from configuration, keeping the manager's"
                );
            }
        }

        if !config.do_own_mix && pools.is_some() {
            debug!("own mixing disabled, supplied pool manager is left untouched");
        }

        let n_bins = config.n_centrality_bins * config.n_z_vertex_bins * config.n_event_plane_bins;
        info!(
            do_own_mix = config.do_own_mix,
            n_bins,
            pool_max_size = config.pool_max_size,
            leading_mode = %config.leading_mode,
            "mixing analysis initialized"
        );

        Ok(Self {
            config,
            pools,
            correlator,
            stats: MixingStats::new(n_bins),
        })
    }

    pub fn config(&self) -> &MixingConfig {
        &self.config
    }

    pub fn pools(&self) -> Option<&PoolManager> {
        self.pools.as_ref()
    }

    pub fn stats(&self) -> &MixingStats {
        &self.stats
    }

    /// Mix the triggers of `event` with the matching pool, then cache the
    /// event if it is minimum-bias.
    pub fn process_event<E, S>(&mut self, event: &E, sink: &mut S) -> EventOutcome
    where
        E: EventSource + ?Sized,
        S: CorrelationSink,
    {
        let classification = event.classification();
        let event_id = event.event_id();

        let pools = match self.pools.as_mut() {
            Some(pools) if self.config.do_own_mix => pools,
            _ => {
                self.stats.events_seen += 1;
                return EventOutcome {
                    bin: BinIndex::INVALID,
                    triggers: 0,
                    mix: MixSummary::default(),
                    tracks: None,
                    clusters: None,
                };
            }
        };

        let bin = classification.bin_in(pools.grid());
        self.stats.record_event(bin);

        let mut outcome = EventOutcome {
            bin,
            triggers: 0,
            mix: MixSummary::default(),
            tracks: None,
            clusters: None,
        };

        if !bin.is_valid() {
            debug!(event_id, ?classification, "event outside classification grid, skipped");
            return outcome;
        }

        for trigger in event.trigger_particles() {
            let summary =
                self.correlator
                    .correlate(&trigger, pools, bin, classification.z_vertex_bin, sink);
            self.stats.record_mixing(bin, summary.events_accepted);
            outcome.mix.merge(&summary);
            outcome.triggers += 1;
        }

        if event.is_minimum_bias() {
            let window = self.config.acceptance();

            let tracks = SnapshotArray::select(event_id, event.candidate_particles(SourceTag::Track), window);
            let n_tracks = tracks.len();
            let inserted = pools.insert(bin, event_id, tracks, SourceTag::Track);
            match inserted {
                InsertOutcome::Inserted { .. } => self.stats.record_cached(bin, n_tracks),
                InsertOutcome::Duplicate => self.stats.duplicate_insertions += 1,
                _ => {}
            }
            outcome.tracks = Some(inserted);

            if self.config.mix_clusters {
                let clusters =
                    SnapshotArray::select(event_id, event.candidate_particles(SourceTag::Cluster), window);
                outcome.clusters = Some(pools.insert(bin, event_id, clusters, SourceTag::Cluster));
            }
        }

        trace!(event_id, %bin, triggers = outcome.triggers, pairs = outcome.mix.pairs_emitted, "event processed");
        outcome
    }

    /// Process a sequence of events in order and return the merged mixing
    /// summary.
    pub fn run<'a, I, E, S>(&mut self, events: I, sink: &mut S) -> MixSummary
    where
        I: IntoIterator<Item = &'a E>,
        E: EventSource + 'a,
        S: CorrelationSink,
    {
        let mut total = MixSummary::default();
        for event in events {
            total.merge(&self.process_event(event, sink).mix);
        }
        total
    }

    /// End the run, logging the final counters and handing back the pools.
    pub fn finish(self) -> (MixingStats, Option<PoolManager>) {
        info!("{}", self.stats.format_summary());
        if let Some(pools) = &self.pools {
            if let Some(stats) = pools.stats(SourceTag::Track) {
                info!("Track pools: {}", stats.utilization().format_summary());
            }
        }
        (self.stats, self.pools)
    }
}
