//! Prelude for mixcorr
//!
//! Re-exports the analysis driver, correlation types and the pool types a
//! caller needs to feed events in.

pub use crate::analysis::{
    EventClassification, EventOutcome, EventSource, MixError, MixingAnalysis, MixingStats, OwnedEvent,
};
pub use crate::config::{ConfigError, LeadingMode, MixingConfig, PhiWindow};
pub use crate::correlation::{
    AssocBinEntry, AssocPtBinning, CorrelationSink, ImbalanceRecord, ImbalanceRegion, MixCorrelator,
    MixSummary, MixedTrigger, NullSink, RecordingSink, TriggerParticle,
};

// Pool types from evpool
pub use evpool::pool::{
    BinGrid, BinIndex, EventPool, InsertOutcome, ParticleSnapshot, PoolManager, SnapshotArray, SourceTag,
};
pub use evpool::PoolConfig;
