pub mod analysis;
pub mod config;
pub mod correlation;
pub mod numerics;
pub mod prelude;

pub use analysis::{EventClassification, EventOutcome, EventSource, MixError, MixingAnalysis, MixingStats};
pub use config::{ConfigError, LeadingMode, MixingConfig, PhiWindow};
pub use correlation::{CorrelationSink, MixCorrelator, MixSummary, TriggerParticle};
