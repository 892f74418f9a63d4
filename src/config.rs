//! Analysis configuration.
//!
//! [`MixingConfig`] is read once at initialization, either from a TOML
//! document or from a compact `key=value,key=value` parameter string, and
//! validated before any pool is created.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use evpool::pool::AcceptanceWindow;
use evpool::PoolConfig;
use serde::{Deserialize, Serialize};

/// Errors raised while reading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed parameter '{0}': expected key=value")]
    MalformedParameter(String),

    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("'{name}' must be at least one")]
    NotPositive { name: &'static str },

    #[error("Invalid {name} window: [{min}, {max}]")]
    InvalidWindow { name: &'static str, min: f64, max: f64 },

    #[error("Associated pT limits must be at least two strictly increasing values")]
    InvalidAssocLimits,

    #[error("Leading check with clusters requires cluster mixing to be enabled")]
    ClusterLeadingWithoutClusters,

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Which background events are kept when the trigger is not the hardest
/// particle in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadingMode {
    /// Every background event is used.
    None,
    /// Drop events holding any particle harder than the trigger.
    #[default]
    Absolute,
    /// Drop events holding a harder particle within π/2 of the trigger.
    NearSide,
}

impl FromStr for LeadingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(LeadingMode::None),
            "absolute" | "abs" => Ok(LeadingMode::Absolute),
            "near_side" | "nearside" | "near" => Ok(LeadingMode::NearSide),
            _ => Err(ConfigError::InvalidValue {
                key: "leading_mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LeadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeadingMode::None => "none",
            LeadingMode::Absolute => "absolute",
            LeadingMode::NearSide => "near_side",
        };
        f.write_str(name)
    }
}

/// Closed azimuthal interval `[min, max]` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhiWindow {
    pub min: f64,
    pub max: f64,
}

impl PhiWindow {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn from_degrees(min: f64, max: f64) -> Self {
        Self::new(min.to_radians(), max.to_radians())
    }

    pub fn contains(&self, delta_phi: f64) -> bool {
        delta_phi >= self.min && delta_phi <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min < self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidWindow {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Default associated-pT bin limits in GeV/c.
pub const DEFAULT_ASSOC_PT_LIMITS: [f64; 20] = [
    0.2, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 14.0, 16.0, 20.0, 30.0,
    40.0, 50.0, 200.0,
];

/// Configuration of event pools and mixed-event correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixingConfig {
    /// Events kept per classification bin and pool kind
    pub pool_max_size: usize,
    /// Number of centrality bins
    pub n_centrality_bins: usize,
    /// Number of z-vertex bins
    pub n_z_vertex_bins: usize,
    /// Number of event-plane bins
    pub n_event_plane_bins: usize,
    /// Keep a parallel pool of neutral clusters
    pub mix_clusters: bool,
    /// Veto applied to background events
    pub leading_mode: LeadingMode,
    /// Include cached clusters in the leading veto
    pub check_leading_with_clusters: bool,
    /// Lowest pT of a cached particle
    pub assoc_pt_min: f64,
    /// Highest pT of a cached particle
    pub assoc_pt_max: f64,
    /// Away-side signal window
    pub signal_window: PhiWindow,
    /// Underlying-event window
    pub ue_window: PhiWindow,
    /// Associated-pT bin limits
    pub assoc_pt_limits: Vec<f64>,
    /// Split associated-pT bins by z-vertex bin
    pub correlate_vz_bin: bool,
    /// Flag pairs with large or vanishing pseudorapidity gaps
    pub fill_eta_gaps: bool,
    /// Maintain pools and mix triggers with them
    pub do_own_mix: bool,
    /// Seed for the underlying-event angle generator
    pub seed: Option<u64>,
}

impl Default for MixingConfig {
    fn default() -> Self {
        Self {
            pool_max_size: 10,
            n_centrality_bins: 1,
            n_z_vertex_bins: 1,
            n_event_plane_bins: 1,
            mix_clusters: false,
            leading_mode: LeadingMode::Absolute,
            check_leading_with_clusters: false,
            assoc_pt_min: 0.0,
            assoc_pt_max: 1000.0,
            signal_window: PhiWindow::from_degrees(120.0, 240.0),
            ue_window: PhiWindow::from_degrees(60.0, 120.0),
            assoc_pt_limits: DEFAULT_ASSOC_PT_LIMITS.to_vec(),
            correlate_vz_bin: false,
            fill_eta_gaps: false,
            do_own_mix: true,
            seed: None,
        }
    }
}

impl MixingConfig {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: MixingConfig = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("reading mixing configuration {}", path.display()))?;
        Self::from_toml_str(&document)
            .with_context(|| format!("parsing mixing configuration {}", path.display()))
    }

    /// Build a configuration from a `key=value,key=value` string applied on
    /// top of the defaults.
    ///
    /// Angles are given in radians. List values use `:` as separator, for
    /// example `assoc_pt_limits=0.5:1:2:4`.
    pub fn from_parameters(parameters: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (key, value) in parse_parameters(parameters)? {
            match key.as_str() {
                "pool_max_size" | "poolMaxSize" => config.pool_max_size = parse_value(&key, &value)?,
                "n_centrality_bins" | "nCentralityBins" => {
                    config.n_centrality_bins = parse_value(&key, &value)?
                }
                "n_z_vertex_bins" | "nZVertexBins" => config.n_z_vertex_bins = parse_value(&key, &value)?,
                "n_event_plane_bins" | "nEventPlaneBins" => {
                    config.n_event_plane_bins = parse_value(&key, &value)?
                }
                "mix_clusters" | "mixClusters" => config.mix_clusters = parse_value(&key, &value)?,
                "leading_mode" | "leadingMode" => config.leading_mode = value.parse()?,
                "check_leading_with_clusters" => {
                    config.check_leading_with_clusters = parse_value(&key, &value)?
                }
                "assoc_pt_min" | "assocPtMin" => config.assoc_pt_min = parse_value(&key, &value)?,
                "assoc_pt_max" | "assocPtMax" => config.assoc_pt_max = parse_value(&key, &value)?,
                "delta_phi_signal_min" | "deltaPhiSignalMin" => {
                    config.signal_window.min = parse_value(&key, &value)?
                }
                "delta_phi_signal_max" | "deltaPhiSignalMax" => {
                    config.signal_window.max = parse_value(&key, &value)?
                }
                "delta_phi_ue_min" | "deltaPhiUeMin" => config.ue_window.min = parse_value(&key, &value)?,
                "delta_phi_ue_max" | "deltaPhiUeMax" => config.ue_window.max = parse_value(&key, &value)?,
                "assoc_pt_limits" => {
                    config.assoc_pt_limits = value
                        .split(':')
                        .map(|v| parse_value(&key, v))
                        .collect::<Result<Vec<f64>, _>>()?
                }
                "correlate_vz_bin" => config.correlate_vz_bin = parse_value(&key, &value)?,
                "fill_eta_gaps" => config.fill_eta_gaps = parse_value(&key, &value)?,
                "do_own_mix" => config.do_own_mix = parse_value(&key, &value)?,
                "seed" => config.seed = Some(parse_value(&key, &value)?),
                _ => return Err(ConfigError::UnknownParameter(key)),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every option for consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_max_size == 0 {
            return Err(ConfigError::NotPositive { name: "pool_max_size" });
        }
        if self.n_centrality_bins == 0 {
            return Err(ConfigError::NotPositive { name: "n_centrality_bins" });
        }
        if self.n_z_vertex_bins == 0 {
            return Err(ConfigError::NotPositive { name: "n_z_vertex_bins" });
        }
        if self.n_event_plane_bins == 0 {
            return Err(ConfigError::NotPositive { name: "n_event_plane_bins" });
        }

        if !(self.assoc_pt_min >= 0.0 && self.assoc_pt_min <= self.assoc_pt_max) {
            return Err(ConfigError::InvalidWindow {
                name: "associated pT",
                min: self.assoc_pt_min,
                max: self.assoc_pt_max,
            });
        }

        self.signal_window.validate("signal")?;
        self.ue_window.validate("underlying event")?;

        if self.check_leading_with_clusters && !self.mix_clusters {
            return Err(ConfigError::ClusterLeadingWithoutClusters);
        }

        if self.assoc_pt_limits.len() < 2 || self.assoc_pt_limits.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(ConfigError::InvalidAssocLimits);
        }

        Ok(())
    }

    /// Pool layout described by this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            pool_max_size: self.pool_max_size,
            n_centrality_bins: self.n_centrality_bins,
            n_z_vertex_bins: self.n_z_vertex_bins,
            n_event_plane_bins: self.n_event_plane_bins,
            mix_clusters: self.mix_clusters,
        }
    }

    /// pT window applied when snapshotting particles.
    pub fn acceptance(&self) -> AcceptanceWindow {
        AcceptanceWindow::new(self.assoc_pt_min, self.assoc_pt_max)
    }
}

/// Split a `key=value,key=value` string into trimmed pairs, in order.
///
/// Empty entries are skipped.
pub fn parse_parameters(parameters: &str) -> Result<Vec<(String, String)>, ConfigError> {
    parameters
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedParameter(entry.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::MalformedParameter(entry.to_string()));
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
