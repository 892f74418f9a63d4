use evpool::pool::{BinGrid, BinIndex, ParticleSnapshot, SourceTag};
use serde::{Deserialize, Serialize};

use crate::correlation::TriggerParticle;

/// Discretised event properties as delivered by the event producer.
///
/// Negative or out-of-range values mark an event that could not be
/// classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventClassification {
    pub centrality_bin: i32,
    pub z_vertex_bin: i32,
    pub event_plane_bin: i32,
}

impl EventClassification {
    pub fn new(centrality_bin: i32, z_vertex_bin: i32, event_plane_bin: i32) -> Self {
        Self {
            centrality_bin,
            z_vertex_bin,
            event_plane_bin,
        }
    }

    /// Producer could not classify the event.
    pub fn unclassified() -> Self {
        Self::new(-1, -1, -1)
    }

    pub fn bin_in(&self, grid: &BinGrid) -> BinIndex {
        grid.get_bin_index(self.centrality_bin, self.z_vertex_bin, self.event_plane_bin)
    }
}

/// Read access to the current event, implemented by the reconstruction
/// framework.
///
/// Particles are returned by value; the analysis deep-copies what it caches
/// and never holds on to producer objects.
pub trait EventSource {
    /// Raw event number, unique within a run.
    fn event_id(&self) -> u64;

    fn classification(&self) -> EventClassification;

    /// Selected tracks or clusters of the event.
    fn candidate_particles(&self, kind: SourceTag) -> Vec<ParticleSnapshot>;

    fn trigger_particles(&self) -> Vec<TriggerParticle>;

    /// Whether the event passed the minimum-bias selection and may be cached.
    fn is_minimum_bias(&self) -> bool;
}

impl<E: EventSource + ?Sized> EventSource for &E {
    fn event_id(&self) -> u64 {
        (**self).event_id()
    }

    fn classification(&self) -> EventClassification {
        (**self).classification()
    }

    fn candidate_particles(&self, kind: SourceTag) -> Vec<ParticleSnapshot> {
        (**self).candidate_particles(kind)
    }

    fn trigger_particles(&self) -> Vec<TriggerParticle> {
        (**self).trigger_particles()
    }

    fn is_minimum_bias(&self) -> bool {
        (**self).is_minimum_bias()
    }
}

/// Event held entirely in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedEvent {
    pub event_id: u64,
    pub classification: EventClassification,
    pub tracks: Vec<ParticleSnapshot>,
    pub clusters: Vec<ParticleSnapshot>,
    pub triggers: Vec<TriggerParticle>,
    pub minimum_bias: bool,
}

impl OwnedEvent {
    pub fn new(event_id: u64, classification: EventClassification) -> Self {
        Self {
            event_id,
            classification,
            tracks: Vec::new(),
            clusters: Vec::new(),
            triggers: Vec::new(),
            minimum_bias: true,
        }
    }

    pub fn with_tracks(mut self, tracks: Vec<ParticleSnapshot>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_clusters(mut self, clusters: Vec<ParticleSnapshot>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerParticle) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_minimum_bias(mut self, minimum_bias: bool) -> Self {
        self.minimum_bias = minimum_bias;
        self
    }
}

impl EventSource for OwnedEvent {
    fn event_id(&self) -> u64 {
        self.event_id
    }

    fn classification(&self) -> EventClassification {
        self.classification
    }

    fn candidate_particles(&self, kind: SourceTag) -> Vec<ParticleSnapshot> {
        match kind {
            SourceTag::Track => self.tracks.clone(),
            SourceTag::Cluster => self.clusters.clone(),
        }
    }

    fn trigger_particles(&self) -> Vec<TriggerParticle> {
        self.triggers.clone()
    }

    fn is_minimum_bias(&self) -> bool {
        self.minimum_bias
    }
}
