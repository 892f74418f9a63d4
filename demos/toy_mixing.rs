//! Mixed-event background for a toy heavy-ion sample.
//!
//! Run with `RUST_LOG=mixcorr=debug` for per-event logging.

use std::f64::consts::{PI, TAU};

use mixcorr::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

/// Synthetic events: a random soft background plus, in one event out of
/// three, a hard di-jet whose leading particle is the trigger.
struct ToyGenerator {
    rng: StdRng,
    next_id: u64,
}

impl ToyGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    fn next_event(&mut self, config: &MixingConfig) -> OwnedEvent {
        let id = self.next_id;
        self.next_id += 1;

        let classification = EventClassification::new(
            self.rng.random_range(0..config.n_centrality_bins as i32),
            self.rng.random_range(0..config.n_z_vertex_bins as i32),
            self.rng.random_range(0..config.n_event_plane_bins as i32),
        );

        let multiplicity = self.rng.random_range(20..80);
        let tracks = (0..multiplicity)
            .map(|_| {
                // Roughly exponential soft spectrum
                let pt = 0.2 - 0.7 * (1.0 - self.rng.random::<f64>()).ln();
                let eta = self.rng.random_range(-0.9..0.9);
                let phi = self.rng.random_range(0.0..TAU);
                ParticleSnapshot::from_pt_eta_phi(pt, eta, phi, SourceTag::Track)
            })
            .collect::<Vec<_>>();

        let mut event = OwnedEvent::new(id, classification).with_tracks(tracks);

        if id % 3 == 0 {
            let pt = self.rng.random_range(8.0..20.0);
            let phi = self.rng.random_range(0.0..TAU);
            let eta = self.rng.random_range(-0.5..0.5);
            event = event.with_trigger(TriggerParticle::new(pt, eta, phi));
            event.tracks.push(ParticleSnapshot::from_pt_eta_phi(
                0.6 * pt,
                -eta,
                phi + PI,
                SourceTag::Track,
            ));
        }

        event
    }
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    let config = MixingConfig::from_parameters(
        "pool_max_size=5,n_centrality_bins=4,n_z_vertex_bins=2,leading_mode=absolute,fill_eta_gaps=true,seed=7",
    )?;

    println!("=== Toy Mixed-Event Analysis ===");
    println!("Leading mode: {}", config.leading_mode);
    println!(
        "Signal window: [{:.3}, {:.3}] rad, UE window: [{:.3}, {:.3}] rad",
        config.signal_window.min, config.signal_window.max, config.ue_window.min, config.ue_window.max
    );

    let mut generator = ToyGenerator::new(11);
    let mut analysis = MixingAnalysis::from_config(config.clone())?;
    let mut sink = RecordingSink::new();

    let mut total = MixSummary::default();
    for _ in 0..3000 {
        let event = generator.next_event(&config);
        total.merge(&analysis.process_event(&event, &mut sink).mix);
    }

    println!("\n=== Mixing Summary ===");
    println!("Background events scanned:  {}", total.events_scanned);
    println!("Background events accepted: {}", total.events_accepted);
    println!("Background events vetoed:   {}", total.events_vetoed);
    println!("Pairs emitted:              {}", total.pairs_emitted);

    let signal: Vec<f64> = sink
        .imbalance_in(ImbalanceRegion::Signal)
        .map(|r| r.x_e)
        .collect();
    let ue: Vec<f64> = sink
        .imbalance_in(ImbalanceRegion::UnderlyingEvent)
        .map(|r| r.x_e)
        .collect();
    let mean = |values: &[f64]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };

    println!("\n=== Momentum Imbalance ===");
    println!("Signal entries: {} (mean xE {:.4})", signal.len(), mean(&signal));
    println!("UE entries:     {} (mean xE {:.4})", ue.len(), mean(&ue));

    let gapped = sink.assoc_bins.iter().filter(|e| e.large_eta_gap).count();
    println!("Pairs with |deta| > 0.8: {} of {}", gapped, sink.assoc_bins.len());

    let (stats, pools) = analysis.finish();
    println!("\n=== Run Statistics ===");
    println!("{}", stats.format_summary());
    if let Some(pools) = pools {
        println!("Cached track events: {}", pools.total_cached_events(SourceTag::Track));
    }

    Ok(())
}
