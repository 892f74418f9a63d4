// tests/integration_tests.rs
//! Integration tests for the mixed-event analysis

use mixcorr::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod integration {
    mod config_loading;
    mod mixing_scenarios;
}

/// Toy event with one trigger and a fixed set of tracks.
fn toy_event(id: u64, centrality: i32, trigger_pt: f64, track_pts: &[f64]) -> OwnedEvent {
    let tracks = track_pts
        .iter()
        .enumerate()
        .map(|(i, &pt)| ParticleSnapshot::from_pt_eta_phi(pt, 0.1 * i as f64, 0.3 + 0.4 * i as f64, SourceTag::Track))
        .collect();
    OwnedEvent::new(id, EventClassification::new(centrality, 0, 0))
        .with_tracks(tracks)
        .with_trigger(TriggerParticle::new(trigger_pt, 0.0, 3.4))
}

fn seeded_analysis(config: MixingConfig) -> MixingAnalysis {
    let pools = config.pool_config().create_manager().unwrap();
    MixingAnalysis::with_rng(config, Some(pools), StdRng::seed_from_u64(2024)).unwrap()
}

#[test]
fn test_full_run_over_two_centrality_classes() {
    println!("=== Full Run Over Two Centrality Classes ===");

    let config = MixingConfig::from_parameters("pool_max_size=3,n_centrality_bins=2,leading_mode=none").unwrap();
    let mut analysis = seeded_analysis(config);
    let mut sink = RecordingSink::new();

    let events: Vec<OwnedEvent> = (0..20)
        .map(|id| toy_event(id, (id % 2) as i32, 8.0, &[1.0, 2.0, 3.0]))
        .collect();
    let total = analysis.run(&events, &mut sink);

    // Each class sees events 0..10; event k mixes with min(k, 3) earlier ones
    let per_class: usize = (0..10).map(|k: usize| k.min(3)).sum();
    assert_eq!(total.events_scanned, 2 * per_class);
    assert_eq!(total.events_accepted, total.events_scanned);
    assert_eq!(total.pairs_emitted, 3 * total.events_scanned);
    assert_eq!(sink.angular.len(), total.pairs_emitted);
    assert_eq!(sink.mixed_triggers.len(), total.events_accepted);

    let pools = analysis.pools().unwrap();
    for bin in pools.grid().indices() {
        assert_eq!(pools.lookup(bin, SourceTag::Track).unwrap().len(), 3);
    }

    let (stats, _) = analysis.finish();
    println!("{}", stats.format_summary());
    assert_eq!(stats.events_per_bin, vec![10, 10]);
    assert_eq!(stats.total_cached_events(), 20);
    assert_eq!(stats.total_mixed_events() as usize, total.events_accepted);
}

#[test]
fn test_absolute_leading_filters_background() {
    println!("=== Absolute Leading Veto Over A Run ===");

    let mut analysis = seeded_analysis(MixingConfig::default());
    let mut sink = RecordingSink::new();

    // A hard event enters the pool first, then a soft one
    analysis.process_event(&toy_event(1, 0, 20.0, &[15.0, 1.0]), &mut sink);
    analysis.process_event(&toy_event(2, 0, 20.0, &[1.0, 1.5]), &mut sink);
    sink.clear();

    // Trigger of 10 GeV/c: the 15 GeV/c event is vetoed, the soft one is kept
    let outcome = analysis.process_event(&toy_event(3, 0, 10.0, &[]), &mut sink);
    assert_eq!(outcome.mix.events_scanned, 2);
    assert_eq!(outcome.mix.events_vetoed, 1);
    assert_eq!(outcome.mix.events_accepted, 1);
    assert_eq!(sink.angular.len(), 2);
    assert!(sink.imbalance.iter().all(|r| r.z_t < 0.2));
}

#[test]
fn test_acceptance_window_applies_to_cached_tracks() {
    let config = MixingConfig::from_parameters("assoc_pt_min=0.5,assoc_pt_max=5,leading_mode=none").unwrap();
    let mut analysis = seeded_analysis(config);
    let mut sink = NullSink;

    analysis.process_event(&toy_event(1, 0, 10.0, &[0.2, 1.0, 4.0, 7.0]), &mut sink);

    let pool = analysis
        .pools()
        .unwrap()
        .lookup(EventClassification::new(0, 0, 0).bin_in(&BinGrid::single()), SourceTag::Track)
        .unwrap();
    let cached = pool.front().unwrap();
    assert_eq!(cached.event_id(), 1);
    assert_eq!(cached.len(), 2);
    assert!(cached.iter().all(|s| s.pt() >= 0.5 && s.pt() <= 5.0));
}

#[test]
fn test_same_seed_reproduces_run() {
    let run = || {
        let mut analysis = seeded_analysis(MixingConfig::default());
        let mut sink = RecordingSink::new();
        let events: Vec<OwnedEvent> = (0..8)
            .map(|id| toy_event(id, 0, 9.0, &[1.0, 2.0, 2.5, 4.0, 0.8]))
            .collect();
        analysis.run(&events, &mut sink);
        sink.imbalance.iter().map(|r| r.x_e).collect::<Vec<_>>()
    };

    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}
