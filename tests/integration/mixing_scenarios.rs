//! Mixing scenarios driven through the public correlator and analysis API

use mixcorr::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

fn single_bin_pools(capacity: usize) -> PoolManager {
    PoolManager::new(BinGrid::single(), capacity, false).unwrap()
}

fn cache(pools: &mut PoolManager, id: u64, particles: Vec<ParticleSnapshot>) {
    let bin = pools.grid().get_bin_index(0, 0, 0);
    let outcome = pools.insert(bin, id, SnapshotArray::new(id, particles), SourceTag::Track);
    assert!(outcome.is_inserted());
}

fn correlator(config: &MixingConfig) -> MixCorrelator {
    MixCorrelator::with_rng(config, StdRng::seed_from_u64(99)).unwrap()
}

#[test]
fn test_harder_background_particle_vetoes_event() {
    let mut pools = single_bin_pools(5);
    cache(&mut pools, 1, vec![ParticleSnapshot::from_pt_eta_phi(12.0, 0.0, 1.0, SourceTag::Track)]);

    let mut sink = RecordingSink::new();
    let trigger = TriggerParticle::new(10.0, 0.0, 4.0);
    let bin = pools.grid().get_bin_index(0, 0, 0);
    let summary = correlator(&MixingConfig::default()).correlate(&trigger, &pools, bin, 0, &mut sink);

    assert_eq!(summary.events_vetoed, 1);
    assert!(sink.angular.is_empty());
    assert!(sink.imbalance.is_empty());
    assert!(sink.mixed_triggers.is_empty());
}

#[test]
fn test_away_side_pair_in_signal_window() {
    let mut pools = single_bin_pools(5);
    cache(&mut pools, 1, vec![ParticleSnapshot::from_pt_eta_phi(2.0, 0.0, 0.25, SourceTag::Track)]);

    let config = MixingConfig::default();
    assert!((config.signal_window.min - 2.094).abs() < 1e-3);
    assert!((config.signal_window.max - 4.189).abs() < 1e-3);

    let mut sink = RecordingSink::new();
    let trigger = TriggerParticle::new(10.0, 0.0, 3.25);
    let bin = pools.grid().get_bin_index(0, 0, 0);
    correlator(&config).correlate(&trigger, &pools, bin, 0, &mut sink);

    assert_eq!(sink.angular.len(), 1);
    assert!((sink.angular[0].1 - 3.0).abs() < 1e-9);

    let signal: Vec<_> = sink.imbalance_in(ImbalanceRegion::Signal).collect();
    assert_eq!(signal.len(), 1);
    assert!((signal[0].x_e - 0.198).abs() < 1e-3);
    assert!((signal[0].z_t - 0.2).abs() < 1e-9);
    assert!(signal[0].hbp_x_e.is_some());
}

#[test]
fn test_near_side_mode_keeps_away_side_harder_particle() {
    let config = MixingConfig::from_parameters("leading_mode=near_side").unwrap();
    let mut pools = single_bin_pools(5);
    // 15 GeV/c particle back-to-back with the trigger
    cache(&mut pools, 1, vec![
        ParticleSnapshot::from_pt_eta_phi(15.0, 0.0, 1.0 + PI, SourceTag::Track),
        ParticleSnapshot::from_pt_eta_phi(2.0, 0.0, 0.9, SourceTag::Track),
    ]);
    // 15 GeV/c particle right next to it
    cache(&mut pools, 2, vec![ParticleSnapshot::from_pt_eta_phi(15.0, 0.0, 1.2, SourceTag::Track)]);

    let mut sink = RecordingSink::new();
    let trigger = TriggerParticle::new(10.0, 0.0, 1.0);
    let bin = pools.grid().get_bin_index(0, 0, 0);
    let summary = correlator(&config).correlate(&trigger, &pools, bin, 0, &mut sink);

    assert_eq!(summary.events_scanned, 2);
    assert_eq!(summary.events_vetoed, 1);
    assert_eq!(summary.pairs_emitted, 2);

    // The same pools are rejected outright in absolute mode
    let mut sink = RecordingSink::new();
    let summary = correlator(&MixingConfig::default()).correlate(&trigger, &pools, bin, 0, &mut sink);
    assert_eq!(summary.events_accepted, 0);
}

#[test]
fn test_underlying_event_pairs_use_random_angle() {
    let mut pools = single_bin_pools(5);
    // Δφ = π/2 falls in the underlying-event window only
    let particles = (0..200)
        .map(|_| ParticleSnapshot::from_pt_eta_phi(5.0, 0.0, 0.5, SourceTag::Track))
        .collect();
    cache(&mut pools, 1, particles);

    let mut sink = RecordingSink::new();
    let trigger = TriggerParticle::new(10.0, 0.0, 0.5 + PI / 2.0);
    let bin = pools.grid().get_bin_index(0, 0, 0);
    correlator(&MixingConfig::default()).correlate(&trigger, &pools, bin, 0, &mut sink);

    let ue: Vec<f64> = sink
        .imbalance_in(ImbalanceRegion::UnderlyingEvent)
        .map(|r| r.x_e)
        .collect();
    assert_eq!(ue.len(), 200);

    // At Δφ = π/2 itself x_E would vanish; the drawn angles give 0.25..0.5
    for x in &ue {
        assert!(*x >= 0.25 - 1e-9 && *x <= 0.5 + 1e-9, "{x}");
    }
    let mean = ue.iter().sum::<f64>() / ue.len() as f64;
    assert!(mean > 0.3 && mean < 0.5, "mean {mean}");
}

#[test]
fn test_fifo_history_seen_by_analysis() {
    let config = MixingConfig::from_parameters("pool_max_size=3,leading_mode=none").unwrap();
    let pools = config.pool_config().create_manager().unwrap();
    let mut analysis = MixingAnalysis::with_rng(config, Some(pools), StdRng::seed_from_u64(5)).unwrap();
    let mut sink = NullSink;

    for id in [10, 11, 12, 13] {
        let event = OwnedEvent::new(id, EventClassification::new(0, 0, 0))
            .with_tracks(vec![ParticleSnapshot::from_pt_eta_phi(1.0, 0.0, 0.0, SourceTag::Track)]);
        analysis.process_event(&event, &mut sink);
    }

    let pools = analysis.pools().unwrap();
    let pool = pools.lookup(BinGrid::single().get_bin_index(0, 0, 0), SourceTag::Track).unwrap();
    let ids: Vec<u64> = pool.iter().map(SnapshotArray::event_id).collect();
    assert_eq!(ids, vec![13, 12, 11]);
}

#[test]
fn test_triggering_event_never_mixes_with_itself() {
    let config = MixingConfig::from_parameters("leading_mode=none").unwrap();
    let pools = config.pool_config().create_manager().unwrap();
    let mut analysis = MixingAnalysis::with_rng(config, Some(pools), StdRng::seed_from_u64(5)).unwrap();

    let event = OwnedEvent::new(1, EventClassification::new(0, 0, 0))
        .with_tracks(vec![ParticleSnapshot::from_pt_eta_phi(3.0, 0.0, 0.0, SourceTag::Track)])
        .with_trigger(TriggerParticle::new(6.0, 0.0, PI))
        .with_trigger(TriggerParticle::new(4.0, 0.0, 1.0));

    let mut sink = RecordingSink::new();
    let outcome = analysis.process_event(&event, &mut sink);

    assert_eq!(outcome.triggers, 2);
    assert_eq!(outcome.mix, MixSummary::default());
    assert!(sink.is_empty());
    assert!(outcome.tracks.is_some_and(|o| o.is_inserted()));
}

#[test]
fn test_assoc_bins_split_by_vertex() {
    let config = MixingConfig::from_parameters(
        "n_z_vertex_bins=4,correlate_vz_bin=true,assoc_pt_limits=1:2:4,leading_mode=none",
    )
    .unwrap();
    let pools = config.pool_config().create_manager().unwrap();
    let mut analysis = MixingAnalysis::with_rng(config, Some(pools), StdRng::seed_from_u64(8)).unwrap();
    let mut sink = RecordingSink::new();

    let background = OwnedEvent::new(1, EventClassification::new(0, 2, 0)).with_tracks(vec![
        ParticleSnapshot::from_pt_eta_phi(1.5, 0.0, 0.0, SourceTag::Track),
        ParticleSnapshot::from_pt_eta_phi(3.0, 0.0, 0.0, SourceTag::Track),
        ParticleSnapshot::from_pt_eta_phi(9.0, 0.0, 0.0, SourceTag::Track),
    ]);
    let triggered = OwnedEvent::new(2, EventClassification::new(0, 2, 0))
        .with_trigger(TriggerParticle::new(10.0, 0.0, PI));

    analysis.process_event(&background, &mut sink);
    analysis.process_event(&triggered, &mut sink);

    let bins: Vec<usize> = sink.assoc_bins.iter().map(|e| e.bin).collect();
    // assoc bin * 4 + vertex bin 2; the 9 GeV/c track has no assoc bin
    assert_eq!(bins, vec![2, 6]);
    assert_eq!(sink.mixed_triggers.len(), 1);
    assert_eq!(sink.mixed_triggers[0].z_vertex_bin, 2);
}
