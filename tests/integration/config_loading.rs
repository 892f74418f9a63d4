//! Loading analysis configuration from files and parameter strings

use mixcorr::prelude::*;
use std::io::Write;

#[test]
fn test_load_toml_file_and_start_analysis() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
pool_max_size = 6
n_centrality_bins = 5
n_z_vertex_bins = 2
mix_clusters = true
leading_mode = "near_side"
check_leading_with_clusters = true
seed = 17

[ue_window]
min = 1.0
max = 2.0
"#
    )
    .unwrap();

    let config = MixingConfig::from_file(file.path()).unwrap();
    assert_eq!(config.pool_max_size, 6);
    assert_eq!(config.leading_mode, LeadingMode::NearSide);
    assert_eq!(config.ue_window, PhiWindow::new(1.0, 2.0));
    assert_eq!(config.seed, Some(17));

    let analysis = MixingAnalysis::from_config(config).unwrap();
    let pools = analysis.pools().unwrap();
    assert_eq!(pools.grid().len(), 10);
    assert_eq!(pools.capacity(), 6);
    assert!(pools.has_kind(SourceTag::Cluster));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let error = MixingConfig::from_file(&path).unwrap_err();
    let message = format!("{error:#}");
    assert!(message.contains("absent.toml"), "{message}");
}

#[test]
fn test_invalid_file_content_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "pool_max_size = 0").unwrap();

    let error = MixingConfig::from_file(file.path()).unwrap_err();
    assert!(error.downcast_ref::<ConfigError>().is_some());
}

#[test]
fn test_parameter_string_matches_toml() {
    let from_params =
        MixingConfig::from_parameters("pool_max_size=4, n_event_plane_bins=3, fill_eta_gaps=true").unwrap();
    let from_toml = MixingConfig::from_toml_str(
        "pool_max_size = 4\nn_event_plane_bins = 3\nfill_eta_gaps = true\n",
    )
    .unwrap();
    assert_eq!(from_params, from_toml);
}

#[test]
fn test_disabled_mixing_needs_no_pools() {
    let config = MixingConfig::from_parameters("do_own_mix=false").unwrap();
    let analysis = MixingAnalysis::from_config(config).unwrap();
    assert!(analysis.pools().is_none());
}
