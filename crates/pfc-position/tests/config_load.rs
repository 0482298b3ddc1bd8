use pfc_core::ClusterError;
use pfc_position::{PcaCalculatorConfig, SampleProjection};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn loads_default_config_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs/default.toml");
    let config = PcaCalculatorConfig::from_file(&path).expect("load default config");

    assert!((config.log_weight_denominator - 0.08).abs() < f64::EPSILON);
    assert_eq!(config.pos_calc_n_crystals, -1);
    assert!((config.min_allowed_normalization - 1e-9).abs() < f64::EPSILON);
    assert_eq!(config.sample_projection, SampleProjection::Xyz);
    assert_eq!(config, PcaCalculatorConfig::default());
}

#[test]
fn rejects_invalid_values_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "log_weight_denominator = -0.5").unwrap();

    let err = PcaCalculatorConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ClusterError::InvalidConfig(_)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PcaCalculatorConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ClusterError::Io(_)));
}
