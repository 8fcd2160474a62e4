//! Headless runner against configuration files on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pendulum_sim::cli::{run_simulation, Args, Command, OutputFormat, RunOptions};
use pendulum_sim::prelude::*;
use std::fs;
use std::path::PathBuf;

const CONTROLLED_YAML: &str = r#"
schema_version: "1.0"
simulation:
  name: swing-up
  description: controlled pendulum from the bottom
pendulum:
  length: 1.0
  mass: 1.0
  gravity: 9.8
  damping: 0.1
  initial_angle: 0.1
control:
  kp: 5.0
  kd: 10.0
  energy_gain: 10.0
  target_angle: 180 deg
  torque_limit: 1.0
engine:
  substeps: 5
run:
  duration: 2.0
  frame_rate: 60.0
  sample_every: 10
"#;

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pendulum.yaml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_load_and_run_controlled_config() {
    let (_dir, path) = write_config(CONTROLLED_YAML);
    let config = SimConfig::load(&path).unwrap();
    assert_eq!(config.simulation.name, "swing-up");

    let mut out = Vec::new();
    let summary = run_simulation(&config, OutputFormat::Csv, &mut out).unwrap();

    assert_eq!(summary.module, SimulationModule::PendulumControl);
    assert_eq!(summary.frames, 120);
    assert!(summary.peak_torque <= 1.0);

    let text = String::from_utf8(out).unwrap();
    for row in text.lines().skip(1) {
        let fields: Vec<&str> = row.split(',').collect();
        let theta: f64 = fields[2].parse().unwrap();
        let torque: f64 = fields[5].parse().unwrap();
        assert!(theta > -std::f64::consts::PI && theta <= std::f64::consts::PI);
        assert!(torque.abs() <= 1.0);
    }
}

#[test]
fn test_load_rejects_invalid_file() {
    let (_dir, path) = write_config(
        r"
pendulum:
  length: -1.0
  mass: 1.0
  gravity: 9.8
  damping: 0.1
  initial_angle: 0.1
",
    );
    let err = SimConfig::load(&path).unwrap_err();
    assert!(err.is_invalid_parameter());
}

#[test]
fn test_load_rejects_malformed_yaml() {
    let (_dir, path) = write_config("pendulum: [1, 2");
    assert!(matches!(
        SimConfig::load(&path).unwrap_err(),
        SimError::YamlParse(_)
    ));
}

#[test]
fn test_options_apply_to_loaded_config() {
    let (_dir, path) = write_config(CONTROLLED_YAML);
    let args = Args::parse_from([
        "pendulum-sim",
        "run",
        path.to_str().unwrap(),
        "--duration",
        "0.5",
        "--every",
        "1",
    ]);
    let Command::Run {
        config_path,
        options,
    } = args.command
    else {
        panic!("expected run command");
    };

    let mut config = SimConfig::load(config_path).unwrap();
    options.apply(&mut config).unwrap();

    let mut out = Vec::new();
    let summary = run_simulation(&config, options.format, &mut out).unwrap();
    assert_eq!(summary.frames, 30);
    assert_eq!(summary.samples, 30);
}

#[test]
fn test_yaml_roundtrip_through_disk() {
    let config = SimConfig::builder()
        .name("balance")
        .params(Preset::Balance.params())
        .build();
    let (_dir, path) = write_config(&config.to_yaml().unwrap());

    let loaded = SimConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let default_options = RunOptions::default();
    assert_eq!(default_options.format, OutputFormat::Text);
}
