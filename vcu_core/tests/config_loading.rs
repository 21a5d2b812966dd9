//! Configuration and scenario files loaded from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use vcu_common::prelude::*;
use vcu_core::config::{Timing, load_config};
use vcu_core::cycle::Engine;
use vcu_core::scenario::{Scenario, ScenarioError};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn shortened_timeouts_reach_the_engine() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "vcu.toml",
        r#"
[shared]
service_name = "vcu-bench"

[vigilance]
no_warning_s = [20, 20, 20, 20, 20, 15, 15, 10]
second_stage_s = [5, 5, 5, 5, 5, 4, 3, 2]
first_stage_s = 3
"#,
    );

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config.shared.service_name, "vcu-bench");
    assert_eq!(loaded.timing.no_warning_for(SpeedBand::Above3), 80);
    assert_eq!(loaded.timing.first_stage, 12);

    let inputs = Inputs::driving(SpeedBand::Above3);
    let mut engine = Engine::with_timing(loaded.timing);
    engine.run_samples(&inputs, 10);
    let out = engine.run_for(&inputs, Duration::from_millis(20_500));
    assert_eq!(out.vigilance_state, VigilanceState::FirstStageWarning);
    let out = engine.run_for(&inputs, Duration::from_secs(3));
    assert_eq!(out.vigilance_state, VigilanceState::SecondStageWarning);
}

#[test]
fn invalid_file_is_rejected_before_conversion() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "vcu.toml", "[speed_limit]\nduration_s = 20\n");
    assert!(matches!(load_config(&path), Err(ConfigError::ValidationError(_))));
}

#[test]
fn factory_timing_without_file() {
    let engine = Engine::new(&VcuConfig::default()).unwrap();
    assert_eq!(*engine.timing(), Timing::FACTORY);
}

#[test]
fn scenario_file_replays_phases() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "drive.toml",
        r#"
name = "stop under penalty"

[[phase]]
name = "parked"
duration_ms = 1000
cab_active = true

[[phase]]
name = "unattended"
duration_ms = 75000
cab_active = true
brake_pressure_high = false
digital_zero_speed = false
speed_code = 3
no_power = false
"#,
    );

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.name, "stop under penalty");
    assert_eq!(scenario.duration(), Duration::from_secs(76));

    let mut engine = Engine::default();
    let summaries = scenario.run(&mut engine);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].mode, Some(OperatingMode::Suppressed));
    assert!(!summaries[0].penalty_brake);
    assert_eq!(summaries[1].mode, Some(OperatingMode::Normal));
    assert_eq!(summaries[1].vigilance_state, VigilanceState::BrakeNoReset);
    assert!(summaries[1].penalty_brake);
    assert!(summaries[1].transitions >= 4);
}

#[test]
fn scenario_errors() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Scenario::load(&dir.path().join("absent.toml")),
        Err(ScenarioError::Io { .. })
    ));
    assert!(matches!(Scenario::from_toml_str("name = \"x\"\n"), Err(ScenarioError::Empty)));
    assert!(matches!(
        Scenario::from_toml_str("[[phase]]\nname = \"a\"\nduration_ms = 0\n"),
        Err(ScenarioError::ZeroDuration(name)) if name == "a"
    ));
    assert!(matches!(
        Scenario::from_toml_str("[[phase]]\nname = 5\n"),
        Err(ScenarioError::Parse(_))
    ));
}
