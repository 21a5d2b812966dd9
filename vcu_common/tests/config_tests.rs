//! Configuration file tests.
//!
//! Loads `VcuConfig` through `ConfigLoader` from temporary files and checks
//! that validation rejects every table the engine could not honor.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vcu_common::prelude::*;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn load_full_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "vcu.toml",
        r#"
[shared]
log_level = "debug"
service_name = "vcu-cab-a"

[vigilance]
no_warning_s = [50, 50, 45, 40, 30, 25, 20, 15]
second_stage_s = [10, 8, 7, 6, 5, 4, 3, 2]
first_stage_s = 6
brake_no_reset_s = 90
train_stopped_s = 12
cab_inactive_s = 15
radio_warning_s = 20

[tla]
allotments = ["unlimited", "unlimited", { limited = 2 }, { limited = 2 }, { limited = 3 }, { limited = 3 }, { limited = 3 }, "unlimited"]

[speed_limit]
duration_s = 400
override_window_s = 20
"#,
    );

    let config = VcuConfig::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.vigilance.first_stage_s, 6);
    assert_eq!(config.vigilance.no_warning_ticks(SpeedBand::Below3), 200);
    assert_eq!(config.tla.allotments[2], Allotment::Limited(2));
    assert_eq!(config.tla.allotments[7], Allotment::Unlimited);
    assert_eq!(config.speed_limit.duration_s, 400);
}

#[test]
fn partial_file_keeps_factory_values() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "vcu.toml", "[speed_limit]\nduration_s = 300\n");
    let config = VcuConfig::load(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.vigilance, VigilanceTimingConfig::default());
    assert_eq!(config.tla, TlaConfig::default());
    assert_eq!(config.speed_limit.override_window_s, 30);
}

#[test]
fn missing_file() {
    let dir = TempDir::new().unwrap();
    let result = VcuConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "vcu.toml", "[vigilance\n");
    assert!(matches!(VcuConfig::load(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn wrong_table_length_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "vcu.toml", "[vigilance]\nno_warning_s = [60, 50]\n");
    assert!(matches!(VcuConfig::load(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn validation_failures() {
    let cases = [
        ("[vigilance]\nradio_warning_s = 0\n", "radio_warning_s"),
        (
            "[vigilance]\nno_warning_s = [60, 60, 50, 40, 30, 25, 20, 45]\n",
            "no_warning_s",
        ),
        (
            "[vigilance]\nsecond_stage_s = [60, 8, 7, 6, 5, 4, 3, 2]\n",
            "second_stage_s",
        ),
        ("[vigilance]\nbrake_no_reset_s = 20000\n", "brake_no_reset_s"),
        ("[speed_limit]\noverride_window_s = 600\n", "override_window_s"),
        ("[speed_limit]\nduration_s = 0\n", "duration_s"),
        ("[shared]\nservice_name = \"\"\n", "service_name"),
    ];
    let dir = TempDir::new().unwrap();
    for (i, (doc, field)) in cases.iter().enumerate() {
        let path = write(dir.path(), &format!("case_{i}.toml"), doc);
        let config = VcuConfig::load(&path).unwrap();
        match config.validate() {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(field), "case {i}: `{msg}` does not mention {field}")
            }
            other => panic!("case {i}: expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn unknown_section_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "vcu.toml", "[brakes]\nforce = 1\n");
    assert!(matches!(VcuConfig::load(&path), Err(ConfigError::ParseError(_))));
}
