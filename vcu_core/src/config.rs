//! TOML configuration loader with validation.
//!
//! Loads a [`VcuConfig`] from a TOML file, validates it, and converts the
//! second-based tables into the tick counts the step functions use. The
//! engine never sees an unvalidated value.

use std::path::Path;

use vcu_common::config::{ConfigError, ConfigLoader};
use vcu_common::consts::{
    BRAKE_NO_RESET_TIMEOUT_S, CAB_INACTIVE_TIMEOUT_S, FIRST_STAGE_TIMEOUT_S,
    NO_WARNING_TIMEOUT_S, RADIO_WARNING_TIMEOUT_S, SECOND_STAGE_TIMEOUT_S,
    SPEED_LIMIT_DURATION_S, SPEED_LIMIT_OVERRIDE_WINDOW_S, TRAIN_STOPPED_TIMEOUT_S,
};
use vcu_common::vigilance::config::{VcuConfig, to_quarters};
use vcu_common::vigilance::speed::{SPEED_BANDS, SpeedBand};
use vcu_common::vigilance::tla::{Allotment, DEFAULT_ALLOTMENTS, TLA_CHANNELS};

// ─── Runtime Timing ─────────────────────────────────────────────────

/// Validated timing in engine units.
///
/// Vigilance timeouts are in quarter ticks, speed-limit values in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub no_warning: [u16; SPEED_BANDS],
    pub second_stage: [u16; SPEED_BANDS],
    pub first_stage: u16,
    pub brake_no_reset: u16,
    pub train_stopped: u16,
    pub cab_inactive: u16,
    pub radio_warning: u16,
    pub allotments: [Allotment; TLA_CHANNELS],
    pub speed_limit_s: u16,
    pub override_window_s: u16,
}

const fn quarters_table(seconds: [u16; SPEED_BANDS]) -> [u16; SPEED_BANDS] {
    let mut out = [0u16; SPEED_BANDS];
    let mut i = 0;
    while i < SPEED_BANDS {
        out[i] = to_quarters(seconds[i]);
        i += 1;
    }
    out
}

impl Timing {
    /// Factory timing.
    pub const FACTORY: Self = Self {
        no_warning: quarters_table(NO_WARNING_TIMEOUT_S),
        second_stage: quarters_table(SECOND_STAGE_TIMEOUT_S),
        first_stage: to_quarters(FIRST_STAGE_TIMEOUT_S),
        brake_no_reset: to_quarters(BRAKE_NO_RESET_TIMEOUT_S),
        train_stopped: to_quarters(TRAIN_STOPPED_TIMEOUT_S),
        cab_inactive: to_quarters(CAB_INACTIVE_TIMEOUT_S),
        radio_warning: to_quarters(RADIO_WARNING_TIMEOUT_S),
        allotments: DEFAULT_ALLOTMENTS,
        speed_limit_s: SPEED_LIMIT_DURATION_S,
        override_window_s: SPEED_LIMIT_OVERRIDE_WINDOW_S,
    };

    /// Validate `config` and convert it.
    pub fn from_config(config: &VcuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let v = &config.vigilance;
        Ok(Self {
            no_warning: quarters_table(v.no_warning_s),
            second_stage: quarters_table(v.second_stage_s),
            first_stage: to_quarters(v.first_stage_s),
            brake_no_reset: to_quarters(v.brake_no_reset_s),
            train_stopped: to_quarters(v.train_stopped_s),
            cab_inactive: to_quarters(v.cab_inactive_s),
            radio_warning: to_quarters(v.radio_warning_s),
            allotments: config.tla.allotments,
            speed_limit_s: config.speed_limit.duration_s,
            override_window_s: config.speed_limit.override_window_s,
        })
    }

    /// NoWarning reload for `band` [quarter ticks].
    #[inline]
    pub const fn no_warning_for(&self, band: SpeedBand) -> u16 {
        self.no_warning[band.index()]
    }

    /// SecondStageWarning reload for `band` [quarter ticks].
    #[inline]
    pub const fn second_stage_for(&self, band: SpeedBand) -> u16 {
        self.second_stage[band.index()]
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::FACTORY
    }
}

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Validated configuration together with its runtime timing.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: VcuConfig,
    pub timing: Timing,
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the engine configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let config = VcuConfig::load(path)?;
    let timing = Timing::from_config(&config)?;
    Ok(LoadedConfig { config, timing })
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(toml: &str) -> Result<LoadedConfig, ConfigError> {
    let config = VcuConfig::from_toml_str(toml)?;
    let timing = Timing::from_config(&config)?;
    Ok(LoadedConfig { config, timing })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_matches_default_config() {
        let timing = Timing::from_config(&VcuConfig::default()).unwrap();
        assert_eq!(timing, Timing::FACTORY);
        assert_eq!(Timing::default(), Timing::FACTORY);
    }

    #[test]
    fn factory_values_in_quarter_ticks() {
        let t = Timing::FACTORY;
        assert_eq!(t.no_warning_for(SpeedBand::Below3), 240);
        assert_eq!(t.no_warning_for(SpeedBand::Overspeed), 60);
        assert_eq!(t.second_stage_for(SpeedBand::Above3), 32);
        assert_eq!(t.first_stage, 20);
        assert_eq!(t.brake_no_reset, 240);
        assert_eq!(t.speed_limit_s, 500);
    }

    #[test]
    fn load_valid_config() {
        let loaded = load_config_from_str(
            r#"
[shared]
service_name = "vcu-cab-b"

[vigilance]
first_stage_s = 4
no_warning_s = [45, 45, 40, 35, 30, 25, 20, 15]

[speed_limit]
duration_s = 300
"#,
        )
        .unwrap();
        assert_eq!(loaded.config.shared.service_name, "vcu-cab-b");
        assert_eq!(loaded.timing.first_stage, 16);
        assert_eq!(loaded.timing.no_warning_for(SpeedBand::Below3), 180);
        assert_eq!(loaded.timing.speed_limit_s, 300);
    }

    #[test]
    fn reject_malformed_toml() {
        let result = load_config_from_str("[vigilance\nfirst_stage_s = 4");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn reject_invalid_timing() {
        let result = load_config_from_str("[vigilance]\ntrain_stopped_s = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn reject_limited_zero_allotment() {
        let result = load_config_from_str(
            r#"
[tla]
allotments = ["unlimited", "unlimited", { limited = 0 }, { limited = 3 }, { limited = 3 }, { limited = 3 }, { limited = 3 }, { limited = 3 }]
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_file_reported() {
        let result = load_config(Path::new("/nonexistent/vcu.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound)));
    }
}
