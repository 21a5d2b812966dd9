//! Configuration structures for the vigilance engine.
//!
//! All sections use `#[serde(default)]` so an empty document yields the
//! factory timing tables. Tables are expressed in seconds; the engine
//! converts them to tick counts once, after [`VcuConfig::validate`] has
//! rejected anything the step function could not honor.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    BRAKE_NO_RESET_TIMEOUT_S, CAB_INACTIVE_TIMEOUT_S, FIRST_STAGE_TIMEOUT_S,
    NO_WARNING_TIMEOUT_S, QUARTERS_PER_SECOND, RADIO_WARNING_TIMEOUT_S, SECOND_STAGE_TIMEOUT_S,
    SPEED_LIMIT_DURATION_S, SPEED_LIMIT_OVERRIDE_WINDOW_S, TRAIN_STOPPED_TIMEOUT_S,
};

use super::speed::{SPEED_BANDS, SpeedBand};
use super::tla::{Allotment, DEFAULT_ALLOTMENTS, TLA_CHANNELS};

/// Largest timeout that still fits a `u16` quarter-tick counter [s].
pub const MAX_TIMEOUT_S: u16 = u16::MAX / QUARTERS_PER_SECOND;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete engine configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "vcu-cab-a"
///
/// [vigilance]
/// first_stage_s = 5
///
/// [speed_limit]
/// duration_s = 500
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcuConfig {
    pub shared: SharedConfig,
    pub vigilance: VigilanceTimingConfig,
    pub tla: TlaConfig,
    pub speed_limit: SpeedLimitConfig,
}

impl VcuConfig {
    /// Validate every section. Fails fast on the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.vigilance.validate()?;
        self.tla.validate()?;
        self.speed_limit.validate()?;
        Ok(())
    }
}

// ─── Vigilance Timing ───────────────────────────────────────────────

/// Per-state and per-speed-band timeouts [s].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VigilanceTimingConfig {
    /// NoWarning timeout per speed band, slowest first.
    pub no_warning_s: [u16; SPEED_BANDS],
    /// SecondStageWarning timeout per speed band, slowest first.
    pub second_stage_s: [u16; SPEED_BANDS],
    /// FirstStageWarning timeout.
    pub first_stage_s: u16,
    /// Penalty brake bypass timeout (speed unknown).
    pub brake_no_reset_s: u16,
    /// Hold after the train is confirmed stopped.
    pub train_stopped_s: u16,
    /// Cab-inactive time that permits a penalty reset.
    pub cab_inactive_s: u16,
    /// Radio warning duration in the Depressed vigilance state.
    pub radio_warning_s: u16,
}

impl Default for VigilanceTimingConfig {
    fn default() -> Self {
        Self {
            no_warning_s: NO_WARNING_TIMEOUT_S,
            second_stage_s: SECOND_STAGE_TIMEOUT_S,
            first_stage_s: FIRST_STAGE_TIMEOUT_S,
            brake_no_reset_s: BRAKE_NO_RESET_TIMEOUT_S,
            train_stopped_s: TRAIN_STOPPED_TIMEOUT_S,
            cab_inactive_s: CAB_INACTIVE_TIMEOUT_S,
            radio_warning_s: RADIO_WARNING_TIMEOUT_S,
        }
    }
}

impl VigilanceTimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("first_stage_s", self.first_stage_s)?;
        check_timeout("brake_no_reset_s", self.brake_no_reset_s)?;
        check_timeout("train_stopped_s", self.train_stopped_s)?;
        check_timeout("cab_inactive_s", self.cab_inactive_s)?;
        check_timeout("radio_warning_s", self.radio_warning_s)?;

        check_band_table("no_warning_s", &self.no_warning_s)?;
        check_band_table("second_stage_s", &self.second_stage_s)?;

        for band in SpeedBand::ALL {
            let i = band.index();
            if self.second_stage_s[i] >= self.no_warning_s[i] {
                return Err(ConfigError::ValidationError(format!(
                    "second_stage_s[{band:?}] = {} must be shorter than no_warning_s[{band:?}] = {}",
                    self.second_stage_s[i], self.no_warning_s[i]
                )));
            }
        }
        Ok(())
    }

    /// NoWarning reload for `band` [quarter ticks].
    #[inline]
    pub fn no_warning_ticks(&self, band: SpeedBand) -> u16 {
        to_quarters(self.no_warning_s[band.index()])
    }

    /// SecondStageWarning reload for `band` [quarter ticks].
    #[inline]
    pub fn second_stage_ticks(&self, band: SpeedBand) -> u16 {
        to_quarters(self.second_stage_s[band.index()])
    }
}

fn check_timeout(name: &str, value: u16) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_TIMEOUT_S {
        return Err(ConfigError::ValidationError(format!(
            "{name} = {value} out of range [1, {MAX_TIMEOUT_S}]"
        )));
    }
    Ok(())
}

fn check_band_table(name: &str, table: &[u16; SPEED_BANDS]) -> Result<(), ConfigError> {
    for (band, value) in SpeedBand::ALL.iter().zip(table) {
        check_timeout(&format!("{name}[{band:?}]"), *value)?;
    }
    if table.windows(2).any(|w| w[1] > w[0]) {
        return Err(ConfigError::ValidationError(format!(
            "{name} must not grow with speed: {table:?}"
        )));
    }
    Ok(())
}

/// Seconds → quarter ticks. Callers validate the range first.
#[inline]
pub const fn to_quarters(seconds: u16) -> u16 {
    seconds.saturating_mul(QUARTERS_PER_SECOND)
}

// ─── TLA ────────────────────────────────────────────────────────────

/// Event allotment per TLA channel, in channel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlaConfig {
    pub allotments: [Allotment; TLA_CHANNELS],
}

impl Default for TlaConfig {
    fn default() -> Self {
        Self {
            allotments: DEFAULT_ALLOTMENTS,
        }
    }
}

impl TlaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, allotment) in self.allotments.iter().enumerate() {
            if let Allotment::Limited(n) = allotment {
                if *n == 0 || *n == u8::MAX {
                    return Err(ConfigError::ValidationError(format!(
                        "tla.allotments[{i}] = {n} out of range [1, {}]",
                        u8::MAX - 1
                    )));
                }
            }
        }
        Ok(())
    }
}

// ─── Speed Limit ────────────────────────────────────────────────────

/// 25 km/h speed-limit function timing [s].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedLimitConfig {
    /// Limit duration after the train moves off.
    pub duration_s: u16,
    /// Override refused when this close to expiry.
    pub override_window_s: u16,
}

impl Default for SpeedLimitConfig {
    fn default() -> Self {
        Self {
            duration_s: SPEED_LIMIT_DURATION_S,
            override_window_s: SPEED_LIMIT_OVERRIDE_WINDOW_S,
        }
    }
}

impl SpeedLimitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_s == 0 {
            return Err(ConfigError::ValidationError(
                "speed_limit.duration_s must be > 0".to_string(),
            ));
        }
        if self.override_window_s >= self.duration_s {
            return Err(ConfigError::ValidationError(format!(
                "speed_limit.override_window_s = {} must be shorter than duration_s = {}",
                self.override_window_s, self.duration_s
            )));
        }
        Ok(())
    }
}
