//! Scenario replay.
//!
//! A scenario is a TOML document of `[[phase]]` tables. Each phase holds its
//! input fields constant for `duration_ms` and reports a summary of the
//! outputs at its end.
//!
//! ```toml
//! name = "unattended drive"
//!
//! [[phase]]
//! name = "move off"
//! duration_ms = 2000
//! cab_active = true
//! brake_pressure_high = false
//! digital_zero_speed = false
//! speed_code = 3
//! ```
//!
//! Fields not given in a phase take their [`Inputs::default`] value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vcu_common::vigilance::io::Inputs;
use vcu_common::vigilance::state::{OperatingMode, SpeedLimitState, VigilanceState};

use crate::cycle::Engine;

/// Scenario loading error.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("scenario has no phases")]
    Empty,

    #[error("phase `{0}` has zero duration")]
    ZeroDuration(String),
}

/// One constant-input interval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Phase {
    pub name: String,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub inputs: Inputs,
}

/// Ordered list of phases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "phase", default)]
    pub phases: Vec<Phase>,
}

/// Output summary at the end of a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub phase: String,
    pub end_cycle: u64,
    pub mode: Option<OperatingMode>,
    pub vigilance_state: VigilanceState,
    pub speed_limit_state: SpeedLimitState,
    pub penalty_brake: bool,
    pub visible_warning: bool,
    pub buzzer: bool,
    pub radio_warning: bool,
    pub speed_limit_exceeded: bool,
    /// Transitions committed during the phase.
    pub transitions: u64,
}

impl Scenario {
    /// Read and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a scenario document.
    pub fn from_toml_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(content)?;
        if scenario.phases.is_empty() {
            return Err(ScenarioError::Empty);
        }
        if let Some(phase) = scenario.phases.iter().find(|p| p.duration_ms == 0) {
            return Err(ScenarioError::ZeroDuration(phase.name.clone()));
        }
        Ok(scenario)
    }

    /// Total scenario length.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.phases.iter().map(|p| p.duration_ms).sum())
    }

    /// Run every phase through `engine`, in order.
    pub fn run(&self, engine: &mut Engine) -> Vec<PhaseSummary> {
        self.phases
            .iter()
            .map(|phase| {
                let before = engine.stats().transitions;
                let out = engine.run_for(&phase.inputs, Duration::from_millis(phase.duration_ms));
                PhaseSummary {
                    phase: phase.name.clone(),
                    end_cycle: engine.cycle(),
                    mode: out.operating_mode(),
                    vigilance_state: out.vigilance_state,
                    speed_limit_state: out.speed_limit_state,
                    penalty_brake: out.penalty_brake(),
                    visible_warning: out.visible_warning,
                    buzzer: out.buzzer,
                    radio_warning: out.radio_warning,
                    speed_limit_exceeded: out.speed_limit_exceeded_a,
                    transitions: engine.stats().transitions - before,
                }
            })
            .collect()
    }
}
