//! Prelude module for common re-exports.
//!
//! ```rust
//! use vcu_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::vigilance::config::{SpeedLimitConfig, TlaConfig, VcuConfig, VigilanceTimingConfig};

// ─── Clock ──────────────────────────────────────────────────────────
pub use crate::consts::{BASE_CLOCK_HZ, SAMPLE_PERIOD};

// ─── Signals & State ────────────────────────────────────────────────
pub use crate::vigilance::io::{Inhibits, Inputs, Outputs, TickFlags};
pub use crate::vigilance::speed::SpeedBand;
pub use crate::vigilance::state::{ModeBits, OperatingMode, SpeedLimitState, VigilanceState};
pub use crate::vigilance::tla::{Allotment, TlaChannels};

/// Sample tick period as Duration (500 µs).
pub const SAMPLE_TIME: Duration = Duration::from_micros(500);
