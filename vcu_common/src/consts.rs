//! System-wide constants for the VCU workspace.
//!
//! Single source of truth for the clock divider table and the fixed timing
//! values of the vigilance and speed-limit functions. Configurable tables in
//! [`crate::vigilance::config`] default to these values.

use static_assertions::const_assert_eq;

// ─── Base Clock & Tick Periods ──────────────────────────────────────

/// Base clock frequency [Hz].
pub const BASE_CLOCK_HZ: u64 = 32_768_000;

/// Edge tick period [cycles] = 15.625 µs. Input edge detection rate.
pub const EDGE_PERIOD: u64 = 512;

/// Sample tick period [cycles] = 500 µs. All state machines evaluate here.
pub const SAMPLE_PERIOD: u64 = 16_384;

/// Flash tick period [cycles] = 125 ms. Warning lamp flash phase.
pub const FLASH_PERIOD: u64 = 4_096_000;

/// Quarter tick period [cycles] = 250 ms. Vigilance timer decrement.
pub const QUARTER_PERIOD: u64 = 8_192_000;

/// Half tick period [cycles] = 500 ms. Speed-limit timing and pulse stretch.
pub const HALF_PERIOD: u64 = 16_384_000;

/// Auxiliary 78 ms pulse period [cycles].
pub const AUX_78MS_PERIOD: u64 = 2_555_904;

/// Auxiliary display pulse period [cycles] (≈97.52 kHz).
pub const DISPLAY_PERIOD: u64 = 336;

/// Number of edge ticks reset stays asserted after power-up.
pub const RESET_RELEASE_EDGES: u8 = 2;

const_assert_eq!(SAMPLE_PERIOD % EDGE_PERIOD, 0);
const_assert_eq!(FLASH_PERIOD % SAMPLE_PERIOD, 0);
const_assert_eq!(QUARTER_PERIOD % SAMPLE_PERIOD, 0);
const_assert_eq!(HALF_PERIOD % QUARTER_PERIOD, 0);
const_assert_eq!(AUX_78MS_PERIOD % SAMPLE_PERIOD, 0);
const_assert_eq!(BASE_CLOCK_HZ * 500 / 1_000_000, 16_384);

/// Sample ticks per second.
pub const SAMPLES_PER_SECOND: u32 = (BASE_CLOCK_HZ / SAMPLE_PERIOD) as u32;

/// Quarter ticks per second (vigilance timer resolution).
pub const QUARTERS_PER_SECOND: u16 = 4;

// ─── Acknowledge Button ─────────────────────────────────────────────

/// Continuous hold required for a test-mode request or a stuck-button warning [samples] (3 s).
pub const ACK_HOLD_SAMPLES: u16 = 6_000;

// ─── Vigilance Timing Defaults [s] ──────────────────────────────────

/// NoWarning timeout per speed band, slowest band first.
pub const NO_WARNING_TIMEOUT_S: [u16; 8] = [60, 60, 50, 40, 30, 25, 20, 15];

/// SecondStageWarning timeout per speed band, slowest band first.
pub const SECOND_STAGE_TIMEOUT_S: [u16; 8] = [10, 8, 7, 6, 5, 4, 3, 2];

/// FirstStageWarning timeout (speed independent).
pub const FIRST_STAGE_TIMEOUT_S: u16 = 5;

/// Penalty brake bypass timer when the train cannot be confirmed stopped.
pub const BRAKE_NO_RESET_TIMEOUT_S: u16 = 60;

/// Hold time after the train is confirmed stopped under penalty brake.
pub const TRAIN_STOPPED_TIMEOUT_S: u16 = 10;

/// Cab-inactive time that allows a penalty reset without acknowledge.
pub const CAB_INACTIVE_TIMEOUT_S: u16 = 10;

/// Radio/gateway warning duration after a Depressed-mode timeout.
pub const RADIO_WARNING_TIMEOUT_S: u16 = 10;

/// VCU-reset pulse stretch [samples] (500 ms).
pub const VCU_RESET_PULSE_SAMPLES: u16 = 1_000;

// ─── Speed Limit Defaults [s] ───────────────────────────────────────

/// Speed-limit function duration once the train moves off.
pub const SPEED_LIMIT_DURATION_S: u16 = 500;

/// Override is refused within this many seconds of expiry.
pub const SPEED_LIMIT_OVERRIDE_WINDOW_S: u16 = 30;
