//! 25 km/h speed-limit FSM.
//!
//! Requested by a falling edge on the request line, the function waits for
//! the train to stop and move off again, then limits speed for a fixed time.
//! The exceeded relays follow a hysteresis latch on the speed band that is
//! independent of the state; only the operating mode gates them.

use vcu_common::vigilance::io::TickFlags;
use vcu_common::vigilance::speed::SpeedBand;
use vcu_common::vigilance::state::{OperatingMode, SpeedLimitState};

use crate::config::Timing;
use crate::sampler::SampledEvents;

/// Everything the speed-limit FSM reads on a sample tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLimitContext {
    /// Committed operating mode.
    pub mode: OperatingMode,
    /// Persistent fault input.
    pub major_fault: bool,
    /// Decoder's registered zero-speed flag.
    pub zero_speed: bool,
    pub band: SpeedBand,
    pub events: SampledEvents,
    /// Relay test request input.
    pub exceed_test: bool,
    /// Vigilance FSM is in its SpeedLimitTest step.
    pub vigilance_test: bool,
    pub ticks: TickFlags,
}

/// Outputs of the speed-limit FSM after mode gating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpeedLimitOutputs {
    /// Both relay channels carry the same value.
    pub exceeded: bool,
    pub status: bool,
    pub overridden: bool,
    pub rearm: bool,
}

/// Speed-limit FSM registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLimitFsm {
    state: SpeedLimitState,
    /// Remaining limit time [s].
    timer: u16,
    /// Odd half tick seen; the next one completes a second.
    half_second: bool,
    override_pending: bool,
    overridden: bool,
    /// Left Active for a re-arm cycle.
    rearming: bool,
    above_limit: bool,
    relay_test: bool,
}

impl Default for SpeedLimitFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedLimitFsm {
    pub const fn new() -> Self {
        Self {
            state: SpeedLimitState::Idle,
            timer: 0,
            half_second: false,
            override_pending: false,
            overridden: false,
            rearming: false,
            above_limit: false,
            relay_test: false,
        }
    }

    #[inline]
    pub const fn state(&self) -> SpeedLimitState {
        self.state
    }

    /// Remaining limit time [s].
    #[inline]
    pub const fn timer(&self) -> u16 {
        self.timer
    }

    /// Speed hysteresis latch.
    #[inline]
    pub const fn above_limit(&self) -> bool {
        self.above_limit
    }

    /// Next FSM state for one sample tick.
    pub fn step(&self, ctx: &SpeedLimitContext, timing: &Timing) -> Self {
        use SpeedLimitState::*;

        let mut next = *self;

        next.above_limit = if ctx.band.exceeds_limit() {
            true
        } else if ctx.band.is_lowest() {
            false
        } else {
            self.above_limit
        };
        next.relay_test = ctx.exceed_test || ctx.vigilance_test;

        if ctx.ticks.half {
            next.overridden = self.override_pending;
            next.override_pending = false;
        }

        if ctx.major_fault || ctx.mode == OperatingMode::MajorFault || self.state == Fault {
            next.state = Fault;
            next.override_pending = false;
            return next;
        }

        let blocked = matches!(ctx.mode, OperatingMode::Suppressed | OperatingMode::Depressed);
        let request = ctx.events.request_fall && !blocked;
        let valid_override = ctx.events.override_press
            && !blocked
            && self.state == Active
            && self.timer > timing.override_window_s;

        match self.state {
            Idle if request => next.state = WaitZeroSpeed,
            WaitZeroSpeed if ctx.zero_speed => next.state = WaitNotZeroSpeed,
            WaitNotZeroSpeed if !ctx.zero_speed => next.state = BetweenActive,
            BetweenActive => {
                next.state = Active;
                next.timer = timing.speed_limit_s;
                next.half_second = false;
                next.rearming = false;
            }
            Active if valid_override => {
                next.state = Idle;
                next.override_pending = true;
            }
            Active if request => {
                next.state = WaitZeroSpeed;
                next.rearming = true;
            }
            Active if self.timer == 0 => next.state = Idle,
            Active if ctx.ticks.half => {
                if self.half_second {
                    next.timer = self.timer.saturating_sub(1);
                }
                next.half_second = !self.half_second;
            }
            _ => {}
        }
        next
    }

    /// Outputs for the committed state under `mode`.
    pub fn outputs(&self, mode: OperatingMode) -> SpeedLimitOutputs {
        let exceeded = if mode == OperatingMode::MajorFault || self.state == SpeedLimitState::Fault {
            true
        } else if mode.releases_brakes() {
            false
        } else if mode == OperatingMode::Test {
            self.relay_test
        } else {
            self.above_limit
        };
        let rearm = self.state == SpeedLimitState::BetweenActive && self.rearming;
        SpeedLimitOutputs {
            exceeded,
            // Drops for the re-arm sample so the display sees a fresh limit.
            status: self.state.is_engaged() && !rearm,
            overridden: self.overridden,
            rearm,
        }
    }
}
