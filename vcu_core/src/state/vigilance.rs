//! Vigilance timing FSM.
//!
//! Escalates from NoWarning through two warning stages to a penalty brake
//! when the operator shows no activity. Evaluated once per sample tick from
//! the committed snapshot; the result is committed with every other
//! component.
//!
//! Evaluation order:
//! 1. MajorFault freezes the state.
//! 2. Leaving Test restores the `(state, timer)` pair held before entry.
//! 3. Test mode steps the maintenance sequence on acknowledge presses.
//! 4. Suppressed forces NoWarning (except SpeedLimitTest).
//! 5. Otherwise the escalation table applies.

use vcu_common::consts::VCU_RESET_PULSE_SAMPLES;
use vcu_common::vigilance::io::{Inhibits, TickFlags};
use vcu_common::vigilance::speed::SpeedBand;
use vcu_common::vigilance::state::{OperatingMode, VigilanceState};

use crate::config::Timing;
use crate::sampler::SampledEvents;

use super::timer::TimeoutTimer;
use super::tla::TlaCounters;

// ─── Context & Outputs ──────────────────────────────────────────────

/// Everything the vigilance FSM reads on a sample tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VigilanceContext {
    /// Committed operating mode.
    pub mode: OperatingMode,
    /// Arbiter halt flag.
    pub halt: bool,
    /// Decoder's registered zero-speed flag.
    pub zero_speed: bool,
    /// Decoder's registered 3 s hold flag.
    pub ack_held: bool,
    /// Latched edges consumed on this sample.
    pub events: SampledEvents,
    /// Current speed band (invalid code ⇒ Overspeed).
    pub band: SpeedBand,
    pub analog_speed_error: bool,
    pub no_power: bool,
    pub cab_active: bool,
    pub ticks: TickFlags,
}

/// Moore outputs of the vigilance FSM after mode gating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VigilanceOutputs {
    pub flashing: bool,
    pub solid: bool,
    /// Lamp drive (solid, or flashing in the on phase).
    pub lamp: bool,
    pub buzzer: bool,
    pub penalty_brake: bool,
    pub radio_warning: bool,
    pub vcu_reset: bool,
    pub first_stage: bool,
    pub second_stage: bool,
    pub speed_limit_test: bool,
    pub inhibits: Inhibits,
}

impl VigilanceOutputs {
    /// Lamp lit in either mode.
    #[inline]
    pub const fn visible_warning(&self) -> bool {
        self.flashing || self.solid
    }
}

/// Result of the transition function.
#[derive(Debug, Clone, Copy)]
struct Decision {
    state: VigilanceState,
    timer: TimeoutTimer,
    test_complete: bool,
}

impl Decision {
    const fn to(state: VigilanceState, timer: TimeoutTimer) -> Self {
        Self {
            state,
            timer,
            test_complete: false,
        }
    }
}

// ─── State Machine ──────────────────────────────────────────────────

/// Vigilance FSM registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VigilanceFsm {
    state: VigilanceState,
    timer: TimeoutTimer,
    cab_timer: TimeoutTimer,
    counters: TlaCounters,
    prev_mode: OperatingMode,
    held_state: VigilanceState,
    held_timer: TimeoutTimer,
    flash_on: bool,
    vcu_reset: u16,
    test_complete: bool,
    tla_activity: bool,
}

impl VigilanceFsm {
    /// Power-up registers.
    pub fn new(timing: &Timing) -> Self {
        let timer = TimeoutTimer::loaded(timing.no_warning_for(SpeedBand::Below3));
        Self {
            state: VigilanceState::Idle,
            timer,
            cab_timer: TimeoutTimer::loaded(timing.cab_inactive),
            counters: TlaCounters::full(&timing.allotments),
            prev_mode: OperatingMode::Idle,
            held_state: VigilanceState::Idle,
            held_timer: timer,
            flash_on: false,
            vcu_reset: 0,
            test_complete: false,
            tla_activity: false,
        }
    }

    #[inline]
    pub const fn state(&self) -> VigilanceState {
        self.state
    }

    /// Remaining time in the current state [quarter ticks].
    #[inline]
    pub const fn timer(&self) -> TimeoutTimer {
        self.timer
    }

    #[inline]
    pub const fn cab_timer(&self) -> TimeoutTimer {
        self.cab_timer
    }

    #[inline]
    pub const fn counters(&self) -> &TlaCounters {
        &self.counters
    }

    /// `(state, timer)` restored when Test ends.
    #[inline]
    pub const fn held(&self) -> (VigilanceState, TimeoutTimer) {
        (self.held_state, self.held_timer)
    }

    /// Test sequence finished on the last sample.
    #[inline]
    pub const fn test_complete(&self) -> bool {
        self.test_complete
    }

    /// A counted TLA event was seen on the last sample.
    #[inline]
    pub const fn tla_activity(&self) -> bool {
        self.tla_activity
    }

    /// Next FSM state for one sample tick.
    pub fn step(&self, ctx: &VigilanceContext, timing: &Timing) -> Self {
        let mut next = *self;

        if ctx.ticks.flash {
            next.flash_on = !self.flash_on;
        }

        next.cab_timer = if ctx.cab_active {
            TimeoutTimer::loaded(timing.cab_inactive)
        } else {
            self.cab_timer.ticked(ctx.ticks.quarter, ctx.halt)
        };

        let frozen = ctx.mode == OperatingMode::Test;
        let activity = !frozen && !self.counters.counted(ctx.events.tla, &timing.allotments).is_empty();
        next.counters = self.counters.next(
            ctx.events.tla,
            &timing.allotments,
            ctx.mode == OperatingMode::Suppressed || ctx.events.ack_press,
            frozen,
        );
        next.tla_activity = activity;

        let decision = self.transition(ctx, timing, activity);
        next.state = decision.state;
        next.timer = decision.timer;
        next.test_complete = decision.test_complete;

        if ctx.mode != OperatingMode::Test {
            next.held_state = next.state;
            next.held_timer = next.timer;
        }

        next.vcu_reset = if ctx.mode == OperatingMode::Suppressed {
            0
        } else if next.state == VigilanceState::NoWarning
            && !matches!(self.state, VigilanceState::NoWarning | VigilanceState::Idle)
        {
            VCU_RESET_PULSE_SAMPLES
        } else {
            self.vcu_reset.saturating_sub(1)
        };

        next.prev_mode = ctx.mode;
        next
    }

    /// Timer value loaded on entry to `state`.
    fn reload(&self, state: VigilanceState, band: SpeedBand, timing: &Timing) -> TimeoutTimer {
        use VigilanceState::*;
        TimeoutTimer::loaded(match state {
            NoWarning | Idle => timing.no_warning_for(band),
            FirstStageWarning => timing.first_stage,
            SecondStageWarning => timing.second_stage_for(band),
            BrakeNoReset => timing.brake_no_reset,
            BrakeNoResetError => self.timer.remaining(),
            TrainStoppedNoReset => timing.train_stopped,
            Depressed => timing.radio_warning,
            SpeedLimitTest | Normal => 0,
        })
    }

    fn transition(&self, ctx: &VigilanceContext, timing: &Timing, activity: bool) -> Decision {
        use VigilanceState::*;

        let band = ctx.band;
        let press = ctx.events.ack_press;
        let enter = |state| Decision::to(state, self.reload(state, band, timing));
        let ticked = self.timer.ticked(ctx.ticks.quarter, ctx.halt);
        let stay = Decision::to(self.state, ticked);

        if ctx.mode == OperatingMode::MajorFault {
            return Decision::to(self.state, self.timer);
        }
        if self.prev_mode == OperatingMode::Test && ctx.mode != OperatingMode::Test {
            return Decision::to(self.held_state, self.held_timer);
        }
        if ctx.mode == OperatingMode::Test {
            return self.test_sequence(ctx, timing, press);
        }
        if ctx.mode == OperatingMode::Suppressed && self.state != SpeedLimitTest {
            return enter(NoWarning);
        }

        let expired = self.timer.expired();
        match self.state {
            Idle => enter(NoWarning),
            NoWarning if activity || press => enter(NoWarning),
            NoWarning if expired || ctx.ack_held => enter(FirstStageWarning),
            NoWarning => Decision::to(NoWarning, ticked.clamped(timing.no_warning_for(band))),
            FirstStageWarning if activity || press => enter(NoWarning),
            FirstStageWarning if expired => enter(SecondStageWarning),
            SecondStageWarning if activity || press => enter(NoWarning),
            SecondStageWarning if expired && ctx.mode == OperatingMode::Depressed => enter(Depressed),
            SecondStageWarning if expired && ctx.mode == OperatingMode::Normal => enter(BrakeNoReset),
            SecondStageWarning => {
                Decision::to(SecondStageWarning, ticked.clamped(timing.second_stage_for(band)))
            }
            BrakeNoReset if ctx.analog_speed_error => Decision::to(BrakeNoResetError, ticked),
            BrakeNoReset if ctx.zero_speed && band.is_lowest() => enter(TrainStoppedNoReset),
            BrakeNoReset | BrakeNoResetError | TrainStoppedNoReset if expired => enter(Normal),
            Normal | Depressed if ctx.no_power && (self.cab_timer.expired() || press) => {
                enter(NoWarning)
            }
            Depressed if ctx.mode == OperatingMode::Normal => enter(BrakeNoReset),
            _ => stay,
        }
    }

    fn test_sequence(&self, ctx: &VigilanceContext, timing: &Timing, press: bool) -> Decision {
        use VigilanceState::*;

        let entering = self.prev_mode != OperatingMode::Test;
        let enter = |state| Decision::to(state, self.reload(state, ctx.band, timing));
        match self.state {
            Normal if entering => enter(FirstStageWarning),
            NoWarning if press => enter(FirstStageWarning),
            FirstStageWarning if press => enter(SecondStageWarning),
            SecondStageWarning if press => enter(SpeedLimitTest),
            SpeedLimitTest if press => enter(Normal),
            Normal if press => Decision {
                state: Normal,
                timer: self.timer,
                test_complete: true,
            },
            _ => Decision::to(self.state, self.timer.ticked(ctx.ticks.quarter, ctx.halt)),
        }
    }

    /// Outputs for the committed state under `mode`.
    pub fn outputs(&self, mode: OperatingMode) -> VigilanceOutputs {
        use VigilanceState::*;

        let s = self.state;
        let mut flashing = s.flashes();
        let mut solid = s.solid_lamp();
        let mut brake = s.applies_brake();
        match mode {
            OperatingMode::MajorFault => {
                brake = true;
                solid = true;
                flashing = false;
            }
            m if m.releases_brakes() => brake = false,
            _ => {}
        }

        VigilanceOutputs {
            flashing,
            solid,
            lamp: solid || (flashing && self.flash_on),
            buzzer: s == SecondStageWarning,
            penalty_brake: brake,
            radio_warning: s == Normal || (s == Depressed && !self.timer.expired()),
            vcu_reset: self.vcu_reset > 0 && mode != OperatingMode::Suppressed,
            first_stage: s == FirstStageWarning,
            second_stage: s == SecondStageWarning,
            speed_limit_test: s == SpeedLimitTest,
            inhibits: Inhibits {
                no_test: mode != OperatingMode::Suppressed,
                no_suppress: s.blocks_suppression(),
                no_normal_return: s == SpeedLimitTest,
            },
        }
    }
}
