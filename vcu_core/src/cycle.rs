//! Deterministic cycle engine: evaluate → commit.
//!
//! The engine owns one register set per component. A step evaluates every
//! component's next value from the current snapshot only, then commits all
//! of them together, so no component ever sees another's same-cycle update.
//!
//! ## Fast-Forward
//!
//! Every consumed tick is an edge tick and every state machine runs on
//! sample ticks. When reset is released and the edge sampler is quiescent,
//! [`Engine::advance`] jumps straight to the next sample tick; skipped
//! cycles are provably no-ops, so `advance(n)` equals `n` calls to
//! [`Engine::step`].
//!
//! ## Logging
//!
//! Commits are compared against the previous snapshot and every transition
//! is logged through `tracing` and recorded in the [`TransitionJournal`].

use std::time::Duration;

use tracing::{debug, error, info, warn};

use vcu_common::config::ConfigError;
use vcu_common::consts::{BASE_CLOCK_HZ, EDGE_PERIOD, SAMPLE_PERIOD};
use vcu_common::vigilance::config::VcuConfig;
use vcu_common::vigilance::io::{Inputs, Outputs, TickFlags};
use vcu_common::vigilance::speed::SpeedBand;
use vcu_common::vigilance::state::OperatingMode;

use crate::config::Timing;
use crate::decoder::{DecoderContext, ModeRequestDecoder};
use crate::journal::{JournalEntry, TransitionJournal};
use crate::sampler::EdgeSampler;
use crate::state::arbiter::{ArbiterInputs, ModeArbiter};
use crate::state::speed_limit::{SpeedLimitContext, SpeedLimitFsm};
use crate::state::vigilance::{VigilanceContext, VigilanceFsm};
use crate::tick::{ResetSync, TickGenerator};

// ─── Engine Statistics ──────────────────────────────────────────────

/// Counters updated on every committed sample. O(1), no allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Sample ticks evaluated.
    pub samples: u64,
    /// Committed state changes across all machines.
    pub transitions: u64,
    /// Rising edges of the penalty brake command.
    pub penalty_applications: u64,
}

// ─── Engine ─────────────────────────────────────────────────────────

/// The complete vigilance unit core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    timing: Timing,
    ticks: TickGenerator,
    reset: ResetSync,
    sampler: EdgeSampler,
    decoder: ModeRequestDecoder,
    arbiter: ModeArbiter,
    vigilance: VigilanceFsm,
    speed_limit: SpeedLimitFsm,
    journal: TransitionJournal,
    stats: EngineStats,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_timing(Timing::FACTORY)
    }
}

impl Engine {
    /// Engine at power-up with a validated configuration.
    pub fn new(config: &VcuConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_timing(Timing::from_config(config)?))
    }

    /// Engine at power-up with already converted timing.
    pub fn with_timing(timing: Timing) -> Self {
        Self {
            timing,
            ticks: TickGenerator::new(),
            reset: ResetSync::new(),
            sampler: EdgeSampler::new(),
            decoder: ModeRequestDecoder::new(),
            arbiter: ModeArbiter::new(),
            vigilance: VigilanceFsm::new(&timing),
            speed_limit: SpeedLimitFsm::new(),
            journal: TransitionJournal::new(),
            stats: EngineStats::default(),
        }
    }

    // ── Accessors ──

    #[inline]
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Current base-clock cycle.
    #[inline]
    pub const fn cycle(&self) -> u64 {
        self.ticks.cycle()
    }

    #[inline]
    pub const fn in_reset(&self) -> bool {
        self.reset.in_reset()
    }

    /// Committed operating mode.
    #[inline]
    pub const fn mode(&self) -> OperatingMode {
        self.arbiter.mode()
    }

    #[inline]
    pub const fn arbiter(&self) -> &ModeArbiter {
        &self.arbiter
    }

    #[inline]
    pub const fn decoder(&self) -> &ModeRequestDecoder {
        &self.decoder
    }

    #[inline]
    pub const fn vigilance(&self) -> &VigilanceFsm {
        &self.vigilance
    }

    #[inline]
    pub const fn speed_limit(&self) -> &SpeedLimitFsm {
        &self.speed_limit
    }

    #[inline]
    pub const fn journal(&self) -> &TransitionJournal {
        &self.journal
    }

    #[inline]
    pub const fn stats(&self) -> &EngineStats {
        &self.stats
    }

    // ── Stepping ──

    /// Advance exactly one base-clock cycle.
    pub fn step(&self, inputs: &Inputs) -> (Self, Outputs) {
        let mut next = self.clone();
        next.tick_to(inputs, self.ticks.cycle() + 1);
        let outputs = next.outputs();
        (next, outputs)
    }

    /// Advance `cycles` base-clock cycles with constant inputs.
    pub fn advance(&mut self, inputs: &Inputs, cycles: u64) -> Outputs {
        let target = self.ticks.cycle().saturating_add(cycles);
        loop {
            let event = self.ticks.cycle().saturating_add(self.cycles_to_next_event(inputs));
            if event > target {
                break;
            }
            self.tick_to(inputs, event);
        }
        self.ticks = self.ticks.advanced(target - self.ticks.cycle());
        self.outputs()
    }

    /// Advance by wall-clock `duration` (truncated to whole cycles).
    pub fn run_for(&mut self, inputs: &Inputs, duration: Duration) -> Outputs {
        let cycles = duration.as_nanos() * u128::from(BASE_CLOCK_HZ) / 1_000_000_000;
        self.advance(inputs, u64::try_from(cycles).unwrap_or(u64::MAX))
    }

    /// Advance through the next `samples` sample ticks, stopping on the last one.
    pub fn run_samples(&mut self, inputs: &Inputs, samples: u64) -> Outputs {
        if samples == 0 {
            return self.outputs();
        }
        let cycles = self.ticks.cycles_until(SAMPLE_PERIOD) + (samples - 1) * SAMPLE_PERIOD;
        self.advance(inputs, cycles)
    }

    /// Outputs of the committed snapshot.
    pub fn outputs(&self) -> Outputs {
        let mode = self.arbiter.mode();
        let v = self.vigilance.outputs(mode);
        let s = self.speed_limit.outputs(mode);
        Outputs {
            mode: mode.bits(),
            halt_timers: self.arbiter.halt_timers(),
            visible_warning: v.visible_warning(),
            warning_lamp: v.lamp,
            flashing_light: v.flashing,
            buzzer: v.buzzer,
            penalty_brake_a: v.penalty_brake,
            penalty_brake_b: v.penalty_brake,
            radio_warning: v.radio_warning,
            vcu_reset: v.vcu_reset,
            inhibits: v.inhibits,
            first_stage_warning: v.first_stage,
            second_stage_warning: v.second_stage,
            speed_limit_test: v.speed_limit_test,
            speed_limit_overridden: s.overridden,
            speed_limit_exceeded_a: s.exceeded,
            speed_limit_exceeded_b: s.exceeded,
            speed_limit_status: s.status,
            speed_limit_rearm: s.rearm,
            zero_speed: self.decoder.requests().zero_speed,
            vigilance_state: self.vigilance.state(),
            speed_limit_state: self.speed_limit.state(),
            in_reset: self.reset.in_reset(),
            ticks: self.ticks.flags(),
        }
    }

    /// Cycles until the next cycle that can change any register.
    fn cycles_to_next_event(&self, inputs: &Inputs) -> u64 {
        if self.reset.in_reset() || !self.sampler.is_quiescent(inputs) {
            self.ticks.cycles_until(EDGE_PERIOD)
        } else {
            self.ticks.cycles_until(SAMPLE_PERIOD)
        }
    }

    /// Evaluate and commit the cycle `cycle`.
    fn tick_to(&mut self, inputs: &Inputs, cycle: u64) {
        let ticks = self.ticks.advanced(cycle - self.ticks.cycle());
        let flags = ticks.flags();
        self.ticks = ticks;
        if !flags.any_consumed() {
            return;
        }
        let in_reset = self.reset.in_reset();

        let reset = self.reset.step(&flags);
        let sampler = self.sampler.step(inputs, &flags, in_reset);

        if flags.sample && !in_reset {
            self.evaluate_sample(inputs, &flags);
        }
        if in_reset && !reset.in_reset() {
            debug!(cycle, "reset released");
        }
        self.reset = reset;
        self.sampler = sampler;
    }

    /// Evaluate every sample-rate component from the snapshot, then commit.
    fn evaluate_sample(&mut self, inputs: &Inputs, flags: &TickFlags) {
        let events = self.sampler.events();
        let requests = self.decoder.requests();
        let mode = self.arbiter.mode();
        let vig_out = self.vigilance.outputs(mode);
        let band = SpeedBand::from_code(inputs.speed_code);

        let decoder = self.decoder.step(
            inputs,
            DecoderContext {
                mode,
                test_exit: self.vigilance.test_complete(),
            },
        );
        let arbiter = self.arbiter.step(&ArbiterInputs {
            requests,
            inhibits: vig_out.inhibits,
            major_fault: inputs.major_fault,
        });
        let vigilance = self.vigilance.step(
            &VigilanceContext {
                mode,
                halt: self.arbiter.halt_timers(),
                zero_speed: requests.zero_speed,
                ack_held: requests.ack_held,
                events,
                band,
                analog_speed_error: inputs.analog_speed_error,
                no_power: inputs.no_power,
                cab_active: inputs.cab_active,
                ticks: *flags,
            },
            &self.timing,
        );
        let speed_limit = self.speed_limit.step(
            &SpeedLimitContext {
                mode,
                major_fault: inputs.major_fault,
                zero_speed: requests.zero_speed,
                band,
                events,
                exceed_test: inputs.speed_limit_exceed_test,
                vigilance_test: vig_out.speed_limit_test,
                ticks: *flags,
            },
            &self.timing,
        );

        self.record_transitions(&arbiter, &vigilance, &speed_limit);

        self.decoder = decoder;
        self.arbiter = arbiter;
        self.vigilance = vigilance;
        self.speed_limit = speed_limit;
        self.stats.samples += 1;
    }

    /// Log and journal every change between the snapshot and the next values.
    fn record_transitions(
        &mut self,
        arbiter: &ModeArbiter,
        vigilance: &VigilanceFsm,
        speed_limit: &SpeedLimitFsm,
    ) {
        let cycle = self.ticks.cycle();

        let (from, to) = (self.arbiter.mode(), arbiter.mode());
        if from != to {
            if to == OperatingMode::MajorFault {
                error!(cycle, ?from, "major fault, penalty brakes forced");
            } else {
                info!(cycle, ?from, ?to, "operating mode changed");
            }
            self.journal.record(JournalEntry::mode(cycle, from, to));
            self.stats.transitions += 1;
        }

        let (from, to) = (self.vigilance.state(), vigilance.state());
        if from != to {
            info!(cycle, ?from, ?to, "vigilance state changed");
            self.journal.record(JournalEntry::vigilance(cycle, from, to));
            self.stats.transitions += 1;
        }

        let braking = self.vigilance.outputs(self.arbiter.mode()).penalty_brake;
        if !braking && vigilance.outputs(arbiter.mode()).penalty_brake {
            warn!(cycle, state = ?vigilance.state(), mode = ?arbiter.mode(), "penalty brake applied");
            self.stats.penalty_applications += 1;
        }

        let (from, to) = (self.speed_limit.state(), speed_limit.state());
        if from != to {
            debug!(cycle, ?from, ?to, "speed-limit state changed");
            self.journal.record(JournalEntry::speed_limit(cycle, from, to));
            self.stats.transitions += 1;
        }
    }
}
