//! Operating-mode arbitration FSM.
//!
//! Exactly one mode is authoritative after the first sample. Priority on
//! every sample tick:
//!
//! 1. `MajorFault` is terminal.
//! 2. `Idle` advances to `Normal`.
//! 3. `Test` holds while the request persists, then falls back to `Suppressed`.
//! 4. `Suppressed` enters `Test` on request, holds while suppression is
//!    requested, and otherwise returns to the mode it interrupted.
//! 5. `Depressed` / `Normal` move to `Suppressed` or between each other.

use vcu_common::vigilance::io::Inhibits;
use vcu_common::vigilance::state::OperatingMode;

use crate::decoder::ModeRequests;

/// Everything the arbiter reads on a sample tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArbiterInputs {
    pub requests: ModeRequests,
    pub inhibits: Inhibits,
    /// Persistent fault from output readback.
    pub major_fault: bool,
}

/// Mode register plus the history register used to leave `Suppressed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeArbiter {
    mode: OperatingMode,
    history: OperatingMode,
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeArbiter {
    pub const fn new() -> Self {
        Self {
            mode: OperatingMode::Idle,
            history: OperatingMode::Normal,
        }
    }

    /// Committed operating mode.
    #[inline]
    pub const fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Mode restored when suppression ends.
    #[inline]
    pub const fn history(&self) -> OperatingMode {
        self.history
    }

    /// Vigilance timers frozen.
    #[inline]
    pub const fn halt_timers(&self) -> bool {
        self.mode.halts_timers()
    }

    /// Next arbiter state for one sample tick.
    pub fn step(&self, input: &ArbiterInputs) -> Self {
        use OperatingMode::*;

        let req = &input.requests;
        let inh = &input.inhibits;

        if self.mode == MajorFault || input.major_fault {
            return Self {
                mode: MajorFault,
                history: self.history,
            };
        }

        let suppress = (req.suppression && !inh.no_suppress) || inh.no_normal_return;
        let (mode, history) = match self.mode {
            Idle => (Normal, self.history),
            Test if req.test_mode => (Test, self.history),
            Test => (Suppressed, self.history),
            Suppressed if req.test_mode && !inh.no_test => (Test, self.history),
            Suppressed if req.suppression || inh.no_normal_return => (Suppressed, self.history),
            Suppressed => (self.history, self.history),
            Depressed | Normal if suppress => (Suppressed, self.mode),
            Depressed if req.depression => (Depressed, self.history),
            Depressed => (Normal, self.history),
            Normal if req.depression && !inh.no_suppress => (Depressed, self.history),
            Normal => (Normal, self.history),
            MajorFault => (MajorFault, self.history),
        };
        Self { mode, history }
    }
}
