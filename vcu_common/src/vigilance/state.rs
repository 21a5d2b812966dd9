//! State enums for the vigilance unit.
//!
//! All enums use `#[repr(u8)]` for a compact diagnostic encoding and carry a
//! `from_u8` decoder that returns `None` for unknown values. The operating
//! mode additionally has a one-hot [`ModeBits`] encoding used on the output
//! boundary.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ─── Operating Mode ─────────────────────────────────────────────────

/// Authoritative operating mode produced by the arbitration FSM.
///
/// `Idle` only exists between reset and the first sample tick.
/// `MajorFault` is terminal until an external reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperatingMode {
    /// Power-up state, advances to `Normal` on the first sample.
    Idle = 0,
    /// Persistent fault: penalty brakes forced, timers halted.
    MajorFault = 1,
    /// Maintenance test sequence stepped by the acknowledge button.
    Test = 2,
    /// Inhibited operation (CBTC/HCS in control).
    Depressed = 3,
    /// Vigilance inactive (cab inactive, driverless, or stopped with brakes applied).
    Suppressed = 4,
    /// Full vigilance enforcement.
    Normal = 5,
}

impl OperatingMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::MajorFault),
            2 => Some(Self::Test),
            3 => Some(Self::Depressed),
            4 => Some(Self::Suppressed),
            5 => Some(Self::Normal),
            _ => None,
        }
    }

    /// One-hot encoding. `Idle` encodes to the empty set.
    #[inline]
    pub const fn bits(self) -> ModeBits {
        match self {
            Self::Idle => ModeBits::empty(),
            Self::MajorFault => ModeBits::MAJOR_FAULT,
            Self::Test => ModeBits::TEST,
            Self::Depressed => ModeBits::DEPRESSED,
            Self::Suppressed => ModeBits::SUPPRESSED,
            Self::Normal => ModeBits::NORMAL,
        }
    }

    /// Whether vigilance timers are frozen in this mode.
    #[inline]
    pub const fn halts_timers(self) -> bool {
        matches!(self, Self::MajorFault | Self::Test)
    }

    /// Whether penalty brakes are released regardless of the vigilance state.
    #[inline]
    pub const fn releases_brakes(self) -> bool {
        matches!(self, Self::Suppressed | Self::Depressed)
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Idle
    }
}

bitflags! {
    /// One-hot operating mode code on the output boundary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModeBits: u8 {
        const NORMAL      = 0x01;
        const SUPPRESSED  = 0x02;
        const DEPRESSED   = 0x04;
        const TEST        = 0x08;
        const MAJOR_FAULT = 0x10;
    }
}

impl ModeBits {
    /// Decode a one-hot code. Any value with zero or several bits set is `None`.
    pub fn decode(self) -> Option<OperatingMode> {
        const TABLE: [OperatingMode; 5] = [
            OperatingMode::Normal,
            OperatingMode::Suppressed,
            OperatingMode::Depressed,
            OperatingMode::Test,
            OperatingMode::MajorFault,
        ];
        TABLE.into_iter().find(|mode| mode.bits() == self)
    }

    /// Exactly one mode bit is set.
    #[inline]
    pub fn is_one_hot(self) -> bool {
        self.bits().count_ones() == 1
    }
}

impl Default for ModeBits {
    fn default() -> Self {
        Self::empty()
    }
}

// ─── Vigilance State ────────────────────────────────────────────────

/// Operator alertness stage tracked by the vigilance FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VigilanceState {
    /// Operator considered alert; timer running.
    NoWarning = 0,
    /// Flashing lamp.
    FirstStageWarning = 1,
    /// Flashing lamp and buzzer.
    SecondStageWarning = 2,
    /// Test sequence step exercising the speed-limit relays.
    SpeedLimitTest = 3,
    /// Penalty brake applied, waiting for the train to stop.
    BrakeNoReset = 4,
    /// Penalty brake applied, speed unknown; bypass timer only.
    BrakeNoResetError = 5,
    /// Penalty brake applied, train stopped.
    TrainStoppedNoReset = 6,
    /// Penalty brake applied and latched until reset.
    Normal = 7,
    /// Timeout while in Depressed mode; radio warning issued.
    Depressed = 8,
    /// Boot state.
    Idle = 9,
}

impl VigilanceState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoWarning),
            1 => Some(Self::FirstStageWarning),
            2 => Some(Self::SecondStageWarning),
            3 => Some(Self::SpeedLimitTest),
            4 => Some(Self::BrakeNoReset),
            5 => Some(Self::BrakeNoResetError),
            6 => Some(Self::TrainStoppedNoReset),
            7 => Some(Self::Normal),
            8 => Some(Self::Depressed),
            9 => Some(Self::Idle),
            _ => None,
        }
    }

    /// States in which the penalty brake is commanded.
    #[inline]
    pub const fn applies_brake(self) -> bool {
        matches!(
            self,
            Self::BrakeNoReset | Self::BrakeNoResetError | Self::TrainStoppedNoReset | Self::Normal
        )
    }

    /// States that must not be interrupted by Suppressed mode.
    #[inline]
    pub const fn blocks_suppression(self) -> bool {
        matches!(
            self,
            Self::BrakeNoReset
                | Self::BrakeNoResetError
                | Self::TrainStoppedNoReset
                | Self::Normal
                | Self::Depressed
        )
    }

    /// States with the warning lamp flashing.
    #[inline]
    pub const fn flashes(self) -> bool {
        matches!(
            self,
            Self::FirstStageWarning
                | Self::SecondStageWarning
                | Self::SpeedLimitTest
                | Self::BrakeNoReset
                | Self::BrakeNoResetError
                | Self::TrainStoppedNoReset
        )
    }

    /// States with the warning lamp lit solid.
    #[inline]
    pub const fn solid_lamp(self) -> bool {
        matches!(self, Self::Normal | Self::Depressed)
    }
}

impl Default for VigilanceState {
    fn default() -> Self {
        Self::Idle
    }
}

// ─── Speed-Limit State ──────────────────────────────────────────────

/// State of the 25 km/h speed-limit function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SpeedLimitState {
    /// Function not requested.
    Idle = 0,
    /// Requested; waiting for the train to stop.
    WaitZeroSpeed = 1,
    /// Stopped; waiting for the train to move off.
    WaitNotZeroSpeed = 2,
    /// One sample arming the limit timer.
    BetweenActive = 3,
    /// Limit timer running.
    Active = 4,
    /// Major fault: exceeded relays latched.
    Fault = 5,
}

impl SpeedLimitState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::WaitZeroSpeed),
            2 => Some(Self::WaitNotZeroSpeed),
            3 => Some(Self::BetweenActive),
            4 => Some(Self::Active),
            5 => Some(Self::Fault),
            _ => None,
        }
    }

    /// The function has been requested and not yet expired or overridden.
    #[inline]
    pub const fn is_engaged(self) -> bool {
        matches!(
            self,
            Self::WaitZeroSpeed | Self::WaitNotZeroSpeed | Self::BetweenActive | Self::Active
        )
    }
}

impl Default for SpeedLimitState {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operating_mode_u8_roundtrip() {
        for v in 0..=5u8 {
            let mode = OperatingMode::from_u8(v).unwrap();
            assert_eq!(mode as u8, v);
        }
        assert!(OperatingMode::from_u8(6).is_none());
    }

    #[test]
    fn mode_bits_are_one_hot_except_idle() {
        assert!(OperatingMode::Idle.bits().is_empty());
        for mode in [
            OperatingMode::MajorFault,
            OperatingMode::Test,
            OperatingMode::Depressed,
            OperatingMode::Suppressed,
            OperatingMode::Normal,
        ] {
            assert!(mode.bits().is_one_hot());
            assert_eq!(mode.bits().decode(), Some(mode));
        }
    }

    #[test]
    fn mode_bits_decode_rejects_multi_hot() {
        assert_eq!((ModeBits::NORMAL | ModeBits::TEST).decode(), None);
        assert_eq!(ModeBits::empty().decode(), None);
        assert_eq!(ModeBits::from_bits_retain(0x20).decode(), None);
    }

    #[test]
    fn halt_only_in_major_fault_and_test() {
        assert!(OperatingMode::MajorFault.halts_timers());
        assert!(OperatingMode::Test.halts_timers());
        assert!(!OperatingMode::Normal.halts_timers());
        assert!(!OperatingMode::Suppressed.halts_timers());
        assert!(!OperatingMode::Depressed.halts_timers());
    }

    #[test]
    fn vigilance_state_u8_roundtrip() {
        for v in 0..=9u8 {
            assert_eq!(VigilanceState::from_u8(v).unwrap() as u8, v);
        }
        assert!(VigilanceState::from_u8(10).is_none());
    }

    #[test]
    fn brake_states_block_suppression() {
        for s in [
            VigilanceState::BrakeNoReset,
            VigilanceState::BrakeNoResetError,
            VigilanceState::TrainStoppedNoReset,
            VigilanceState::Normal,
        ] {
            assert!(s.applies_brake());
            assert!(s.blocks_suppression());
        }
        assert!(VigilanceState::Depressed.blocks_suppression());
        assert!(!VigilanceState::Depressed.applies_brake());
        assert!(!VigilanceState::SecondStageWarning.blocks_suppression());
    }

    #[test]
    fn lamp_is_either_flashing_or_solid() {
        for v in 0..=9u8 {
            let s = VigilanceState::from_u8(v).unwrap();
            assert!(!(s.flashes() && s.solid_lamp()), "{s:?}");
        }
    }

    #[test]
    fn speed_limit_state_u8_roundtrip() {
        for v in 0..=5u8 {
            assert_eq!(SpeedLimitState::from_u8(v).unwrap() as u8, v);
        }
        assert!(SpeedLimitState::from_u8(6).is_none());
        assert!(!SpeedLimitState::Idle.is_engaged());
        assert!(!SpeedLimitState::Fault.is_engaged());
        assert!(SpeedLimitState::Active.is_engaged());
    }
}
