//! Signal records on the engine boundary.
//!
//! [`Inputs`] carries the already debounced and validated signals from the
//! input compare, speed compare and PWM capture collaborators. [`Outputs`]
//! carries the commands for the output drivers and the diagnostic flags.
//! Both are plain `Copy` records; the engine never allocates.

use serde::{Deserialize, Serialize};

use super::speed::SpeedBand;
use super::state::{ModeBits, OperatingMode, SpeedLimitState, VigilanceState};
use super::tla::TlaChannels;

// ─── Inputs ─────────────────────────────────────────────────────────

/// Input signals sampled by the engine.
///
/// Field defaults describe a parked, inactive cab at standstill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inputs {
    /// Brake pipe / cylinder pressure high.
    pub brake_pressure_high: bool,
    /// This cab is the active cab.
    pub cab_active: bool,
    /// CBTC/HCS signalling in control.
    pub cbtc_active: bool,
    /// Digital zero-speed channel.
    pub digital_zero_speed: bool,
    /// Driverless operation.
    pub driverless: bool,
    /// Vigilance push-button level.
    pub acknowledge: bool,
    /// TLA activity levels.
    pub tla: TlaChannels,
    /// Power/brake demand pulse from PWM capture (OR-ed into the demand channel).
    pub power_brake_demand: bool,
    /// Aggregated thermometer speed code.
    pub speed_code: u8,
    /// Analog speed chain error (latched upstream).
    pub analog_speed_error: bool,
    /// Digital zero-speed chain fault (latched upstream).
    pub zero_speed_fault: bool,
    /// Persistent fault reported by output readback.
    pub major_fault: bool,
    /// PWM reports no traction power demanded.
    pub no_power: bool,
    /// Speed-limit function request line (active on falling edge).
    pub speed_limit_request: bool,
    /// Speed-limit override button.
    pub speed_limit_override: bool,
    /// Speed-limit relay test request (honored in Test mode).
    pub speed_limit_exceed_test: bool,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            brake_pressure_high: true,
            cab_active: false,
            cbtc_active: false,
            digital_zero_speed: true,
            driverless: false,
            acknowledge: false,
            tla: TlaChannels::empty(),
            power_brake_demand: false,
            speed_code: SpeedBand::Below3.code(),
            analog_speed_error: false,
            zero_speed_fault: false,
            major_fault: false,
            no_power: true,
            speed_limit_request: true,
            speed_limit_override: false,
            speed_limit_exceed_test: false,
        }
    }
}

impl Inputs {
    /// Active cab, brakes released, moving in `band`.
    pub fn driving(band: SpeedBand) -> Self {
        Self {
            brake_pressure_high: false,
            cab_active: true,
            digital_zero_speed: band.is_lowest(),
            speed_code: band.code(),
            no_power: false,
            ..Self::default()
        }
    }

    /// Effective TLA vector including the PWM demand pulse.
    #[inline]
    pub fn tla_levels(&self) -> TlaChannels {
        if self.power_brake_demand {
            self.tla | TlaChannels::POWER_BRAKE_DEMAND
        } else {
            self.tla
        }
    }
}

// ─── Tick Flags ─────────────────────────────────────────────────────

/// Tick pulses firing on the current base-clock cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickFlags {
    /// 15.625 µs edge tick.
    pub edge: bool,
    /// 500 µs sample tick.
    pub sample: bool,
    /// 125 ms flash tick.
    pub flash: bool,
    /// 250 ms quarter tick.
    pub quarter: bool,
    /// 500 ms half tick.
    pub half: bool,
    /// Auxiliary 78 ms pulse.
    pub aux_78ms: bool,
    /// Auxiliary ≈97.5 kHz display pulse.
    pub display: bool,
}

impl TickFlags {
    /// Any pulse that a state machine consumes.
    #[inline]
    pub const fn any_consumed(&self) -> bool {
        self.edge || self.sample
    }
}

// ─── Outputs ────────────────────────────────────────────────────────

/// Inhibit flags fed back from the vigilance FSM to the mode arbiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inhibits {
    /// Block entry to Test (true whenever the mode is not Suppressed).
    pub no_test: bool,
    /// Block entry to Suppressed/Depressed (brake enforcement in progress).
    pub no_suppress: bool,
    /// Hold Suppressed until the test sequence leaves SpeedLimitTest.
    pub no_normal_return: bool,
}

/// Engine outputs after a committed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outputs {
    /// One-hot operating mode.
    pub mode: ModeBits,
    /// Vigilance timers frozen (MajorFault or Test).
    pub halt_timers: bool,
    /// Warning lamp lit (solid or flashing).
    pub visible_warning: bool,
    /// Physical lamp drive, modulated by the flash phase when flashing.
    pub warning_lamp: bool,
    /// Lamp in flashing mode.
    pub flashing_light: bool,
    pub buzzer: bool,
    pub penalty_brake_a: bool,
    pub penalty_brake_b: bool,
    /// Radio/gateway warning.
    pub radio_warning: bool,
    /// Stretched pulse on return to NoWarning.
    pub vcu_reset: bool,
    pub inhibits: Inhibits,
    pub first_stage_warning: bool,
    pub second_stage_warning: bool,
    /// Vigilance test sequence is exercising the speed-limit relays.
    pub speed_limit_test: bool,
    /// One half-tick pulse after a valid override.
    pub speed_limit_overridden: bool,
    pub speed_limit_exceeded_a: bool,
    pub speed_limit_exceeded_b: bool,
    /// Speed-limit function engaged.
    pub speed_limit_status: bool,
    /// One-sample pulse when an active limit is re-armed.
    pub speed_limit_rearm: bool,
    /// Fault-gated zero-speed flag.
    pub zero_speed: bool,
    pub vigilance_state: VigilanceState,
    pub speed_limit_state: SpeedLimitState,
    /// Reset still asserted.
    pub in_reset: bool,
    pub ticks: TickFlags,
}

impl Outputs {
    /// Decoded operating mode, `None` while Idle.
    #[inline]
    pub fn operating_mode(&self) -> Option<OperatingMode> {
        self.mode.decode()
    }

    /// Both penalty brake channels commanded.
    #[inline]
    pub const fn penalty_brake(&self) -> bool {
        self.penalty_brake_a && self.penalty_brake_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_inputs_describe_parked_cab() {
        let i = Inputs::default();
        assert!(!i.cab_active);
        assert!(i.brake_pressure_high);
        assert_eq!(SpeedBand::from_code(i.speed_code), SpeedBand::Below3);
    }

    #[test]
    fn driving_inputs_at_speed() {
        let i = Inputs::driving(SpeedBand::Above75);
        assert!(i.cab_active);
        assert!(!i.digital_zero_speed);
        assert_eq!(i.speed_code, 0b0001_1111);
    }

    #[test]
    fn demand_pulse_merges_into_tla_vector() {
        let mut i = Inputs::driving(SpeedBand::Above3);
        i.tla = TlaChannels::HORN;
        assert_eq!(i.tla_levels(), TlaChannels::HORN);
        i.power_brake_demand = true;
        assert_eq!(
            i.tla_levels(),
            TlaChannels::HORN | TlaChannels::POWER_BRAKE_DEMAND
        );
    }

    #[test]
    fn inputs_deserialize_with_partial_fields() {
        let i: Inputs = toml::from_str("cab_active = true\nspeed_code = 7\n").unwrap();
        assert!(i.cab_active);
        assert_eq!(i.speed_code, 7);
        assert!(i.brake_pressure_high);
    }
}
