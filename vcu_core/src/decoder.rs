//! Mode request decoder.
//!
//! Turns raw cab signals into the registered request flags read by the mode
//! arbiter. Evaluates once per sample tick; every output is a register, so
//! the arbiter always sees the values decided on the previous sample.

use vcu_common::consts::ACK_HOLD_SAMPLES;
use vcu_common::vigilance::io::Inputs;
use vcu_common::vigilance::speed::is_analog_zero_speed;
use vcu_common::vigilance::state::OperatingMode;

/// Registered request flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeRequests {
    /// Train confirmed stopped on both speed chains and neither chain faulted.
    pub zero_speed: bool,
    pub suppression: bool,
    pub depression: bool,
    /// Latched request to enter Test.
    pub test_mode: bool,
    /// Acknowledge held continuously for at least 3 s.
    pub ack_held: bool,
}

/// Decoder context read from the committed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderContext {
    /// Committed operating mode.
    pub mode: OperatingMode,
    /// Vigilance FSM finished the test sequence.
    pub test_exit: bool,
}

/// Decoder registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeRequestDecoder {
    brake_pressure_high_d: bool,
    cab_active_d: bool,
    hold_samples: u16,
    requests: ModeRequests,
}

impl ModeRequestDecoder {
    pub const fn new() -> Self {
        Self {
            brake_pressure_high_d: false,
            cab_active_d: false,
            hold_samples: 0,
            requests: ModeRequests {
                zero_speed: false,
                suppression: false,
                depression: false,
                test_mode: false,
                ack_held: false,
            },
        }
    }

    /// Registered request flags.
    #[inline]
    pub const fn requests(&self) -> ModeRequests {
        self.requests
    }

    /// Continuous acknowledge hold [samples], saturating at the 3 s threshold.
    #[inline]
    pub const fn hold_samples(&self) -> u16 {
        self.hold_samples
    }

    /// Next decoder state for one sample tick.
    pub fn step(&self, inputs: &Inputs, ctx: DecoderContext) -> Self {
        let zero_speed = is_analog_zero_speed(inputs.speed_code)
            && inputs.digital_zero_speed
            && !inputs.analog_speed_error
            && !inputs.zero_speed_fault;

        // Brake pressure and cab activity are taken from the previous sample.
        let suppression = inputs.driverless
            || (self.brake_pressure_high_d && zero_speed)
            || !self.cab_active_d;
        let depression = inputs.cbtc_active;

        let hold_samples = if inputs.acknowledge {
            (self.hold_samples + 1).min(ACK_HOLD_SAMPLES)
        } else {
            0
        };
        let hold_reached = self.hold_samples < ACK_HOLD_SAMPLES && hold_samples == ACK_HOLD_SAMPLES;

        let clear = ctx.test_exit || !suppression || !zero_speed || !self.cab_active_d;
        let set = hold_reached && ctx.mode == OperatingMode::Suppressed;
        let test_mode = if clear {
            false
        } else {
            set || self.requests.test_mode
        };

        Self {
            brake_pressure_high_d: inputs.brake_pressure_high,
            cab_active_d: inputs.cab_active,
            hold_samples,
            requests: ModeRequests {
                zero_speed,
                suppression,
                depression,
                test_mode,
                ack_held: hold_samples >= ACK_HOLD_SAMPLES,
            },
        }
    }
}
