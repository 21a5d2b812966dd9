//! Edge sampler.
//!
//! Button and TLA levels are compared against their previous value on every
//! edge tick. Detected edges are latched until the next sample tick consumes
//! them, so a press shorter than a sample period is never lost.

use vcu_common::vigilance::io::{Inputs, TickFlags};
use vcu_common::vigilance::tla::TlaChannels;

/// Edge events accumulated since the previous sample tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampledEvents {
    /// TLA channels with a rising edge.
    pub tla: TlaChannels,
    /// Acknowledge button pressed.
    pub ack_press: bool,
    /// Speed-limit override button pressed.
    pub override_press: bool,
    /// Speed-limit request line fell.
    pub request_fall: bool,
}

impl SampledEvents {
    /// Merge two event sets.
    #[inline]
    fn merged(self, other: Self) -> Self {
        Self {
            tla: self.tla | other.tla,
            ack_press: self.ack_press || other.ack_press,
            override_press: self.override_press || other.override_press,
            request_fall: self.request_fall || other.request_fall,
        }
    }
}

/// Previous-level registers and event latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSampler {
    prev_tla: TlaChannels,
    prev_ack: bool,
    prev_override: bool,
    prev_request: bool,
    latched: SampledEvents,
}

impl Default for EdgeSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeSampler {
    /// Power-up registers. The request line idles high.
    pub const fn new() -> Self {
        Self {
            prev_tla: TlaChannels::empty(),
            prev_ack: false,
            prev_override: false,
            prev_request: true,
            latched: SampledEvents {
                tla: TlaChannels::empty(),
                ack_press: false,
                override_press: false,
                request_fall: false,
            },
        }
    }

    /// Events to be consumed at the current sample tick.
    #[inline]
    pub const fn events(&self) -> SampledEvents {
        self.latched
    }

    /// No level differs from its register, so edge ticks would change nothing.
    #[inline]
    pub fn is_quiescent(&self, inputs: &Inputs) -> bool {
        inputs.tla_levels() == self.prev_tla
            && inputs.acknowledge == self.prev_ack
            && inputs.speed_limit_override == self.prev_override
            && inputs.speed_limit_request == self.prev_request
    }

    /// Next sampler state.
    ///
    /// A sample tick clears the latches it consumes. While `in_reset` the
    /// level registers track the inputs but no edge is latched.
    pub fn step(&self, inputs: &Inputs, ticks: &TickFlags, in_reset: bool) -> Self {
        let mut next = *self;
        if ticks.sample {
            next.latched = SampledEvents::default();
        }
        if !ticks.edge {
            return next;
        }

        let tla = inputs.tla_levels();
        if !in_reset {
            let detected = SampledEvents {
                tla: tla & !self.prev_tla,
                ack_press: inputs.acknowledge && !self.prev_ack,
                override_press: inputs.speed_limit_override && !self.prev_override,
                request_fall: !inputs.speed_limit_request && self.prev_request,
            };
            next.latched = next.latched.merged(detected);
        }
        next.prev_tla = tla;
        next.prev_ack = inputs.acknowledge;
        next.prev_override = inputs.speed_limit_override;
        next.prev_request = inputs.speed_limit_request;
        next
    }
}
