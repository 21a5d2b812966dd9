//! Task-linked activity (TLA) channels.
//!
//! Each channel is an operator action accepted as evidence of alertness.
//! Limited channels only count a fixed number of consecutive events before
//! another channel or an acknowledge must intervene.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of TLA channels.
pub const TLA_CHANNELS: usize = 8;

bitflags! {
    /// TLA activity vector (levels on input, events when latched).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TlaChannels: u8 {
        /// Brake controller / power handle motion (PWM demand pulse).
        const POWER_BRAKE_DEMAND = 0x01;
        /// Safety bypass switch.
        const SAFETY_BYPASS      = 0x02;
        const HORN               = 0x04;
        const SANDER             = 0x08;
        const HEADLIGHT          = 0x10;
        const WIPER              = 0x20;
        const DOOR_CONTROL       = 0x40;
        const RADIO_PTT          = 0x80;
    }
}

impl TlaChannels {
    /// Single-channel flag for index `i` (0..8).
    #[inline]
    pub const fn channel(i: usize) -> Self {
        Self::from_bits_truncate(1u8 << (i & 7))
    }

    /// Whether channel `i` is set.
    #[inline]
    pub const fn has(self, i: usize) -> bool {
        self.bits() & (1u8 << (i & 7)) != 0
    }
}

impl Default for TlaChannels {
    fn default() -> Self {
        Self::empty()
    }
}

/// Event allotment of a TLA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allotment {
    /// Every event counts; the counter never decrements.
    Unlimited,
    /// Only this many consecutive events count.
    Limited(u8),
}

impl Allotment {
    /// Initial counter value. Unlimited channels report `u8::MAX`.
    #[inline]
    pub const fn initial(self) -> u8 {
        match self {
            Self::Unlimited => u8::MAX,
            Self::Limited(n) => n,
        }
    }

    #[inline]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

/// Default allotments: demand and bypass unlimited, the rest three events.
pub const DEFAULT_ALLOTMENTS: [Allotment; TLA_CHANNELS] = [
    Allotment::Unlimited,
    Allotment::Unlimited,
    Allotment::Limited(3),
    Allotment::Limited(3),
    Allotment::Limited(3),
    Allotment::Limited(3),
    Allotment::Limited(3),
    Allotment::Limited(3),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_index_matches_flag() {
        assert_eq!(TlaChannels::channel(0), TlaChannels::POWER_BRAKE_DEMAND);
        assert_eq!(TlaChannels::channel(2), TlaChannels::HORN);
        assert_eq!(TlaChannels::channel(7), TlaChannels::RADIO_PTT);
        assert!((TlaChannels::HORN | TlaChannels::WIPER).has(5));
        assert!(!TlaChannels::HORN.has(3));
    }

    #[test]
    fn unlimited_channels_are_demand_and_bypass() {
        let unlimited: Vec<usize> = DEFAULT_ALLOTMENTS
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_unlimited())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(unlimited, vec![0, 1]);
    }

    #[test]
    fn allotment_deserializes_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            a: Allotment,
            b: Allotment,
        }
        let w: Wrapper = toml::from_str("a = \"unlimited\"\nb = { limited = 4 }").unwrap();
        assert_eq!(w.a, Allotment::Unlimited);
        assert_eq!(w.b, Allotment::Limited(4));
    }
}
