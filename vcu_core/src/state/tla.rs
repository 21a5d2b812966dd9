//! TLA allotment counters.
//!
//! A limited channel counts only a bounded number of consecutive events.
//! Any event on another channel restores the full allotment of every other
//! channel, so alternating between two actions always counts while hammering
//! one button does not.

use vcu_common::vigilance::tla::{Allotment, TLA_CHANNELS, TlaChannels};

/// Remaining events per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlaCounters {
    remaining: [u8; TLA_CHANNELS],
}

impl TlaCounters {
    /// Counters at full allotment.
    pub fn full(allotments: &[Allotment; TLA_CHANNELS]) -> Self {
        Self {
            remaining: allotments.map(Allotment::initial),
        }
    }

    /// Remaining events on channel `i`. Unlimited channels report `u8::MAX`.
    #[inline]
    pub fn remaining(&self, i: usize) -> u8 {
        self.remaining[i]
    }

    /// Channels among `events` whose event counts as activity.
    pub fn counted(&self, events: TlaChannels, allotments: &[Allotment; TLA_CHANNELS]) -> TlaChannels {
        (0..TLA_CHANNELS)
            .filter(|&i| events.has(i) && (allotments[i].is_unlimited() || self.remaining[i] > 0))
            .fold(TlaChannels::empty(), |acc, i| acc | TlaChannels::channel(i))
    }

    /// Counter update for one sample.
    ///
    /// `reset_all` restores every channel (acknowledge press or Suppressed
    /// mode); `frozen` holds every counter (Test mode) and wins over both.
    pub fn next(
        &self,
        events: TlaChannels,
        allotments: &[Allotment; TLA_CHANNELS],
        reset_all: bool,
        frozen: bool,
    ) -> Self {
        if frozen {
            return *self;
        }
        if reset_all {
            return Self::full(allotments);
        }
        let mut remaining = self.remaining;
        for (i, slot) in remaining.iter_mut().enumerate() {
            let fired = events.has(i);
            let sibling_fired = !(events & !TlaChannels::channel(i)).is_empty();
            if fired {
                if let Allotment::Limited(_) = allotments[i] {
                    *slot = slot.saturating_sub(1);
                }
            } else if sibling_fired {
                *slot = allotments[i].initial();
            }
        }
        Self { remaining }
    }
}
