//! Down-counting timeout timer.
//!
//! Counts in whatever tick unit the owner feeds it (quarter ticks for the
//! vigilance timers, seconds for the speed-limit timer). Never wraps.

/// Saturating down-counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeoutTimer {
    remaining: u16,
}

impl TimeoutTimer {
    /// Timer loaded with `ticks`.
    #[inline]
    pub const fn loaded(ticks: u16) -> Self {
        Self { remaining: ticks }
    }

    #[inline]
    pub const fn remaining(&self) -> u16 {
        self.remaining
    }

    #[inline]
    pub const fn expired(&self) -> bool {
        self.remaining == 0
    }

    /// Decrement by one on `tick` unless `halt`. Holds at zero.
    #[inline]
    pub const fn ticked(self, tick: bool, halt: bool) -> Self {
        if tick && !halt {
            Self {
                remaining: self.remaining.saturating_sub(1),
            }
        } else {
            self
        }
    }

    /// Limit the remaining time to `max`.
    #[inline]
    pub const fn clamped(self, max: u16) -> Self {
        if self.remaining > max {
            Self { remaining: max }
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_zero_and_holds() {
        let mut t = TimeoutTimer::loaded(2);
        t = t.ticked(true, false);
        assert_eq!(t.remaining(), 1);
        t = t.ticked(true, false);
        assert!(t.expired());
        t = t.ticked(true, false);
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn halt_freezes() {
        let t = TimeoutTimer::loaded(5).ticked(true, true);
        assert_eq!(t.remaining(), 5);
    }

    #[test]
    fn no_tick_no_change() {
        let t = TimeoutTimer::loaded(5).ticked(false, false);
        assert_eq!(t.remaining(), 5);
    }

    #[test]
    fn clamp_only_shortens() {
        assert_eq!(TimeoutTimer::loaded(100).clamped(40).remaining(), 40);
        assert_eq!(TimeoutTimer::loaded(10).clamped(40).remaining(), 10);
    }
}
