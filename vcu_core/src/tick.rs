//! Tick generator and reset-release synchronizer.
//!
//! One free-running cycle counter drives every rate. A rate fires on cycle
//! `c` when `c % period == 0`; for the power-of-two periods this is exactly
//! the falling edge of counter bit `log2(period) - 1`. Every consumed rate is
//! a multiple of the edge period, so slower ticks are always edge-aligned.
//!
//! | Pulse   | Period [cycles] | Nominal    |
//! |---------|-----------------|------------|
//! | edge    | 512             | 15.625 µs  |
//! | sample  | 16 384          | 500 µs     |
//! | flash   | 4 096 000       | 125 ms     |
//! | quarter | 8 192 000       | 250 ms     |
//! | half    | 16 384 000      | 500 ms     |
//! | aux     | 2 555 904       | 78 ms      |
//! | display | 336             | ≈97.52 kHz |

use vcu_common::consts::{
    AUX_78MS_PERIOD, DISPLAY_PERIOD, EDGE_PERIOD, FLASH_PERIOD, HALF_PERIOD, QUARTER_PERIOD,
    RESET_RELEASE_EDGES, SAMPLE_PERIOD,
};
use static_assertions::const_assert;
use vcu_common::vigilance::io::TickFlags;

// Reset must be released before the first sample tick.
const_assert!((RESET_RELEASE_EDGES as u64) * EDGE_PERIOD < SAMPLE_PERIOD);

// ─── Tick Generator ─────────────────────────────────────────────────

/// Free-running base-clock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickGenerator {
    cycle: u64,
}

impl TickGenerator {
    /// Counter at power-up (cycle 0, no pulse).
    pub const fn new() -> Self {
        Self { cycle: 0 }
    }

    /// Current base-clock cycle.
    #[inline]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Pulses firing on the current cycle.
    #[inline]
    pub const fn flags(&self) -> TickFlags {
        Self::flags_at(self.cycle)
    }

    /// Pulses firing on `cycle`. Cycle 0 is the power-up instant and fires nothing.
    pub const fn flags_at(cycle: u64) -> TickFlags {
        if cycle == 0 {
            return TickFlags {
                edge: false,
                sample: false,
                flash: false,
                quarter: false,
                half: false,
                aux_78ms: false,
                display: false,
            };
        }
        TickFlags {
            edge: cycle % EDGE_PERIOD == 0,
            sample: cycle % SAMPLE_PERIOD == 0,
            flash: cycle % FLASH_PERIOD == 0,
            quarter: cycle % QUARTER_PERIOD == 0,
            half: cycle % HALF_PERIOD == 0,
            aux_78ms: cycle % AUX_78MS_PERIOD == 0,
            display: cycle % DISPLAY_PERIOD == 0,
        }
    }

    /// Counter after `cycles` more base-clock cycles.
    #[inline]
    pub const fn advanced(self, cycles: u64) -> Self {
        Self {
            cycle: self.cycle.wrapping_add(cycles),
        }
    }

    /// Cycles until the next pulse of a rate with the given period (always ≥ 1).
    #[inline]
    pub const fn cycles_until(&self, period: u64) -> u64 {
        period - self.cycle % period
    }
}

// ─── Reset Synchronizer ─────────────────────────────────────────────

/// Holds reset asserted until two edge ticks have been seen.
///
/// The first sample tick comes well after release, so no component ever
/// observes a reset edge in the same step as its first valid tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetSync {
    edges_seen: u8,
}

impl ResetSync {
    /// Reset asserted (power-up).
    pub const fn new() -> Self {
        Self { edges_seen: 0 }
    }

    /// Reset is still asserted.
    #[inline]
    pub const fn in_reset(&self) -> bool {
        self.edges_seen < RESET_RELEASE_EDGES
    }

    /// Next synchronizer state.
    #[inline]
    pub const fn step(&self, ticks: &TickFlags) -> Self {
        if ticks.edge && self.in_reset() {
            Self {
                edges_seen: self.edges_seen + 1,
            }
        } else {
            *self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_zero_fires_nothing() {
        assert_eq!(TickGenerator::new().flags(), TickFlags::default());
    }

    #[test]
    fn slower_ticks_coincide_with_sample_ticks() {
        for cycle in [SAMPLE_PERIOD, FLASH_PERIOD, QUARTER_PERIOD, HALF_PERIOD, AUX_78MS_PERIOD] {
            let f = TickGenerator::flags_at(cycle);
            assert!(f.edge && f.sample, "cycle {cycle}");
        }
        let f = TickGenerator::flags_at(HALF_PERIOD);
        assert!(f.flash && f.quarter && f.half);
    }

    #[test]
    fn edge_is_bit_8_falling_edge() {
        for cycle in 1..4096u64 {
            let bit8_fell = ((cycle - 1) >> 8) & 1 == 1 && (cycle >> 8) & 1 == 0;
            assert_eq!(TickGenerator::flags_at(cycle).edge, bit8_fell, "cycle {cycle}");
        }
    }

    #[test]
    fn pulse_counts_over_one_second() {
        let second = vcu_common::consts::BASE_CLOCK_HZ;
        assert_eq!(second / EDGE_PERIOD, 64_000);
        assert_eq!(second / SAMPLE_PERIOD, 2_000);
        assert_eq!(second / FLASH_PERIOD, 8);
        assert_eq!(second / QUARTER_PERIOD, 4);
        assert_eq!(second / HALF_PERIOD, 2);
    }

    #[test]
    fn cycles_until_next_pulse() {
        let ticks = TickGenerator::new();
        assert_eq!(ticks.cycles_until(EDGE_PERIOD), EDGE_PERIOD);
        let ticks = ticks.advanced(EDGE_PERIOD);
        assert!(ticks.flags().edge);
        assert_eq!(ticks.cycles_until(EDGE_PERIOD), EDGE_PERIOD);
        assert_eq!(ticks.advanced(100).cycles_until(EDGE_PERIOD), EDGE_PERIOD - 100);
    }

    #[test]
    fn reset_released_after_two_edges() {
        let mut ticks = TickGenerator::new();
        let mut reset = ResetSync::new();
        let mut released_at = None;
        for _ in 0..4 * EDGE_PERIOD {
            ticks = ticks.advanced(1);
            reset = reset.step(&ticks.flags());
            if !reset.in_reset() && released_at.is_none() {
                released_at = Some(ticks.cycle());
            }
        }
        assert_eq!(released_at, Some(2 * EDGE_PERIOD));
        assert!(released_at.unwrap() < SAMPLE_PERIOD);
    }

    #[test]
    fn only_edge_cycles_are_consumed() {
        assert!(!TickGenerator::flags_at(EDGE_PERIOD - 1).any_consumed());
        assert!(!TickGenerator::flags_at(DISPLAY_PERIOD).any_consumed());
        assert!(TickGenerator::flags_at(EDGE_PERIOD).any_consumed());
        assert!(TickGenerator::flags_at(SAMPLE_PERIOD).any_consumed());
    }

    #[test]
    fn non_edge_cycles_leave_reset_unchanged() {
        let reset = ResetSync::new();
        let quiet = TickFlags::default();
        assert_eq!(reset.step(&quiet), reset);
    }
}
