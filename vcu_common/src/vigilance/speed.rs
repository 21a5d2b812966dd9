//! Aggregated speed band codec.
//!
//! The upstream speed compare logic delivers an 8-bit thermometer code
//! (bit 0 set for any valid reading, one more bit per band). Only eight codes
//! are valid; every other pattern is an aggregate error and is treated as
//! the most conservative band.

use serde::{Deserialize, Serialize};

/// Number of speed bands.
pub const SPEED_BANDS: usize = 8;

/// Discretized train speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SpeedBand {
    /// Below 3 km/h (lowest band).
    Below3 = 0,
    /// Above 3 km/h.
    Above3 = 1,
    /// Above 23 km/h.
    Above23 = 2,
    /// Above 25 km/h.
    Above25 = 3,
    /// Above 75 km/h.
    Above75 = 4,
    /// Above 90 km/h.
    Above90 = 5,
    /// Above 110 km/h.
    Above110 = 6,
    /// Overspeed, also used for any invalid code.
    Overspeed = 7,
}

impl SpeedBand {
    /// All bands, slowest first. Index matches the per-band timeout tables.
    pub const ALL: [Self; SPEED_BANDS] = [
        Self::Below3,
        Self::Above3,
        Self::Above23,
        Self::Above25,
        Self::Above75,
        Self::Above90,
        Self::Above110,
        Self::Overspeed,
    ];

    /// Decode a thermometer code. Invalid codes map to `Overspeed`.
    #[inline]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0b0000_0001 => Self::Below3,
            0b0000_0011 => Self::Above3,
            0b0000_0111 => Self::Above23,
            0b0000_1111 => Self::Above25,
            0b0001_1111 => Self::Above75,
            0b0011_1111 => Self::Above90,
            0b0111_1111 => Self::Above110,
            _ => Self::Overspeed,
        }
    }

    /// Whether `code` is one of the eight valid thermometer codes.
    #[inline]
    pub const fn is_valid_code(code: u8) -> bool {
        // Thermometer codes are 2^n - 1 with n >= 1.
        code != 0 && (code & code.wrapping_add(1)) == 0
    }

    /// The thermometer code of this band.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::Overspeed => 0xFF,
            band => (1u8 << (band as u8 + 1)) - 1,
        }
    }

    /// Table index (0 = slowest).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowest band, the analog zero-speed indication.
    #[inline]
    pub const fn is_lowest(self) -> bool {
        matches!(self, Self::Below3)
    }

    /// At or above the 25 km/h speed-limit threshold.
    #[inline]
    pub const fn exceeds_limit(self) -> bool {
        self as u8 >= Self::Above25 as u8
    }
}

/// Analog zero-speed: only the exact lowest-band code qualifies.
#[inline]
pub const fn is_analog_zero_speed(code: u8) -> bool {
    code == 0b0000_0001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes_decode_to_their_band() {
        for band in SpeedBand::ALL {
            assert!(SpeedBand::is_valid_code(band.code()), "{band:?}");
            assert_eq!(SpeedBand::from_code(band.code()), band);
        }
    }

    #[test]
    fn exactly_eight_valid_codes() {
        let valid = (0..=255u8).filter(|c| SpeedBand::is_valid_code(*c)).count();
        assert_eq!(valid, SPEED_BANDS);
    }

    #[test]
    fn invalid_codes_are_conservative() {
        for code in [0x00, 0x02, 0x05, 0x80, 0xFE, 0x0B] {
            assert!(!SpeedBand::is_valid_code(code));
            assert_eq!(SpeedBand::from_code(code), SpeedBand::Overspeed);
            assert!(!is_analog_zero_speed(code));
        }
    }

    #[test]
    fn limit_threshold_is_25_kmh() {
        assert!(!SpeedBand::Below3.exceeds_limit());
        assert!(!SpeedBand::Above23.exceeds_limit());
        assert!(SpeedBand::Above25.exceeds_limit());
        assert!(SpeedBand::Overspeed.exceeds_limit());
    }

    #[test]
    fn only_lowest_band_is_zero_speed() {
        assert!(is_analog_zero_speed(0x01));
        assert!(!is_analog_zero_speed(0x03));
        assert!(SpeedBand::Below3.is_lowest());
        assert!(!SpeedBand::Above3.is_lowest());
    }
}
