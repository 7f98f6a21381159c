//! EO protocol number codec
//!
//! Numbers are written as up to four base-253 digits, least significant first.
//! Every digit is offset by one so that an encoded number never contains 0x00,
//! and the digit value 254 (0xFE) marks a digit that contributes nothing.
//! Together that keeps 0xFF free for use as the chunk delimiter.

use eoproto_core::{ProtocolError, Result};

/// Threshold for the second digit (one byte holds 0..=252)
pub const CHAR_MAX: u32 = 253;

/// Threshold for the third digit (two bytes hold 0..=64008)
pub const SHORT_MAX: u32 = 64_009;

/// Threshold for the fourth digit (three bytes hold 0..=16194276)
pub const THREE_MAX: u32 = 16_194_277;

/// Upper bound of the four-byte form (exclusive)
pub const INT_MAX: u64 = 4_097_152_081;

/// Digit value meaning "this digit is absent"
pub const ABSENT_DIGIT: u8 = 0xFE;

/// Chunk delimiter, break byte and padding byte
pub const BREAK_BYTE: u8 = 0xFF;

/// Encoded width of a number field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Char = 1,
    Short = 2,
    Three = 3,
    Int = 4,
}

impl Width {
    /// Number of bytes this width occupies on the wire
    #[inline]
    pub const fn len(self) -> usize {
        self as usize
    }

    /// Largest value representable at this width (inclusive)
    #[inline]
    pub const fn max_value(self) -> u32 {
        match self {
            Width::Char => CHAR_MAX - 1,
            Width::Short => SHORT_MAX - 1,
            Width::Three => THREE_MAX - 1,
            Width::Int => (INT_MAX - 1) as u32,
        }
    }

    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(Width::Char),
            2 => Some(Width::Short),
            3 => Some(Width::Three),
            4 => Some(Width::Int),
            _ => None,
        }
    }
}

/// Encode a number into its full four-digit form
///
/// # Format
/// - Digits are ordered least significant first
/// - A digit is only present when the original value reaches its threshold,
///   otherwise it is written as 254
///
/// Writing the first `n` bytes of the result gives the `n`-byte encoding, as
/// long as the value is below the `n`-byte maximum.
pub fn encode_number(number: u32) -> Result<[u8; 4]> {
    if u64::from(number) >= INT_MAX {
        return Err(ProtocolError::overflow(number, INT_MAX - 1));
    }

    let mut value = number;
    let mut digits = [ABSENT_DIGIT; 4];

    if number >= THREE_MAX {
        digits[3] = (value / THREE_MAX + 1) as u8;
        value %= THREE_MAX;
    }

    if number >= SHORT_MAX {
        digits[2] = (value / SHORT_MAX + 1) as u8;
        value %= SHORT_MAX;
    }

    if number >= CHAR_MAX {
        digits[1] = (value / CHAR_MAX + 1) as u8;
        value %= CHAR_MAX;
    }

    digits[0] = (value + 1) as u8;

    Ok(digits)
}

/// Encode a number at a specific width, rejecting values that do not fit
pub fn encode_number_width(number: u32, width: Width) -> Result<[u8; 4]> {
    if number > width.max_value() {
        tracing::trace!(number, ?width, "rejecting number too large for width");
        return Err(ProtocolError::overflow(number, width.max_value()));
    }
    encode_number(number)
}

/// Decode up to four encoded digits (least significant first)
///
/// Decoding is total: absent digits, missing digits and 0x00 bytes all
/// contribute nothing, and the largest possible input still fits a `u32`.
pub fn decode_number(bytes: &[u8]) -> u32 {
    const THRESHOLDS: [u32; 3] = [CHAR_MAX, SHORT_MAX, THREE_MAX];

    let mut result = 0u32;

    for (i, threshold) in THRESHOLDS.iter().enumerate().rev() {
        match bytes.get(i + 1) {
            Some(&digit) if digit != ABSENT_DIGIT => {
                result += u32::from(digit.saturating_sub(1)) * threshold;
            }
            _ => {}
        }
    }

    if let Some(&digit) = bytes.first() {
        result += u32::from(digit.saturating_sub(1));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u32, width: Width) -> u32 {
        let digits = encode_number_width(value, width).unwrap();
        decode_number(&digits[..width.len()])
    }

    #[test]
    fn test_char_roundtrip() {
        for val in [0, 1, 100, 252] {
            assert_eq!(val, roundtrip(val, Width::Char), "Failed for {}", val);
        }
    }

    #[test]
    fn test_short_roundtrip() {
        for val in [0, 252, 253, 1000, 64008] {
            assert_eq!(val, roundtrip(val, Width::Short), "Failed for {}", val);
        }
    }

    #[test]
    fn test_three_roundtrip() {
        for val in [0, 64008, 64009, 1_000_000, 16_194_276] {
            assert_eq!(val, roundtrip(val, Width::Three), "Failed for {}", val);
        }
    }

    #[test]
    fn test_int_roundtrip() {
        for val in [0, 16_194_276, 16_194_277, 2_000_000_000, 4_097_152_080] {
            assert_eq!(val, roundtrip(val, Width::Int), "Failed for {}", val);
        }
    }

    #[test]
    fn test_encoding_matches_wire_format() {
        assert_eq!(encode_number(0).unwrap(), [1, 254, 254, 254]);
        assert_eq!(encode_number(252).unwrap(), [253, 254, 254, 254]);
        assert_eq!(encode_number(253).unwrap(), [1, 2, 254, 254]);
        assert_eq!(encode_number(64_008).unwrap(), [253, 253, 254, 254]);
        assert_eq!(encode_number(64_009).unwrap(), [1, 1, 2, 254]);
        assert_eq!(encode_number(16_194_277).unwrap(), [1, 1, 1, 2]);
        assert_eq!(encode_number(4_097_152_080).unwrap(), [253, 253, 253, 253]);
    }

    #[test]
    fn test_threshold_overflow() {
        assert!(encode_number_width(252, Width::Char).is_ok());
        assert_eq!(
            encode_number_width(253, Width::Char),
            Err(ProtocolError::overflow(253u32, 252u32))
        );
        assert!(encode_number_width(64_009, Width::Short).is_err());
        assert!(encode_number_width(16_194_277, Width::Three).is_err());
        assert!(encode_number(4_097_152_081).is_err());
        assert!(encode_number(u32::MAX).is_err());
    }

    #[test]
    fn test_decode_is_total() {
        assert_eq!(decode_number(&[]), 0);
        assert_eq!(decode_number(&[0]), 0);
        assert_eq!(decode_number(&[0, 0, 0, 0]), 0);
        // Largest possible input must not overflow
        let max = decode_number(&[255, 255, 255, 255]);
        assert_eq!(max, 254 + 254 * CHAR_MAX + 254 * SHORT_MAX + 254 * THREE_MAX);
    }

    #[test]
    fn test_narrow_read_ignores_high_digits() {
        let digits = encode_number(70_000).unwrap();
        assert_eq!(decode_number(&digits), 70_000);
        assert_eq!(decode_number(&digits[..2]), 70_000 % SHORT_MAX);
    }

    #[test]
    fn test_width_lengths() {
        assert_eq!(Width::Three.len(), 3);
        assert_eq!(Width::from_len(2), Some(Width::Short));
        assert_eq!(Width::from_len(5), None);
        assert_eq!(Width::Int.max_value(), 4_097_152_080);
    }
}
