//! Utility functions for bit manipulation and data conversion.
//!
//! Helpers for working with PLC word data: bit extraction and the two-half
//! float combine used by F files.
//!
//! # Example
//!
//! ```
//! use ab_pccc::utils::{get_bit, set_bit, words_to_float};
//!
//! let word: u16 = 0b0000_0000_0010_0001;
//! assert!(get_bit(word, 0));
//! assert!(get_bit(word, 5));
//! assert!(!get_bit(word, 1));
//!
//! // 1.0f32 split into its high and low halves
//! assert_eq!(words_to_float(0x3F80, 0x0000), 1.0);
//! ```

/// Gets a single bit from a 16-bit word.
///
/// # Example
///
/// ```
/// use ab_pccc::utils::get_bit;
///
/// let value: u16 = 0b0000_0000_0000_0101;
/// assert!(get_bit(value, 0));
/// assert!(!get_bit(value, 1));
/// assert!(get_bit(value, 2));
/// ```
#[inline]
pub fn get_bit(value: u16, bit: u8) -> bool {
    (value & (1 << bit)) != 0
}

/// Sets or clears a single bit in a 16-bit word.
///
/// # Example
///
/// ```
/// use ab_pccc::utils::set_bit;
///
/// assert_eq!(set_bit(0, 5, true), 0b0000_0000_0010_0000);
/// assert_eq!(set_bit(0xFFFF, 0, false), 0xFFFE);
/// ```
#[inline]
pub fn set_bit(value: u16, bit: u8, state: bool) -> u16 {
    if state {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}

/// Converts a 16-bit word to an array of 16 booleans, LSB first.
pub fn word_to_bits(value: u16) -> [bool; 16] {
    let mut bits = [false; 16];
    for (i, slot) in bits.iter_mut().enumerate() {
        *slot = get_bit(value, i as u8);
    }
    bits
}

/// Combines the two 16-bit halves of an F file element into a float.
///
/// The wire carries the high half first. Byte order of the halves is
/// undocumented for this controller family; this matches the ordering
/// observed in the field but should be confirmed against the target
/// hardware before relying on it.
///
/// # Example
///
/// ```
/// use ab_pccc::utils::words_to_float;
///
/// assert_eq!(words_to_float(0x3F80, 0x0000), 1.0);
/// assert_eq!(words_to_float(0xC000, 0x0000), -2.0);
/// ```
#[inline]
pub fn words_to_float(hi: u16, lo: u16) -> f32 {
    f32::from_bits(((hi as u32) << 16) | lo as u32)
}

/// Splits a float into the two 16-bit halves of an F file element,
/// high half first. Inverse of [`words_to_float`].
///
/// # Example
///
/// ```
/// use ab_pccc::utils::{float_to_words, words_to_float};
///
/// let (hi, lo) = float_to_words(3.14159);
/// assert_eq!(words_to_float(hi, lo), 3.14159);
/// ```
#[inline]
pub fn float_to_words(value: f32) -> (u16, u16) {
    let bits = value.to_bits();
    ((bits >> 16) as u16, bits as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bit() {
        let value: u16 = 0b1000_0000_0000_0101;
        assert!(get_bit(value, 0));
        assert!(!get_bit(value, 1));
        assert!(get_bit(value, 2));
        assert!(get_bit(value, 15));
    }

    #[test]
    fn test_set_bit() {
        assert_eq!(set_bit(0, 3, true), 0b1000);
        assert_eq!(set_bit(0b1000, 3, false), 0);
        // setting an already-set bit is a no-op
        assert_eq!(set_bit(0b1000, 3, true), 0b1000);
    }

    #[test]
    fn test_word_to_bits() {
        let bits = word_to_bits(0b0000_0000_0000_0011);
        assert!(bits[0]);
        assert!(bits[1]);
        assert!(!bits[2]);
        assert!(!bits[15]);
    }

    #[test]
    fn test_float_roundtrip() {
        for value in [0.0f32, 1.0, -2.5, 3.14159, f32::MAX, f32::MIN_POSITIVE] {
            let (hi, lo) = float_to_words(value);
            assert_eq!(words_to_float(hi, lo), value);
        }
    }

    #[test]
    fn test_float_half_order() {
        // 1.0f32 = 0x3F80_0000: high half carries the exponent
        let (hi, lo) = float_to_words(1.0);
        assert_eq!(hi, 0x3F80);
        assert_eq!(lo, 0x0000);
    }
}
