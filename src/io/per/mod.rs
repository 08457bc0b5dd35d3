//! This module defines traits to encode and decode the basic ASN.1 primitives of the
//! ITU-T X.691 | ISO/IEC 8825-2:2015 packed encoding rules. The more complex types
//! (see [`crate::syn`]) are composited on top of these building blocks.
//!
//! Only the ALIGNED variant is implemented. [`Alignment::Unaligned`] merely suppresses the
//! octet-alignment padding, which is how the S1AP peers this crate talks to pre-encode
//! some containers, it is not a conforming UNALIGNED PER implementation.

use bytes::Bytes;
use std::ops::Range;

pub mod aligned;
pub mod err;

pub use err::Error;
pub use err::ErrorKind;
pub use err::Violation;

pub const BYTE_LEN: usize = 8;

/// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 11.9.3.8, the length of a single fragment
pub const FRAGMENT_SIZE: u64 = 16 * 1024;

/// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 11.9.4.1, upper bounds from here on
/// require the unconstrained form of the length determinant
pub const LENGTH_64K: u64 = 64 * 1024;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Aligned,
    Unaligned,
}

/// The outcome of reading or writing a length determinant. A [`LengthDeterminant::Fragment`]
/// announces a block of 16K multiples, after which another length determinant follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthDeterminant {
    Complete(u64),
    Fragment(u64),
}

impl LengthDeterminant {
    #[inline]
    pub const fn count(self) -> u64 {
        match self {
            LengthDeterminant::Complete(count) | LengthDeterminant::Fragment(count) => count,
        }
    }

    #[inline]
    pub const fn is_fragment(self) -> bool {
        matches!(self, LengthDeterminant::Fragment(_))
    }
}

pub trait PackedRead {
    /// Skips the padding bits up to the next octet boundary, if the reader is aligned
    fn align(&mut self) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 12, the boolean type is represented
    /// through a single bit, where 1 represents `true` and 0 represents `false`.
    fn read_boolean(&mut self) -> Result<bool, Error>;

    /// Reads a bit-field of `bit_len` bits (at most 64) as unsigned value
    fn read_non_negative_binary_integer(&mut self, bit_len: usize) -> Result<u64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.4, the two's-complement
    /// binary integer in the given amount of octets
    fn read_2s_compliment_binary_integer(&mut self, octets: u64) -> Result<i64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.5, a constrained whole number
    /// is a whole number with a lower- and upper-bound constrained
    fn read_constrained_whole_number(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Result<i64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.7, a semi constrained whole
    /// number is a whole number with a lower-bound constrained but no upper-bound constrained
    fn read_semi_constrained_whole_number(&mut self, lower_bound: i64) -> Result<i64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.8, a whole number without any
    /// constraints, encoded as two's-complement
    fn read_unconstrained_whole_number(&mut self) -> Result<i64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.6, an unconstrained integer
    /// where small numbers appear more often the large numbers.
    fn read_normally_small_non_negative_whole_number(&mut self) -> Result<u64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9.3.4, a length that is
    /// likely to be small and never zero
    fn read_normally_small_length(&mut self) -> Result<u64, Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9, the length determinant is
    /// a number used to count bits, octets (bytes), characters or components
    fn read_length_determinant(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
    ) -> Result<LengthDeterminant, Error>;

    /// Reads length determinants until a complete one was found, `f` is called for the
    /// amount of items each determinant announces. Returns the total amount of items.
    fn read_fragmented<F: FnMut(&mut Self, u64) -> Result<(), Error>>(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
        f: F,
    ) -> Result<u64, Error>;

    /// Reads `len` octets starting at the current position, no alignment is performed
    fn read_octets(&mut self, len: usize) -> Result<Bytes, Error>;

    fn read_bitstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
    ) -> Result<(Vec<u8>, u64), Error>;

    fn read_octetstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
    ) -> Result<Bytes, Error>;

    /// Returns the index and whether it belongs to an extension alternative
    fn read_choice_index(&mut self, upper_bound: u64, extensible: bool)
        -> Result<(u64, bool), Error>;

    fn read_enumeration_index(&mut self, upper_bound: u64, extensible: bool)
        -> Result<u64, Error>;
}

pub trait PackedWrite {
    /// Pads the current octet with zero bits, if the writer is aligned
    fn align(&mut self) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 12, the boolean type is represented
    /// through a single bit, where 1 represents `true` and 0 represents `false`.
    fn write_boolean(&mut self, boolean: bool) -> Result<(), Error>;

    /// Writes the `bit_len` (at most 64) least significant bits of `value`
    fn write_non_negative_binary_integer(&mut self, bit_len: usize, value: u64)
        -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.4, the two's-complement
    /// binary integer in the given amount of octets
    fn write_2s_compliment_binary_integer(&mut self, octets: u64, value: i64)
        -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.5, a constrained whole number
    /// is a whole number with a lower- and upper-bound constrained
    fn write_constrained_whole_number(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
        value: i64,
    ) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.7, a semi constrained whole
    /// number is a whole number with a lower-bound constrained but no upper-bound constrained
    fn write_semi_constrained_whole_number(
        &mut self,
        lower_bound: i64,
        value: i64,
    ) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.8, a whole number without any
    /// constraints, encoded as two's-complement
    fn write_unconstrained_whole_number(&mut self, value: i64) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.6, an unconstrained integer
    /// where small numbers appear more often the large numbers.
    fn write_normally_small_non_negative_whole_number(&mut self, value: u64) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9.3.4, a length that is
    /// likely to be small and never zero
    fn write_normally_small_length(&mut self, length: u64) -> Result<(), Error>;

    /// According to ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9, the length determinant is
    /// a number used to count bits, octets (bytes), characters or components.
    ///
    /// For lengths of 16K and more in the unconstrained form, only a fragment is announced.
    /// The caller has to write the announced items and continue with another length
    /// determinant for the remainder, see [`PackedWrite::write_fragmented`].
    fn write_length_determinant(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
        length: u64,
    ) -> Result<LengthDeterminant, Error>;

    /// Writes `total` items as a sequence of length determinants, each followed by the
    /// items it announces, which are written by `f`
    fn write_fragmented<F: FnMut(&mut Self, Range<usize>) -> Result<(), Error>>(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
        total: u64,
        f: F,
    ) -> Result<(), Error>;

    /// Writes the octets at the current position, no alignment is performed
    fn write_octets(&mut self, src: &[u8]) -> Result<(), Error>;

    fn write_bitstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
        src: &[u8],
        len: u64,
    ) -> Result<(), Error>;

    fn write_octetstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
        src: &[u8],
    ) -> Result<(), Error>;

    /// Returns whether the index was written as extension alternative
    fn write_choice_index(
        &mut self,
        upper_bound: u64,
        extensible: bool,
        index: u64,
    ) -> Result<bool, Error>;

    fn write_enumeration_index(
        &mut self,
        upper_bound: u64,
        extensible: bool,
        index: u64,
    ) -> Result<(), Error>;
}

/// The amount of bits needed to represent `value`, zero for zero
#[inline]
pub const fn bits_for(value: u64) -> usize {
    (u64::BITS - value.leading_zeros()) as usize
}

/// The amount of octets needed to represent `value`, at least one
#[inline]
pub const fn octets_for(value: u64) -> u64 {
    let octets = (bits_for(value) + BYTE_LEN - 1) / BYTE_LEN;
    if octets == 0 {
        1
    } else {
        octets as u64
    }
}

/// The amount of octets needed to represent `value` as two's-complement number
#[inline]
pub const fn octets_for_signed(value: i64) -> u64 {
    let magnitude = if value < 0 { !value } else { value } as u64;
    // one additional bit for the sign
    ((bits_for(magnitude) + 1 + BYTE_LEN - 1) / BYTE_LEN) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_for() {
        assert_eq!(0, bits_for(0));
        assert_eq!(1, bits_for(1));
        assert_eq!(4, bits_for(15));
        assert_eq!(8, bits_for(255));
        assert_eq!(9, bits_for(256));
        assert_eq!(64, bits_for(u64::MAX));
    }

    #[test]
    fn test_octets_for() {
        assert_eq!(1, octets_for(0));
        assert_eq!(1, octets_for(255));
        assert_eq!(2, octets_for(256));
        assert_eq!(5, octets_for(10_000_000_000));
        assert_eq!(8, octets_for(u64::MAX));
    }

    #[test]
    fn test_octets_for_signed() {
        assert_eq!(1, octets_for_signed(0));
        assert_eq!(1, octets_for_signed(127));
        assert_eq!(2, octets_for_signed(128));
        assert_eq!(1, octets_for_signed(-128));
        assert_eq!(2, octets_for_signed(-129));
        assert_eq!(8, octets_for_signed(i64::MIN));
        assert_eq!(8, octets_for_signed(i64::MAX));
    }
}
