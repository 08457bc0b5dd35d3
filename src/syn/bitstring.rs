use crate::io::per::Error;
use crate::syn::info::Constraint;
use log::warn;
use std::cmp::Ordering;

/// Bits stored from the most significant bit of the first octet on, the trailing bits of the
/// last octet are kept zero
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct BitVec(Vec<u8>, u64);

impl BitVec {
    pub fn with_len(bits: u64) -> Self {
        BitVec(vec![0x00; byte_len_for(bits)], bits)
    }

    /// Uses the first `bit_len` bits of `bytes`, missing octets are zero filled
    pub fn from_bytes(mut bytes: Vec<u8>, bit_len: u64) -> Self {
        bytes.resize(byte_len_for(bit_len), 0x00);
        let mut bits = BitVec(bytes, bit_len);
        bits.clear_trailing_bits();
        bits
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        let mut vec = Self::with_len(bits.len() as u64);
        for (index, bit) in bits.iter().enumerate() {
            vec.set_bit(index as u64, *bit);
        }
        vec
    }

    /// Out of range positions are reported as unset
    pub fn bit(&self, bit: u64) -> bool {
        if bit >= self.1 {
            warn!("Read of bit {} beyond the length of {} bits", bit, self.1);
            return false;
        }
        let mask = 0x80_u8 >> (bit % 8);
        self.0[(bit / 8) as usize] & mask != 0
    }

    /// Writes to out of range positions are ignored
    pub fn set_bit(&mut self, bit: u64, value: bool) {
        if bit >= self.1 {
            warn!(
                "Ignoring write of bit {} beyond the length of {} bits",
                bit, self.1
            );
            return;
        }
        let mask = 0x80_u8 >> (bit % 8);
        if value {
            self.0[(bit / 8) as usize] |= mask;
        } else {
            self.0[(bit / 8) as usize] &= !mask;
        }
    }

    /// Truncates or zero-extends to `bits`, which has to satisfy the size constraint
    pub fn resize(&mut self, bits: u64, constraint: &Constraint) -> Result<(), Error> {
        if !constraint.is_extensible() && !constraint.contains_size(bits) {
            let (lower, upper) = constraint.size_bounds();
            return Err(Error::size_not_in_range(
                bits,
                lower,
                upper.unwrap_or(u64::MAX),
            ));
        }
        self.0.resize(byte_len_for(bits), 0x00);
        self.1 = bits;
        self.clear_trailing_bits();
        Ok(())
    }

    /// Whether any bit is set
    pub fn any(&self) -> bool {
        self.0.iter().any(|byte| *byte != 0)
    }

    #[inline]
    pub fn bit_len(&self) -> u64 {
        self.1
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_byte_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.1).map(move |bit| self.0[(bit / 8) as usize] & (0x80 >> (bit % 8)) != 0)
    }

    fn clear_trailing_bits(&mut self) {
        let used = (self.1 % 8) as u32;
        if used != 0 {
            if let Some(last) = self.0.last_mut() {
                *last &= 0xFF_u8.checked_shl(8 - used).unwrap_or(0);
            }
        }
    }
}

impl PartialOrd for BitVec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shorter bit strings order first, equally long ones by their content
impl Ord for BitVec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1.cmp(&other.1).then_with(|| self.0.cmp(&other.0))
    }
}

#[inline]
fn byte_len_for(bits: u64) -> usize {
    ((bits + 7) / 8) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut bits = BitVec::with_len(10);
        bits.set_bit(0, true);
        bits.set_bit(9, true);
        assert_eq!(&[0x80, 0x40], bits.as_byte_slice());
        bits.set_bit(0, false);
        assert_eq!(&[0x00, 0x40], bits.as_byte_slice());
        assert!(bits.bit(9));
        assert!(!bits.bit(8));
    }

    #[test]
    fn test_out_of_range_is_no_op() {
        let mut bits = BitVec::with_len(3);
        bits.set_bit(3, true);
        assert!(!bits.bit(3));
        assert!(!bits.any());
        assert_eq!(3, bits.bit_len());
    }

    #[test]
    fn test_resize_validates_constraint() {
        let mut bits = BitVec::from_bits(&[true, true, true]);
        assert!(bits
            .resize(5, &Constraint::constrained(1, 4))
            .unwrap_err()
            .is_constraint_violation());

        bits.resize(2, &Constraint::constrained(1, 4)).unwrap();
        assert_eq!(&[0xC0], bits.as_byte_slice());

        // out of the root but extensible
        bits.resize(9, &Constraint::ext_constrained(1, 4)).unwrap();
        assert_eq!(9, bits.bit_len());
        assert_eq!(&[0xC0, 0x00], bits.as_byte_slice());
    }

    #[test]
    fn test_from_bytes_clears_trailing_bits() {
        let bits = BitVec::from_bytes(vec![0xFF], 3);
        assert_eq!(&[0xE0], bits.as_byte_slice());
        assert_eq!(vec![true, true, true], bits.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_ordering() {
        assert!(BitVec::with_len(2) < BitVec::with_len(3));
        assert!(BitVec::from_bits(&[false, true]) < BitVec::from_bits(&[true, false]));
    }
}
