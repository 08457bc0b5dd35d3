use crate::io::per::bits_for;
use crate::io::per::octets_for;
use crate::io::per::octets_for_signed;
use crate::io::per::Alignment;
use crate::io::per::Error;
use crate::io::per::ErrorKind;
use crate::io::per::LengthDeterminant;
use crate::io::per::PackedRead;
use crate::io::per::PackedWrite;
use crate::io::per::Violation;
use crate::io::per::BYTE_LEN;
use crate::io::per::FRAGMENT_SIZE;
use crate::io::per::LENGTH_64K;
use byteorder::ByteOrder;
use byteorder::NetworkEndian;
use bytes::Bytes;
use bytes::BytesMut;
use std::ops::Range;

pub mod buffer;
pub mod slice;

const U64_LEN: usize = std::mem::size_of::<u64>();

pub trait BitRead {
    /// Plain slices have no notion of alignment and are always read aligned
    #[inline]
    fn alignment(&self) -> Alignment {
        Alignment::Aligned
    }

    /// The read position in bits
    fn position(&self) -> usize;

    fn remaining(&self) -> usize;

    fn read_bit(&mut self) -> Result<bool, Error>;

    fn read_bits(&mut self, dst: &mut [u8]) -> Result<(), Error>;

    fn read_bits_with_offset(
        &mut self,
        dst: &mut [u8],
        dst_bit_offset: usize,
    ) -> Result<(), Error>;

    fn read_bits_with_len(&mut self, dst: &mut [u8], dst_bit_len: usize) -> Result<(), Error>;

    fn read_bits_with_offset_len(
        &mut self,
        dst: &mut [u8],
        dst_bit_offset: usize,
        dst_bit_len: usize,
    ) -> Result<(), Error>;

    fn skip_bits(&mut self, bit_len: usize) -> Result<(), Error>;

    /// Reads whole octets from the current bit position. Implementations backed by shared
    /// memory may hand out a view instead of a copy.
    fn read_bytes(&mut self, len: usize) -> Result<Bytes, Error> {
        ensure_remaining(self, len.saturating_mul(BYTE_LEN))?;
        let mut buffer = vec![0u8; len];
        self.read_bits(&mut buffer[..])?;
        Ok(Bytes::from(buffer))
    }
}

pub trait BitWrite {
    #[inline]
    fn alignment(&self) -> Alignment {
        Alignment::Aligned
    }

    /// The write position in bits
    fn position(&self) -> usize;

    fn write_bit(&mut self, bit: bool) -> Result<(), Error>;

    fn write_bits(&mut self, src: &[u8]) -> Result<(), Error>;

    fn write_bits_with_offset(&mut self, src: &[u8], src_bit_offset: usize) -> Result<(), Error>;

    fn write_bits_with_len(&mut self, src: &[u8], bit_len: usize) -> Result<(), Error>;

    fn write_bits_with_offset_len(
        &mut self,
        src: &[u8],
        src_bit_offset: usize,
        src_bit_len: usize,
    ) -> Result<(), Error>;
}

#[inline]
fn ensure_remaining<T: BitRead + ?Sized>(reader: &T, bit_len: usize) -> Result<(), Error> {
    let remaining = reader.remaining();
    if bit_len > remaining {
        Err(Error::truncated_input(bit_len as u64, remaining as u64))
    } else {
        Ok(())
    }
}

#[inline]
fn padding(position: usize) -> usize {
    (BYTE_LEN - position % BYTE_LEN) % BYTE_LEN
}

/// Amount of values in `lower..=upper`, which does not fit into an `u64` for the full `i64` range
#[inline]
fn range_of(lower_bound: i64, upper_bound: i64) -> u128 {
    (i128::from(upper_bound) - i128::from(lower_bound) + 1).max(1) as u128
}

fn complete(determinant: LengthDeterminant) -> Result<u64, Error> {
    match determinant {
        LengthDeterminant::Complete(length) => Ok(length),
        LengthDeterminant::Fragment(length) => Err(Error::unsupported_length(length)),
    }
}

impl<T: BitRead> PackedRead for T {
    #[inline]
    fn align(&mut self) -> Result<(), Error> {
        match self.alignment() {
            Alignment::Aligned => self.skip_bits(padding(self.position())),
            Alignment::Unaligned => Ok(()),
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 12
    #[inline]
    fn read_boolean(&mut self) -> Result<bool, Error> {
        self.read_bit()
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.3
    fn read_non_negative_binary_integer(&mut self, bit_len: usize) -> Result<u64, Error> {
        if bit_len > U64_LEN * BYTE_LEN {
            return Err(Error::unsupported_length(
                ((bit_len + BYTE_LEN - 1) / BYTE_LEN) as u64,
            ));
        }
        let mut bytes = [0u8; U64_LEN];
        self.read_bits_with_offset(&mut bytes, U64_LEN * BYTE_LEN - bit_len)?;
        Ok(NetworkEndian::read_u64(&bytes))
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.4
    fn read_2s_compliment_binary_integer(&mut self, octets: u64) -> Result<i64, Error> {
        if octets > U64_LEN as u64 {
            return Err(Error::unsupported_length(octets));
        }
        let offset = U64_LEN - octets as usize;
        let mut bytes = [0u8; U64_LEN];
        self.read_bits(&mut bytes[offset..])?;
        // most significant bit set -> negative number, sign extend
        if octets > 0 && bytes[offset] & 0x80 != 0 {
            bytes[..offset].iter_mut().for_each(|byte| *byte = 0xFF);
        }
        Ok(NetworkEndian::read_i64(&bytes))
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.5
    fn read_constrained_whole_number(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
    ) -> Result<i64, Error> {
        let range = range_of(lower_bound, upper_bound);
        let offset = if range == 1 {
            0
        } else if range <= 255 {
            // 11.5.7.1: bit-field, not octet-aligned
            self.read_non_negative_binary_integer(bits_for((range - 1) as u64))?
        } else if range == 256 {
            // 11.5.7.2: one octet, octet-aligned
            self.align()?;
            self.read_non_negative_binary_integer(BYTE_LEN)?
        } else if range <= 65536 {
            // 11.5.7.3: two octets, octet-aligned
            self.align()?;
            self.read_non_negative_binary_integer(2 * BYTE_LEN)?
        } else {
            // 11.5.7.4: the octet count as constrained length, then the octets
            let max_octets = octets_for((range - 1) as u64);
            let octets = complete(self.read_length_determinant(1, Some(max_octets))?)?;
            self.align()?;
            self.read_non_negative_binary_integer(octets as usize * BYTE_LEN)?
        };

        let value = i128::from(lower_bound) + i128::from(offset);
        if value > i128::from(upper_bound) {
            Err(Error::value_not_in_range(
                i64::try_from(value).unwrap_or(i64::MAX),
                lower_bound,
                upper_bound,
            ))
        } else {
            Ok(value as i64)
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.7
    fn read_semi_constrained_whole_number(&mut self, lower_bound: i64) -> Result<i64, Error> {
        let octets = complete(self.read_length_determinant(0, None)?)?;
        self.align()?;
        let offset = self.read_non_negative_binary_integer(octets as usize * BYTE_LEN)?;
        let value = i128::from(lower_bound) + i128::from(offset);
        i64::try_from(value).map_err(|_| Error::value_not_in_range(i64::MAX, lower_bound, i64::MAX))
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.8
    fn read_unconstrained_whole_number(&mut self) -> Result<i64, Error> {
        let octets = complete(self.read_length_determinant(0, None)?)?;
        self.align()?;
        self.read_2s_compliment_binary_integer(octets)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.6
    fn read_normally_small_non_negative_whole_number(&mut self) -> Result<u64, Error> {
        let greater_or_equal_to_64 = self.read_boolean()?;
        if greater_or_equal_to_64 {
            // 11.6.2: as semi-constrained whole number with a lower bound of zero
            let octets = complete(self.read_length_determinant(0, None)?)?;
            self.align()?;
            self.read_non_negative_binary_integer(octets as usize * BYTE_LEN)
        } else {
            // 11.6.1
            self.read_non_negative_binary_integer(6)
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9.3.4
    fn read_normally_small_length(&mut self) -> Result<u64, Error> {
        let greater_than_64 = self.read_boolean()?;
        if greater_than_64 {
            complete(self.read_length_determinant(0, None)?)
        } else {
            Ok(self.read_non_negative_binary_integer(6)? + 1)
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9.4
    fn read_length_determinant(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
    ) -> Result<LengthDeterminant, Error> {
        match upper_bound {
            Some(upper_bound) if upper_bound < LENGTH_64K => {
                // 11.9.4.1 -> 11.9.3.3: constrained whole number
                let length =
                    self.read_constrained_whole_number(lower_bound as i64, upper_bound as i64)?;
                Ok(LengthDeterminant::Complete(length as u64))
            }
            _ => {
                // 11.9.4.2 -> 11.9.3.5
                self.align()?;
                let first = self.read_non_negative_binary_integer(BYTE_LEN)? as u8;
                if first & 0x80 == 0 {
                    // 11.9.3.6: less than or equal to 127
                    Ok(LengthDeterminant::Complete(u64::from(first)))
                } else if first & 0x40 == 0 {
                    // 11.9.3.7: greater than 127 and less than 16K
                    let second = self.read_non_negative_binary_integer(BYTE_LEN)?;
                    Ok(LengthDeterminant::Complete(
                        (u64::from(first & 0x3F) << BYTE_LEN) | second,
                    ))
                } else {
                    // 11.9.3.8: chunks of 16k multiples
                    let multiple = first & 0x3F;
                    if multiple == 0 || multiple > 4 {
                        Err(Error::invalid_fragment(multiple))
                    } else {
                        Ok(LengthDeterminant::Fragment(
                            u64::from(multiple) * FRAGMENT_SIZE,
                        ))
                    }
                }
            }
        }
    }

    fn read_fragmented<F: FnMut(&mut Self, u64) -> Result<(), Error>>(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
        mut f: F,
    ) -> Result<u64, Error> {
        let mut total = 0_u64;
        loop {
            let determinant = self.read_length_determinant(lower_bound, upper_bound)?;
            f(self, determinant.count())?;
            total += determinant.count();
            if !determinant.is_fragment() {
                return Ok(total);
            }
        }
    }

    #[inline]
    fn read_octets(&mut self, len: usize) -> Result<Bytes, Error> {
        self.read_bytes(len)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 16
    fn read_bitstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
    ) -> Result<(Vec<u8>, u64), Error> {
        let mut buffer = Vec::new();
        let mut bit_len = 0_u64;

        let mut append = |reader: &mut Self, count: u64| -> Result<(), Error> {
            reader.align()?;
            ensure_remaining(reader, count as usize)?;
            let total = bit_len + count;
            buffer.resize(((total + 7) / 8) as usize, 0u8);
            reader.read_bits_with_offset_len(&mut buffer[..], bit_len as usize, count as usize)?;
            bit_len = total;
            Ok(())
        };

        if extensible && self.read_bit()? {
            // 16.6: outside of the extension root, semi-constrained length
            self.read_fragmented(0, None, &mut append)?;
            return Ok((buffer, bit_len));
        }

        match upper_bound_size {
            // 16.8
            Some(0) => {}
            // 16.9
            Some(upper) if upper == lower_bound_size && upper <= 16 => {
                ensure_remaining(self, upper as usize)?;
                let mut bits = vec![0u8; ((upper + 7) / 8) as usize];
                self.read_bits_with_len(&mut bits[..], upper as usize)?;
                return Ok((bits, upper));
            }
            // 16.10
            Some(upper) if upper == lower_bound_size && upper < LENGTH_64K => {
                append(self, upper)?;
            }
            // 16.11
            _ => {
                let total = self.read_fragmented(lower_bound_size, upper_bound_size, &mut append)?;
                check_size(total, lower_bound_size, upper_bound_size)?;
            }
        }

        Ok((buffer, bit_len))
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 17
    fn read_octetstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
    ) -> Result<Bytes, Error> {
        let mut parts = Vec::new();
        let mut append = |reader: &mut Self, count: u64| -> Result<(), Error> {
            reader.align()?;
            parts.push(reader.read_bytes(count as usize)?);
            Ok(())
        };

        if extensible && self.read_bit()? {
            // 17.3: outside of the extension root, semi-constrained length
            self.read_fragmented(0, None, &mut append)?;
        } else {
            match upper_bound_size {
                // 17.5
                Some(0) => {}
                // 17.6
                Some(upper) if upper == lower_bound_size && upper <= 2 => {
                    return self.read_bytes(upper as usize);
                }
                // 17.7
                Some(upper) if upper == lower_bound_size && upper < LENGTH_64K => {
                    append(self, upper)?;
                }
                // 17.8
                _ => {
                    let total =
                        self.read_fragmented(lower_bound_size, upper_bound_size, &mut append)?;
                    check_size(total, lower_bound_size, upper_bound_size)?;
                }
            }
        }

        let mut parts = parts.into_iter();
        Ok(match (parts.next(), parts.len()) {
            (None, _) => Bytes::new(),
            (Some(first), 0) => first,
            (Some(first), _) => {
                let mut joined = BytesMut::from(&first[..]);
                parts.for_each(|part| joined.extend_from_slice(&part));
                joined.freeze()
            }
        })
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 23
    fn read_choice_index(
        &mut self,
        upper_bound: u64,
        extensible: bool,
    ) -> Result<(u64, bool), Error> {
        if extensible && self.read_bit()? {
            // 23.8
            let index = self.read_normally_small_non_negative_whole_number()?;
            index
                .checked_add(upper_bound + 1)
                .map(|index| (index, true))
                .ok_or_else(|| Error::unknown_choice_index(index, upper_bound + 1))
        } else {
            // 23.7
            match self.read_constrained_whole_number(0, upper_bound as i64) {
                Ok(index) => Ok((index as u64, false)),
                Err(e) => match e.kind() {
                    ErrorKind::ConstraintViolation(Violation::ValueNotInRange { value, .. }) => {
                        Err(Error::unknown_choice_index(*value as u64, upper_bound + 1))
                    }
                    _ => Err(e),
                },
            }
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 14
    fn read_enumeration_index(&mut self, upper_bound: u64, extensible: bool) -> Result<u64, Error> {
        if extensible && self.read_bit()? {
            // 14.3
            let index = self.read_normally_small_non_negative_whole_number()?;
            index.checked_add(upper_bound + 1).ok_or_else(|| {
                Error::value_not_in_range(
                    i64::try_from(index).unwrap_or(i64::MAX),
                    0,
                    upper_bound as i64,
                )
            })
        } else {
            // 14.2
            Ok(self.read_constrained_whole_number(0, upper_bound as i64)? as u64)
        }
    }
}

fn check_size(size: u64, lower_bound: u64, upper_bound: Option<u64>) -> Result<(), Error> {
    if size < lower_bound || upper_bound.is_some_and(|upper| size > upper) {
        Err(Error::size_not_in_range(
            size,
            lower_bound,
            upper_bound.unwrap_or(u64::MAX),
        ))
    } else {
        Ok(())
    }
}

impl<T: BitWrite> PackedWrite for T {
    fn align(&mut self) -> Result<(), Error> {
        if self.alignment() == Alignment::Aligned {
            for _ in 0..padding(self.position()) {
                self.write_bit(false)?;
            }
        }
        Ok(())
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 12
    #[inline]
    fn write_boolean(&mut self, boolean: bool) -> Result<(), Error> {
        self.write_bit(boolean)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.3
    fn write_non_negative_binary_integer(&mut self, bit_len: usize, value: u64) -> Result<(), Error> {
        if bit_len > U64_LEN * BYTE_LEN {
            return Err(Error::unsupported_length(
                ((bit_len + BYTE_LEN - 1) / BYTE_LEN) as u64,
            ));
        }
        let mut bytes = [0u8; U64_LEN];
        NetworkEndian::write_u64(&mut bytes, value);
        self.write_bits_with_offset(&bytes, U64_LEN * BYTE_LEN - bit_len)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.4
    fn write_2s_compliment_binary_integer(&mut self, octets: u64, value: i64) -> Result<(), Error> {
        if octets > U64_LEN as u64 {
            return Err(Error::unsupported_length(octets));
        }
        let mut bytes = [0u8; U64_LEN];
        NetworkEndian::write_i64(&mut bytes, value);
        self.write_bits(&bytes[U64_LEN - octets as usize..])
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.5
    fn write_constrained_whole_number(
        &mut self,
        lower_bound: i64,
        upper_bound: i64,
        value: i64,
    ) -> Result<(), Error> {
        if value < lower_bound || value > upper_bound {
            return Err(Error::value_not_in_range(value, lower_bound, upper_bound));
        }
        let range = range_of(lower_bound, upper_bound);
        let offset = (i128::from(value) - i128::from(lower_bound)) as u64;

        if range == 1 {
            // 11.5.4: empty bit-field
            Ok(())
        } else if range <= 255 {
            // 11.5.7.1
            self.write_non_negative_binary_integer(
                bits_for((range - 1) as u64),
                offset,
            )
        } else if range == 256 {
            // 11.5.7.2
            self.align()?;
            self.write_non_negative_binary_integer(BYTE_LEN, offset)
        } else if range <= 65536 {
            // 11.5.7.3
            self.align()?;
            self.write_non_negative_binary_integer(2 * BYTE_LEN, offset)
        } else {
            // 11.5.7.4
            let max_octets = octets_for((range - 1) as u64);
            let octets = octets_for(offset);
            self.write_length_determinant(1, Some(max_octets), octets)?;
            self.align()?;
            self.write_non_negative_binary_integer(octets as usize * BYTE_LEN, offset)
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.7
    fn write_semi_constrained_whole_number(
        &mut self,
        lower_bound: i64,
        value: i64,
    ) -> Result<(), Error> {
        if value < lower_bound {
            return Err(Error::value_not_in_range(value, lower_bound, i64::MAX));
        }
        let offset = (i128::from(value) - i128::from(lower_bound)) as u64;
        let octets = octets_for(offset);
        self.write_length_determinant(0, None, octets)?;
        self.align()?;
        self.write_non_negative_binary_integer(octets as usize * BYTE_LEN, offset)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.8
    fn write_unconstrained_whole_number(&mut self, value: i64) -> Result<(), Error> {
        let octets = octets_for_signed(value);
        self.write_length_determinant(0, None, octets)?;
        self.align()?;
        self.write_2s_compliment_binary_integer(octets, value)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.6
    fn write_normally_small_non_negative_whole_number(&mut self, value: u64) -> Result<(), Error> {
        if value <= 63 {
            // 11.6.1
            self.write_boolean(false)?;
            self.write_non_negative_binary_integer(6, value)
        } else {
            // 11.6.2
            self.write_boolean(true)?;
            let octets = octets_for(value);
            self.write_length_determinant(0, None, octets)?;
            self.align()?;
            self.write_non_negative_binary_integer(octets as usize * BYTE_LEN, value)
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9.3.4
    fn write_normally_small_length(&mut self, length: u64) -> Result<(), Error> {
        if length == 0 {
            Err(Error::size_not_in_range(0, 1, u64::MAX))
        } else if length <= 64 {
            self.write_boolean(false)?;
            self.write_non_negative_binary_integer(6, length - 1)
        } else {
            self.write_boolean(true)?;
            complete(self.write_length_determinant(0, None, length)?).map(drop)
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 11.9.4
    fn write_length_determinant(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
        length: u64,
    ) -> Result<LengthDeterminant, Error> {
        match upper_bound {
            Some(upper_bound) if upper_bound < LENGTH_64K => {
                // 11.9.4.1 -> 11.9.3.3
                if length < lower_bound || length > upper_bound {
                    return Err(Error::size_not_in_range(length, lower_bound, upper_bound));
                }
                self.write_constrained_whole_number(
                    lower_bound as i64,
                    upper_bound as i64,
                    length as i64,
                )?;
                Ok(LengthDeterminant::Complete(length))
            }
            _ => {
                // 11.9.4.2 -> 11.9.3.5
                self.align()?;
                if length <= 127 {
                    // 11.9.3.6
                    self.write_non_negative_binary_integer(BYTE_LEN, length)?;
                    Ok(LengthDeterminant::Complete(length))
                } else if length < FRAGMENT_SIZE {
                    // 11.9.3.7
                    self.write_non_negative_binary_integer(2 * BYTE_LEN, 0x8000 | length)?;
                    Ok(LengthDeterminant::Complete(length))
                } else {
                    // 11.9.3.8
                    let multiple = (length / FRAGMENT_SIZE).min(4);
                    self.write_non_negative_binary_integer(BYTE_LEN, 0xC0 | multiple)?;
                    Ok(LengthDeterminant::Fragment(multiple * FRAGMENT_SIZE))
                }
            }
        }
    }

    fn write_fragmented<F: FnMut(&mut Self, Range<usize>) -> Result<(), Error>>(
        &mut self,
        lower_bound: u64,
        upper_bound: Option<u64>,
        total: u64,
        mut f: F,
    ) -> Result<(), Error> {
        let mut offset = 0_u64;
        loop {
            let determinant = self.write_length_determinant(lower_bound, upper_bound, total - offset)?;
            let end = offset + determinant.count();
            f(self, offset as usize..end as usize)?;
            offset = end;
            if !determinant.is_fragment() {
                return Ok(());
            }
        }
    }

    #[inline]
    fn write_octets(&mut self, src: &[u8]) -> Result<(), Error> {
        self.write_bits(src)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 16
    fn write_bitstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
        src: &[u8],
        len: u64,
    ) -> Result<(), Error> {
        let out_of_root = len < lower_bound_size || upper_bound_size.is_some_and(|u| len > u);
        if extensible {
            self.write_bit(out_of_root)?;
        }

        let write_aligned = |writer: &mut Self, bits: Range<usize>| -> Result<(), Error> {
            writer.align()?;
            writer.write_bits_with_offset_len(src, bits.start, bits.len())
        };

        if out_of_root {
            if !extensible {
                check_size(len, lower_bound_size, upper_bound_size)?;
            }
            // 16.6
            return self.write_fragmented(0, None, len, write_aligned);
        }

        match upper_bound_size {
            // 16.8
            Some(0) => Ok(()),
            // 16.9
            Some(upper) if upper == lower_bound_size && upper <= 16 => {
                self.write_bits_with_len(src, len as usize)
            }
            // 16.10
            Some(upper) if upper == lower_bound_size && upper < LENGTH_64K => {
                self.align()?;
                self.write_bits_with_len(src, len as usize)
            }
            // 16.11
            _ => self.write_fragmented(lower_bound_size, upper_bound_size, len, write_aligned),
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 17
    fn write_octetstring(
        &mut self,
        lower_bound_size: u64,
        upper_bound_size: Option<u64>,
        extensible: bool,
        src: &[u8],
    ) -> Result<(), Error> {
        let len = src.len() as u64;
        let out_of_root = len < lower_bound_size || upper_bound_size.is_some_and(|u| len > u);
        if extensible {
            self.write_bit(out_of_root)?;
        }

        let write_aligned = |writer: &mut Self, octets: Range<usize>| -> Result<(), Error> {
            writer.align()?;
            writer.write_bits(&src[octets])
        };

        if out_of_root {
            if !extensible {
                check_size(len, lower_bound_size, upper_bound_size)?;
            }
            // 17.3
            return self.write_fragmented(0, None, len, write_aligned);
        }

        match upper_bound_size {
            // 17.5
            Some(0) => Ok(()),
            // 17.6
            Some(upper) if upper == lower_bound_size && upper <= 2 => self.write_bits(src),
            // 17.7
            Some(upper) if upper == lower_bound_size && upper < LENGTH_64K => {
                self.align()?;
                self.write_bits(src)
            }
            // 17.8
            _ => self.write_fragmented(lower_bound_size, upper_bound_size, len, write_aligned),
        }
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 23
    fn write_choice_index(
        &mut self,
        upper_bound: u64,
        extensible: bool,
        index: u64,
    ) -> Result<bool, Error> {
        let is_extension = index > upper_bound;
        if extensible {
            self.write_bit(is_extension)?;
        } else if is_extension {
            return Err(Error::unknown_choice_index(index, upper_bound + 1));
        }

        if is_extension {
            // 23.8
            self.write_normally_small_non_negative_whole_number(index - upper_bound - 1)?;
        } else {
            // 23.7
            self.write_constrained_whole_number(0, upper_bound as i64, index as i64)?;
        }
        Ok(is_extension)
    }

    /// ITU-TX.691 | ISO/IEC 8825-2:2015, chapter 14
    fn write_enumeration_index(
        &mut self,
        upper_bound: u64,
        extensible: bool,
        index: u64,
    ) -> Result<(), Error> {
        let is_extension = index > upper_bound;
        if extensible {
            self.write_bit(is_extension)?;
        }

        if is_extension && extensible {
            // 14.3
            self.write_normally_small_non_negative_whole_number(index - upper_bound - 1)
        } else {
            // 14.2, fails for an out of range value of a non-extensible enumeration
            self.write_constrained_whole_number(
                0,
                upper_bound as i64,
                i64::try_from(index).unwrap_or(i64::MAX),
            )
        }
    }
}
