use super::BitRead;
use super::BitWrite;
use crate::io::per::Error;
use crate::io::per::BYTE_LEN;

impl BitRead for (&[u8], &mut usize) {
    #[inline]
    fn position(&self) -> usize {
        *self.1
    }

    #[inline]
    fn remaining(&self) -> usize {
        (self.0.len() * BYTE_LEN).saturating_sub(*self.1)
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Error> {
        if *self.1 >= self.0.len() * BYTE_LEN {
            return Err(Error::truncated_input(1, 0));
        }
        let bit = self.0[*self.1 / BYTE_LEN] & (0x80 >> (*self.1 % BYTE_LEN)) != 0;
        *self.1 += 1;
        Ok(bit)
    }

    #[inline]
    fn read_bits(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        self.read_bits_with_offset_len(dst, 0, dst.len() * BYTE_LEN)
    }

    #[inline]
    fn read_bits_with_offset(
        &mut self,
        dst: &mut [u8],
        dst_bit_offset: usize,
    ) -> Result<(), Error> {
        self.read_bits_with_offset_len(dst, dst_bit_offset, dst.len() * BYTE_LEN - dst_bit_offset)
    }

    #[inline]
    fn read_bits_with_len(&mut self, dst: &mut [u8], dst_bit_len: usize) -> Result<(), Error> {
        self.read_bits_with_offset_len(dst, 0, dst_bit_len)
    }

    #[inline]
    fn read_bits_with_offset_len(
        &mut self,
        dst: &mut [u8],
        dst_bit_offset: usize,
        dst_bit_len: usize,
    ) -> Result<(), Error> {
        bit_string_copy_bulked(self.0, *self.1, dst, dst_bit_offset, dst_bit_len)?;
        *self.1 += dst_bit_len;
        Ok(())
    }

    #[inline]
    fn skip_bits(&mut self, bit_len: usize) -> Result<(), Error> {
        let remaining = self.remaining();
        if bit_len > remaining {
            return Err(Error::truncated_input(bit_len as u64, remaining as u64));
        }
        *self.1 += bit_len;
        Ok(())
    }
}

/// Writes into a fixed size slice, running out of space is reported as truncation of the
/// destination
impl<'a> BitWrite for (&'a mut [u8], &mut usize) {
    #[inline]
    fn position(&self) -> usize {
        *self.1
    }

    #[inline]
    fn write_bit(&mut self, bit: bool) -> Result<(), Error> {
        if *self.1 + 1 > self.0.len() * BYTE_LEN {
            return Err(Error::truncated_input(1, 0));
        }
        if bit {
            self.0[*self.1 / BYTE_LEN] |= 0x80 >> (*self.1 % BYTE_LEN);
        } else {
            self.0[*self.1 / BYTE_LEN] &= !(0x80 >> (*self.1 % BYTE_LEN));
        }
        *self.1 += 1;
        Ok(())
    }

    #[inline]
    fn write_bits(&mut self, src: &[u8]) -> Result<(), Error> {
        self.write_bits_with_offset(src, 0)
    }

    #[inline]
    fn write_bits_with_offset(&mut self, src: &[u8], src_bit_offset: usize) -> Result<(), Error> {
        self.write_bits_with_offset_len(src, src_bit_offset, src.len() * BYTE_LEN - src_bit_offset)
    }

    #[inline]
    fn write_bits_with_len(&mut self, src: &[u8], bit_len: usize) -> Result<(), Error> {
        self.write_bits_with_offset_len(src, 0, bit_len)
    }

    #[inline]
    fn write_bits_with_offset_len(
        &mut self,
        src: &[u8],
        src_bit_offset: usize,
        src_bit_len: usize,
    ) -> Result<(), Error> {
        bit_string_copy_bulked(src, src_bit_offset, self.0, *self.1, src_bit_len)?;
        *self.1 += src_bit_len;
        Ok(())
    }
}

#[inline]
fn check_bounds(
    src: &[u8],
    src_bit_position: usize,
    dst: &[u8],
    dst_bit_position: usize,
    len: usize,
) -> Result<(), Error> {
    let src_remaining = (src.len() * BYTE_LEN).saturating_sub(src_bit_position);
    if src_remaining < len {
        return Err(Error::truncated_input(len as u64, src_remaining as u64));
    }
    let dst_remaining = (dst.len() * BYTE_LEN).saturating_sub(dst_bit_position);
    if dst_remaining < len {
        return Err(Error::truncated_input(len as u64, dst_remaining as u64));
    }
    Ok(())
}

#[inline]
fn bit_string_copy(
    src: &[u8],
    src_bit_position: usize,
    dst: &mut [u8],
    dst_bit_position: usize,
    len: usize,
) -> Result<(), Error> {
    check_bounds(src, src_bit_position, dst, dst_bit_position, len)?;
    for bit in 0..len {
        let src_position = src_bit_position + bit;
        let dst_position = dst_bit_position + bit;
        let src_mask = 0x80 >> (src_position % BYTE_LEN);
        let dst_mask = 0x80 >> (dst_position % BYTE_LEN);

        if src[src_position / BYTE_LEN] & src_mask != 0 {
            dst[dst_position / BYTE_LEN] |= dst_mask;
        } else {
            dst[dst_position / BYTE_LEN] &= !dst_mask;
        }
    }
    Ok(())
}

/// Copies whole octets at once, the source may start at any bit position. Shorter copies and
/// the trailing bits fall back to [`bit_string_copy`].
#[inline]
pub(crate) fn bit_string_copy_bulked(
    src: &[u8],
    src_bit_position: usize,
    dst: &mut [u8],
    dst_bit_position: usize,
    len: usize,
) -> Result<(), Error> {
    if len <= BYTE_LEN * 2 {
        return bit_string_copy(src, src_bit_position, dst, dst_bit_position, len);
    }
    check_bounds(src, src_bit_position, dst, dst_bit_position, len)?;

    // bring the destination to a full byte first
    let head = ((BYTE_LEN - (dst_bit_position % BYTE_LEN)) % BYTE_LEN).min(len);
    bit_string_copy(src, src_bit_position, dst, dst_bit_position, head)?;

    let src_bit_position = src_bit_position + head;
    let dst_byte_index = (dst_bit_position + head) / BYTE_LEN;
    let len = len - head;
    let len_in_bytes = len / BYTE_LEN;

    let src_byte_index = src_bit_position / BYTE_LEN;
    let src_offset = src_bit_position % BYTE_LEN;

    if src_offset == 0 {
        dst[dst_byte_index..dst_byte_index + len_in_bytes]
            .copy_from_slice(&src[src_byte_index..src_byte_index + len_in_bytes]);
    } else {
        for index in 0..len_in_bytes {
            let left = src[src_byte_index + index] << src_offset;
            // the last byte may end exactly within the current source byte
            let right = src
                .get(src_byte_index + index + 1)
                .map(|byte| byte >> (BYTE_LEN - src_offset))
                .unwrap_or_default();
            dst[dst_byte_index + index] = left | right;
        }
    }

    let tail = len % BYTE_LEN;
    if tail == 0 {
        Ok(())
    } else {
        bit_string_copy(
            src,
            src_bit_position + len_in_bytes * BYTE_LEN,
            dst,
            (dst_byte_index + len_in_bytes) * BYTE_LEN,
            tail,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::per::PackedRead;
    use crate::io::per::PackedWrite;

    #[test]
    fn test_write_read_bit() {
        let mut buffer = [0u8; 1];
        let mut pos = 0;
        let mut writer = (&mut buffer[..], &mut pos);
        writer.write_bit(true).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap();
        assert_eq!(3, pos);
        assert_eq!([0b1010_0000], buffer);

        let mut pos = 0;
        let mut reader = (&buffer[..], &mut pos);
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert_eq!(5, reader.remaining());
    }

    #[test]
    fn test_write_bit_clears() {
        let mut buffer = [0xFFu8; 1];
        let mut pos = 1;
        (&mut buffer[..], &mut pos).write_bit(false).unwrap();
        assert_eq!([0b1011_1111], buffer);
    }

    #[test]
    fn test_write_out_of_space() {
        let mut buffer = [0u8; 1];
        let mut pos = 0;
        let error = (&mut buffer[..], &mut pos)
            .write_bits(&[0xAB, 0xCD, 0xEF])
            .unwrap_err();
        assert!(error.is_truncated_input());
        assert_eq!(0, pos);
    }

    #[test]
    fn test_bulked_copy_unaligned_source() {
        let src = [0b0101_0101, 0b1010_1010, 0b1111_0000, 0b0000_1111];
        let mut dst = [0u8; 4];
        bit_string_copy_bulked(&src, 4, &mut dst, 0, 24).unwrap();
        assert_eq!([0b0101_1010, 0b1010_1111, 0b0000_0000, 0], dst);
    }

    #[test]
    fn test_bulked_copy_unaligned_destination() {
        let src = [0xFF, 0x00, 0xFF];
        let mut dst = [0u8; 4];
        bit_string_copy_bulked(&src, 0, &mut dst, 3, 24).unwrap();
        assert_eq!([0b0001_1111, 0b1110_0000, 0b0001_1111, 0b1110_0000], dst);
    }

    #[test]
    fn test_bulked_copy_matches_bitwise() {
        let src = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        for src_offset in 0..8 {
            for dst_offset in 0..8 {
                let mut bulked = [0u8; 7];
                let mut bitwise = [0u8; 7];
                bit_string_copy_bulked(&src, src_offset, &mut bulked, dst_offset, 37).unwrap();
                bit_string_copy(&src, src_offset, &mut bitwise, dst_offset, 37).unwrap();
                assert_eq!(bitwise, bulked, "src={src_offset} dst={dst_offset}");
            }
        }
    }

    #[test]
    fn test_read_past_end() {
        let src = [0u8; 2];
        let mut pos = 4;
        let error = (&src[..], &mut pos)
            .read_bits_with_len(&mut [0u8; 2], 13)
            .unwrap_err();
        assert!(error.is_truncated_input());
    }

    #[test]
    fn test_slice_is_always_aligned() {
        let mut buffer = [0u8; 3];
        let mut pos = 0;
        let mut writer = (&mut buffer[..], &mut pos);
        writer.write_boolean(true).unwrap();
        writer.write_length_determinant(0, None, 2).unwrap();
        writer.write_octets(&[0xAB]).unwrap();
        assert_eq!(24, pos);
        assert_eq!([0x80, 0x02, 0xAB], buffer);

        let mut pos = 0;
        let mut reader = (&buffer[..], &mut pos);
        assert!(reader.read_boolean().unwrap());
        assert_eq!(2, reader.read_length_determinant(0, None).unwrap().count());
        assert_eq!(&[0xAB], &reader.read_octets(1).unwrap()[..]);
    }
}
