use super::*;
use crate::io::buffer::BitBuffer;
use crate::io::buffer::Bits;

impl BitWrite for BitBuffer {
    #[inline]
    fn alignment(&self) -> Alignment {
        self.alignment
    }

    #[inline]
    fn position(&self) -> usize {
        self.write_position
    }

    #[inline]
    fn write_bit(&mut self, bit: bool) -> Result<(), Error> {
        self.ensure_can_write_additional_bits(1);
        BitWrite::write_bit(&mut (&mut self.buffer[..], &mut self.write_position), bit)
    }

    #[inline]
    fn write_bits(&mut self, src: &[u8]) -> Result<(), Error> {
        self.ensure_can_write_additional_bits(src.len() * BYTE_LEN);
        BitWrite::write_bits(&mut (&mut self.buffer[..], &mut self.write_position), src)
    }

    #[inline]
    fn write_bits_with_offset(&mut self, src: &[u8], src_bit_offset: usize) -> Result<(), Error> {
        self.ensure_can_write_additional_bits(
            (src.len() * BYTE_LEN).saturating_sub(src_bit_offset),
        );
        BitWrite::write_bits_with_offset(
            &mut (&mut self.buffer[..], &mut self.write_position),
            src,
            src_bit_offset,
        )
    }

    #[inline]
    fn write_bits_with_len(&mut self, src: &[u8], bit_len: usize) -> Result<(), Error> {
        self.ensure_can_write_additional_bits(bit_len);
        BitWrite::write_bits_with_len(
            &mut (&mut self.buffer[..], &mut self.write_position),
            src,
            bit_len,
        )
    }

    #[inline]
    fn write_bits_with_offset_len(
        &mut self,
        src: &[u8],
        src_bit_offset: usize,
        src_bit_len: usize,
    ) -> Result<(), Error> {
        self.ensure_can_write_additional_bits(src_bit_len);
        BitWrite::write_bits_with_offset_len(
            &mut (&mut self.buffer[..], &mut self.write_position),
            src,
            src_bit_offset,
            src_bit_len,
        )
    }
}

impl BitRead for Bits {
    #[inline]
    fn alignment(&self) -> Alignment {
        self.alignment
    }

    #[inline]
    fn position(&self) -> usize {
        self.read_position
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.bits_remaining()
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.read_position >= self.bit_len {
            return Err(Error::truncated_input(1, 0));
        }
        let end = (self.bit_len + BYTE_LEN - 1) / BYTE_LEN;
        BitRead::read_bit(&mut (&self.data[..end], &mut self.read_position))
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
        let dst_bit_len = (dst.len() * BYTE_LEN).saturating_sub(dst_bit_offset);
        self.read_bits_with_offset_len(dst, dst_bit_offset, dst_bit_len)
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
        ensure_remaining(self, dst_bit_len)?;
        let end = (self.bit_len + BYTE_LEN - 1) / BYTE_LEN;
        BitRead::read_bits_with_offset_len(
            &mut (&self.data[..end], &mut self.read_position),
            dst,
            dst_bit_offset,
            dst_bit_len,
        )
    }

    #[inline]
    fn skip_bits(&mut self, bit_len: usize) -> Result<(), Error> {
        ensure_remaining(self, bit_len)?;
        self.read_position += bit_len;
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, Error> {
        ensure_remaining(self, len.saturating_mul(BYTE_LEN))?;
        if self.read_position % BYTE_LEN == 0 {
            let start = self.read_position / BYTE_LEN;
            self.read_position += len * BYTE_LEN;
            Ok(self.data.slice(start..start + len))
        } else {
            let mut buffer = vec![0u8; len];
            self.read_bits(&mut buffer[..])?;
            Ok(Bytes::from(buffer))
        }
    }
}
