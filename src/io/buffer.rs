use crate::io::per::Alignment;
use crate::io::per::BYTE_LEN;
use bytes::Bytes;

/// Growable output buffer, the bits are written from the most significant bit of each octet
#[derive(Debug, Default, Clone)]
pub struct BitBuffer {
    pub(crate) buffer: Vec<u8>,
    pub(crate) write_position: usize,
    pub(crate) alignment: Alignment,
}

impl BitBuffer {
    pub fn new(alignment: Alignment) -> Self {
        Self::with_capacity(0, alignment)
    }

    pub fn with_capacity(capacity: usize, alignment: Alignment) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            write_position: 0,
            alignment,
        }
    }

    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.write_position = 0;
    }

    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.buffer[..]
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.write_position
    }

    /// The amount of octets touched so far, a partially written octet is included
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn ensure_can_write_additional_bits(&mut self, bit_len: usize) {
        let required = (self.write_position + bit_len + BYTE_LEN - 1) / BYTE_LEN;
        if self.buffer.len() < required {
            self.buffer.resize(required, 0x00);
        }
    }
}

impl From<BitBuffer> for Vec<u8> {
    fn from(bits: BitBuffer) -> Self {
        bits.buffer
    }
}

impl From<BitBuffer> for Bytes {
    fn from(bits: BitBuffer) -> Self {
        Bytes::from(bits.buffer)
    }
}

/// Read cursor over shared input. Slicing octets out of it does not copy as long as the cursor
/// is octet-aligned.
#[derive(Debug, Clone)]
pub struct Bits {
    pub(crate) data: Bytes,
    pub(crate) read_position: usize,
    pub(crate) bit_len: usize,
    pub(crate) alignment: Alignment,
}

impl Bits {
    pub fn new(data: impl Into<Bytes>, alignment: Alignment) -> Self {
        let data = data.into();
        Self {
            bit_len: data.len() * BYTE_LEN,
            data,
            read_position: 0,
            alignment,
        }
    }

    /// Only the first `bit_len` bits of `data` are readable
    pub fn with_bit_len(data: impl Into<Bytes>, bit_len: usize, alignment: Alignment) -> Self {
        let mut bits = Self::new(data, alignment);
        bits.bit_len = bit_len.min(bits.bit_len);
        bits
    }

    #[inline]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    #[inline]
    pub fn read_position(&self) -> usize {
        self.read_position
    }

    #[inline]
    pub fn bits_remaining(&self) -> usize {
        self.bit_len.saturating_sub(self.read_position)
    }

    /// Octets touched by the read position so far, a partially read octet is included
    #[inline]
    pub fn consumed_bytes(&self) -> usize {
        (self.read_position + BYTE_LEN - 1) / BYTE_LEN
    }
}

impl From<Bytes> for Bits {
    fn from(data: Bytes) -> Self {
        Self::new(data, Alignment::Aligned)
    }
}

impl From<Vec<u8>> for Bits {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data, Alignment::Aligned)
    }
}

impl From<&'static [u8]> for Bits {
    fn from(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data), Alignment::Aligned)
    }
}
