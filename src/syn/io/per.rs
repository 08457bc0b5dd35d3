use crate::io::buffer::BitBuffer;
use crate::io::buffer::Bits;
use crate::io::per::aligned::BitRead;
use crate::io::per::aligned::BitWrite;
use crate::io::per::Alignment;
use crate::io::per::Error;
use crate::io::per::PackedRead;
use crate::io::per::PackedWrite;
use crate::io::per::BYTE_LEN;
use crate::io::per::LENGTH_64K;
use crate::syn::bitstring::BitVec;
use crate::syn::choice::Choice;
use crate::syn::info::ChoiceInfo;
use crate::syn::info::ConstraintKind;
use crate::syn::info::Info;
use crate::syn::info::SequenceInfo;
use crate::syn::info::SequenceOfInfo;
use crate::syn::info::OPEN_TYPE;
use crate::syn::opentype::OpenType;
use crate::syn::printablestring::check_printable;
use crate::syn::sequence::Sequence;
use crate::syn::value::Value;
use crate::syn::AbstractType;
use bytes::Bytes;
use log::debug;
use log::trace;
use std::ops::Range;

/// The most elements of a SEQUENCE OF whose elements occupy no bits that are decoded
pub const ZERO_SIZED_ITEMS_LIMIT: u64 = 64 * 1024;

/// Serializes [`AbstractType`] trees into a growing [`BitBuffer`]
#[derive(Debug, Default)]
pub struct PerEncoder {
    bits: BitBuffer,
}

impl PerEncoder {
    pub fn new(alignment: Alignment) -> Self {
        Self::with_capacity(0, alignment)
    }

    pub fn with_capacity(capacity_bytes: usize, alignment: Alignment) -> Self {
        Self {
            bits: BitBuffer::with_capacity(capacity_bytes, alignment),
        }
    }

    /// The amount of octets written so far, a partially written octet is included
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.byte_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.bit_len() == 0
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bits.bit_len()
    }

    #[inline]
    pub fn byte_content(&self) -> &[u8] {
        self.bits.content()
    }

    pub fn into_bytes(self) -> Bytes {
        debug_assert_eq!(
            (self.bit_len() + BYTE_LEN - 1) / BYTE_LEN,
            self.bits.byte_len()
        );
        self.bits.into()
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Writes the `len` most significant bits of `value`
    pub fn encode_bits(&mut self, value: u8, len: usize) -> Result<(), Error> {
        if len > BYTE_LEN {
            return Err(Error::size_not_in_range(len as u64, 0, BYTE_LEN as u64));
        }
        self.write_bits_with_len(&[value], len)
    }

    /// A bit string of at most 16 bits, neither aligned nor preceded by a length
    pub fn encode_small_bit_string(&mut self, src: &[u8], bit_len: usize) -> Result<(), Error> {
        if bit_len > 2 * BYTE_LEN {
            return Err(Error::size_not_in_range(
                bit_len as u64,
                0,
                2 * BYTE_LEN as u64,
            ));
        }
        self.write_bits_with_len(src, bit_len)
    }

    pub fn encode(&mut self, value: &AbstractType) -> Result<(), Error> {
        match (value.info(), value.value()) {
            (Info::Boolean, Value::Boolean(value)) => self.write_boolean(*value),
            (Info::Null, Value::Null) => Ok(()),
            (Info::Integer(constraint), Value::Integer(value)) => match constraint.kind {
                ConstraintKind::Constrained => self.write_constrained_whole_number(
                    constraint.lower_bound,
                    constraint.upper_bound,
                    *value,
                ),
                ConstraintKind::ExtConstrained => {
                    let out_of_root = !constraint.contains(*value);
                    self.write_bit(out_of_root)?;
                    if out_of_root {
                        self.write_unconstrained_whole_number(*value)
                    } else {
                        self.write_constrained_whole_number(
                            constraint.lower_bound,
                            constraint.upper_bound,
                            *value,
                        )
                    }
                }
                ConstraintKind::SemiConstrained => {
                    self.write_semi_constrained_whole_number(constraint.lower_bound, *value)
                }
                ConstraintKind::Unconstrained => self.write_unconstrained_whole_number(*value),
            },
            (Info::Enumerated(info), Value::Enumerated(value)) => {
                self.write_enumeration_index(info.upper_bound, info.extensible, *value)
            }
            (Info::BitString(constraint), Value::BitString(bits)) => {
                let (lower, upper) = constraint.size_bounds();
                self.write_bitstring(
                    lower,
                    upper,
                    constraint.is_extensible(),
                    bits.as_byte_slice(),
                    bits.bit_len(),
                )
            }
            (Info::OctetString(constraint), Value::OctetString(octets)) => {
                let (lower, upper) = constraint.size_bounds();
                self.write_octetstring(lower, upper, constraint.is_extensible(), octets)
            }
            (Info::PrintableString(constraint), Value::PrintableString(string)) => {
                check_printable(string)?;
                let (lower, upper) = constraint.size_bounds();
                self.write_octetstring(
                    lower,
                    upper,
                    constraint.is_extensible(),
                    string.as_bytes(),
                )
            }
            (Info::OpenType, Value::OpenType(open_type)) => {
                self.write_octetstring(0, None, false, open_type.as_bytes())
            }
            (Info::Sequence(info), Value::Sequence(sequence)) => {
                self.encode_sequence(info, sequence)
            }
            (Info::SequenceOf(info), Value::SequenceOf(items)) => {
                self.encode_sequence_of(info, items)
            }
            (Info::Choice(info), Value::Choice(choice)) => self.encode_choice(info, choice),
            (info, value) => Err(Error::schema_mismatch(info.tag(), value.tag())),
        }
    }

    fn encode_item(&mut self, info: &Info, item: &AbstractType) -> Result<(), Error> {
        info.ensure_is(item.info())?;
        self.encode(item)
    }

    /// Encodes the value with a separate encoder and writes the result as open type field.
    /// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 11.2.1
    fn encode_open_type(&mut self, value: &AbstractType) -> Result<(), Error> {
        let mut nested = PerEncoder::new(self.alignment());
        nested.encode(value)?;
        if nested.is_empty() {
            self.write_octetstring(0, None, false, &[0x00])
        } else {
            self.write_octetstring(0, None, false, nested.byte_content())
        }
    }

    /// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 19
    fn encode_sequence(&mut self, info: &SequenceInfo, sequence: &Sequence) -> Result<(), Error> {
        let extended = sequence.has_extensions();
        if extended && !info.extensible {
            return Err(Error::extension_not_allowed(info.name));
        }
        if info.extensible {
            self.write_bit(extended)?;
        }

        // 19.2
        for index in 0..info.size_opt() {
            self.write_bit(sequence.opt_flag(index))?;
        }

        for (index, component) in info.root.iter().enumerate() {
            if sequence.is_present(info, index) {
                if let Some(item) = sequence.at(index) {
                    self.encode_item(component.info, item)?;
                }
            }
        }

        if extended {
            // 19.8
            self.write_normally_small_length(info.size_ext() as u64)?;
            for index in 0..info.size_ext() {
                self.write_bit(sequence.ext_flag(index))?;
            }
            // 19.9
            for (index, component) in info.extensions.iter().enumerate() {
                if sequence.ext_flag(index) {
                    if let Some(item) = sequence.at(info.size_root() + index) {
                        component.info.ensure_is(item.info())?;
                        self.encode_open_type(item)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 20
    fn encode_sequence_of(
        &mut self,
        info: &SequenceOfInfo,
        items: &[AbstractType],
    ) -> Result<(), Error> {
        let (lower, upper) = info.constraint.size_bounds();
        let len = items.len() as u64;
        let out_of_root = !info.constraint.contains_size(len);

        if info.constraint.is_extensible() {
            self.write_bit(out_of_root)?;
        } else if out_of_root {
            return Err(Error::size_not_in_range(
                len,
                lower,
                upper.unwrap_or(u64::MAX),
            ));
        }

        let encode_items = |encoder: &mut Self, range: Range<usize>| -> Result<(), Error> {
            items[range]
                .iter()
                .try_for_each(|item| encoder.encode_item(info.item, item))
        };

        match upper {
            _ if out_of_root => self.write_fragmented(0, None, len, encode_items),
            // 20.6
            Some(upper) if upper == lower && upper < LENGTH_64K => encode_items(self, 0..items.len()),
            _ => self.write_fragmented(lower, upper, len, encode_items),
        }
    }

    /// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 23
    fn encode_choice(&mut self, info: &ChoiceInfo, choice: &Choice) -> Result<(), Error> {
        let (index, value) = choice
            .selected()
            .ok_or_else(|| Error::choice_not_selected(info.name))?;
        info.branch_info(index)?.ensure_is(value.info())?;

        if self.write_choice_index(info.upper_bound, info.extensible, index)? {
            match value.value() {
                // carried through from a peer with a newer schema
                Value::OpenType(open_type) if info.alternative(index).is_none() => {
                    self.write_octetstring(0, None, false, open_type.as_bytes())
                }
                _ => self.encode_open_type(value),
            }
        } else {
            self.encode(value)
        }
    }
}

impl BitWrite for PerEncoder {
    #[inline]
    fn alignment(&self) -> Alignment {
        self.bits.alignment()
    }

    #[inline]
    fn position(&self) -> usize {
        self.bits.bit_len()
    }

    #[inline]
    fn write_bit(&mut self, bit: bool) -> Result<(), Error> {
        self.bits.write_bit(bit)
    }

    #[inline]
    fn write_bits(&mut self, src: &[u8]) -> Result<(), Error> {
        self.bits.write_bits(src)
    }

    #[inline]
    fn write_bits_with_offset(&mut self, src: &[u8], src_bit_offset: usize) -> Result<(), Error> {
        self.bits.write_bits_with_offset(src, src_bit_offset)
    }

    #[inline]
    fn write_bits_with_len(&mut self, src: &[u8], bit_len: usize) -> Result<(), Error> {
        self.bits.write_bits_with_len(src, bit_len)
    }

    #[inline]
    fn write_bits_with_offset_len(
        &mut self,
        src: &[u8],
        src_bit_offset: usize,
        src_bit_len: usize,
    ) -> Result<(), Error> {
        self.bits
            .write_bits_with_offset_len(src, src_bit_offset, src_bit_len)
    }
}

/// Parses [`AbstractType`] trees from shared input. Octet strings and open types that start
/// on an octet boundary are handed out as views into the input.
#[derive(Debug, Clone)]
pub struct PerDecoder {
    bits: Bits,
}

impl From<Bits> for PerDecoder {
    fn from(bits: Bits) -> Self {
        Self { bits }
    }
}

impl PerDecoder {
    pub fn new(data: impl Into<Bytes>, alignment: Alignment) -> Self {
        Self::from(Bits::new(data, alignment))
    }

    #[inline]
    pub fn bits_remaining(&self) -> usize {
        self.bits.bits_remaining()
    }

    /// The amount of octets the decoded values occupied, padding of the last octet included
    #[inline]
    pub fn consumed_bytes(&self) -> usize {
        self.bits.consumed_bytes()
    }

    /// Inverse of [`PerEncoder::encode_bits`], the bits are returned in the most significant
    /// positions
    pub fn decode_bits(&mut self, len: usize) -> Result<u8, Error> {
        if len > BYTE_LEN {
            return Err(Error::size_not_in_range(len as u64, 0, BYTE_LEN as u64));
        }
        let mut byte = [0u8; 1];
        self.read_bits_with_len(&mut byte, len)?;
        Ok(byte[0])
    }

    pub fn decode(&mut self, info: &'static Info) -> Result<AbstractType, Error> {
        trace!("decode {:?} at bit {}", info.tag(), self.position());
        let value = match info {
            Info::Boolean => Value::Boolean(self.read_boolean()?),
            Info::Null => Value::Null,
            Info::Integer(constraint) => Value::Integer(match constraint.kind {
                ConstraintKind::Constrained => self.read_constrained_whole_number(
                    constraint.lower_bound,
                    constraint.upper_bound,
                )?,
                ConstraintKind::ExtConstrained => {
                    if self.read_bit()? {
                        self.read_unconstrained_whole_number()?
                    } else {
                        self.read_constrained_whole_number(
                            constraint.lower_bound,
                            constraint.upper_bound,
                        )?
                    }
                }
                ConstraintKind::SemiConstrained => {
                    self.read_semi_constrained_whole_number(constraint.lower_bound)?
                }
                ConstraintKind::Unconstrained => self.read_unconstrained_whole_number()?,
            }),
            Info::Enumerated(info) => {
                Value::Enumerated(self.read_enumeration_index(info.upper_bound, info.extensible)?)
            }
            Info::BitString(constraint) => {
                let (lower, upper) = constraint.size_bounds();
                let (bytes, bit_len) =
                    self.read_bitstring(lower, upper, constraint.is_extensible())?;
                Value::BitString(BitVec::from_bytes(bytes, bit_len))
            }
            Info::OctetString(constraint) => {
                let (lower, upper) = constraint.size_bounds();
                Value::OctetString(self.read_octetstring(
                    lower,
                    upper,
                    constraint.is_extensible(),
                )?)
            }
            Info::PrintableString(constraint) => {
                let (lower, upper) = constraint.size_bounds();
                let octets = self.read_octetstring(lower, upper, constraint.is_extensible())?;
                let string = octets.iter().map(|octet| char::from(*octet)).collect::<String>();
                check_printable(&string)?;
                Value::PrintableString(string)
            }
            Info::OpenType => Value::OpenType(OpenType::from(self.read_octetstring(
                0,
                None,
                false,
            )?)),
            Info::Sequence(info) => Value::Sequence(self.decode_sequence(info)?),
            Info::SequenceOf(info) => Value::SequenceOf(self.decode_sequence_of(info)?),
            Info::Choice(info) => Value::Choice(self.decode_choice(info)?),
        };
        Ok(AbstractType::from_parts(info, value))
    }

    /// Decodes the content of an open type field with a separate decoder
    fn decode_open_type(&self, info: &'static Info, content: Bytes) -> Result<AbstractType, Error> {
        PerDecoder::new(content, self.alignment()).decode(info)
    }

    fn decode_sequence(&mut self, info: &'static SequenceInfo) -> Result<Sequence, Error> {
        let mut sequence = Sequence::create(info);
        let extended = info.extensible && self.read_bit()?;

        for index in 0..info.size_opt() {
            let present = self.read_bit()?;
            sequence.set_opt_flag(index, present);
        }

        for (index, component) in info.root.iter().enumerate() {
            if sequence.is_present(info, index) {
                trace!("{}.{}", info.name, component.name);
                sequence.items[index] = self.decode(component.info)?;
            }
        }

        if extended {
            let count = self.read_normally_small_length()?;
            let mut present = Vec::with_capacity(count.min(info.size_ext() as u64) as usize);
            for _ in 0..count {
                present.push(self.read_bit()?);
            }

            for (index, present) in present.into_iter().enumerate() {
                if !present {
                    continue;
                }
                let content = self.read_octetstring(0, None, false)?;
                match info.extensions.get(index) {
                    Some(component) => {
                        trace!("{}.{} (extension)", info.name, component.name);
                        sequence.items[info.size_root() + index] =
                            self.decode_open_type(component.info, content)?;
                        sequence.set_ext_flag(index, true);
                    }
                    None => debug!(
                        "Skipping unknown extension addition {} of {} ({} octets)",
                        index,
                        info.name,
                        content.len()
                    ),
                }
            }
        }

        Ok(sequence)
    }

    fn decode_sequence_of(
        &mut self,
        info: &'static SequenceOfInfo,
    ) -> Result<Vec<AbstractType>, Error> {
        let (lower, upper) = info.constraint.size_bounds();
        let out_of_root = info.constraint.is_extensible() && self.read_bit()?;

        let item_bits = info.item.min_bit_len();
        let mut items = Vec::new();
        let mut decode_items = |decoder: &mut Self, count: u64| -> Result<(), Error> {
            if item_bits == 0 {
                // nothing on the wire limits the amount of such items
                let total = items.len() as u64 + count;
                if total > ZERO_SIZED_ITEMS_LIMIT {
                    return Err(Error::size_not_in_range(
                        total,
                        lower,
                        ZERO_SIZED_ITEMS_LIMIT,
                    ));
                }
            } else {
                let needed = count.saturating_mul(item_bits);
                let remaining = decoder.remaining() as u64;
                if needed > remaining {
                    return Err(Error::truncated_input(needed, remaining));
                }
            }
            for _ in 0..count {
                items.push(decoder.decode(info.item)?);
            }
            Ok(())
        };

        match upper {
            _ if out_of_root => {
                self.read_fragmented(0, None, &mut decode_items)?;
            }
            Some(upper) if upper == lower && upper < LENGTH_64K => decode_items(self, upper)?,
            _ => {
                let total = self.read_fragmented(lower, upper, &mut decode_items)?;
                if !info.constraint.contains_size(total) {
                    return Err(Error::size_not_in_range(
                        total,
                        lower,
                        upper.unwrap_or(u64::MAX),
                    ));
                }
            }
        }

        Ok(items)
    }

    fn decode_choice(&mut self, info: &'static ChoiceInfo) -> Result<Choice, Error> {
        let (index, extension) = self.read_choice_index(info.upper_bound, info.extensible)?;
        let branch = info.branch_info(index)?;
        trace!("{} selects {}", info.name, index);

        let value = if !extension {
            self.decode(branch)?
        } else {
            let content = self.read_octetstring(0, None, false)?;
            if info.alternative(index).is_some() {
                self.decode_open_type(branch, content)?
            } else {
                debug!(
                    "Keeping unknown alternative {} of {} as open type ({} octets)",
                    index,
                    info.name,
                    content.len()
                );
                AbstractType::from_parts(&OPEN_TYPE, Value::OpenType(OpenType::from(content)))
            }
        };

        let mut choice = Choice::default();
        choice.set(index, value);
        Ok(choice)
    }
}

impl BitRead for PerDecoder {
    #[inline]
    fn alignment(&self) -> Alignment {
        self.bits.alignment()
    }

    #[inline]
    fn position(&self) -> usize {
        self.bits.read_position()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.bits.bits_remaining()
    }

    #[inline]
    fn read_bit(&mut self) -> Result<bool, Error> {
        self.bits.read_bit()
    }

    #[inline]
    fn read_bits(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        self.bits.read_bits(dst)
    }

    #[inline]
    fn read_bits_with_offset(
        &mut self,
        dst: &mut [u8],
        dst_bit_offset: usize,
    ) -> Result<(), Error> {
        self.bits.read_bits_with_offset(dst, dst_bit_offset)
    }

    #[inline]
    fn read_bits_with_len(&mut self, dst: &mut [u8], dst_bit_len: usize) -> Result<(), Error> {
        self.bits.read_bits_with_len(dst, dst_bit_len)
    }

    #[inline]
    fn read_bits_with_offset_len(
        &mut self,
        dst: &mut [u8],
        dst_bit_offset: usize,
        dst_bit_len: usize,
    ) -> Result<(), Error> {
        self.bits
            .read_bits_with_offset_len(dst, dst_bit_offset, dst_bit_len)
    }

    #[inline]
    fn skip_bits(&mut self, bit_len: usize) -> Result<(), Error> {
        self.bits.skip_bits(bit_len)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> Result<Bytes, Error> {
        self.bits.read_bytes(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syn::info::*;

    #[test]
    fn test_encode_bits_across_octet_boundary() {
        let mut encoder = PerEncoder::default();
        encoder.encode_bits(0b1010_0000, 3).unwrap();
        encoder.encode_bits(0b1111_1100, 6).unwrap();
        assert_eq!(9, encoder.bit_len());
        assert_eq!(2, encoder.len());
        assert_eq!(&[0b1011_1111, 0b1000_0000], encoder.byte_content());

        let mut decoder = PerDecoder::new(encoder.into_bytes(), Alignment::Aligned);
        assert_eq!(0b1010_0000, decoder.decode_bits(3).unwrap());
        assert_eq!(0b1111_1100, decoder.decode_bits(6).unwrap());
    }

    #[test]
    fn test_encode_bits_rejects_more_than_an_octet() {
        let mut encoder = PerEncoder::default();
        assert!(encoder.encode_bits(0xFF, 9).is_err());
        assert!(encoder.is_empty());
    }

    #[test]
    fn test_encode_small_bit_string() {
        let mut encoder = PerEncoder::default();
        encoder.write_bit(true).unwrap();
        encoder
            .encode_small_bit_string(&[0b1100_1100, 0b1010_0000], 12)
            .unwrap();
        assert_eq!(13, encoder.bit_len());
        assert_eq!(&[0b1110_0110, 0b0101_0000], encoder.byte_content());
        assert!(encoder.encode_small_bit_string(&[0, 0, 0], 17).is_err());
    }

    #[test]
    fn test_push_item_keeps_list_consistent() {
        static FLAGS: Info = Info::sequence_of(Constraint::constrained(0, 3), &BOOLEAN);
        let mut list = AbstractType::create(&FLAGS);
        assert!(list.push_item(AbstractType::create(&NULL)).is_err());

        let mut encoder = PerEncoder::default();
        encoder.encode(&list).unwrap();
        assert_eq!(&[0x00], encoder.byte_content());
    }

    #[test]
    fn test_choice_not_selected() {
        static EITHER: Info = Info::Choice(ChoiceInfo {
            name: "Either",
            extensible: false,
            upper_bound: 1,
            choices: &[
                Alternative::new("flag", &BOOLEAN),
                Alternative::new("nothing", &NULL),
            ],
        });
        let either = AbstractType::create(&EITHER);
        let error = PerEncoder::default().encode(&either).unwrap_err();
        assert_eq!(
            &crate::io::per::ErrorKind::ConstraintViolation(
                crate::io::per::Violation::ChoiceNotSelected("Either")
            ),
            error.kind()
        );
    }

    #[test]
    fn test_consumed_bytes_includes_padding() {
        let mut decoder = PerDecoder::new(vec![0x80, 0x00, 0xAB], Alignment::Aligned);
        assert!(decoder.decode(&BOOLEAN).unwrap().boolean().unwrap());
        assert_eq!(1, decoder.consumed_bytes());
        assert_eq!(23, decoder.bits_remaining());
    }
}
