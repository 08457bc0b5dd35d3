use crate::io::per::Alignment;
use crate::io::per::Error;
use crate::syn::bitstring::BitVec;
use crate::syn::choice::Choice;
use crate::syn::info::Info;
use crate::syn::info::SequenceInfo;
use crate::syn::info::Tag;
use crate::syn::io::PerDecoder;
use crate::syn::io::PerEncoder;
use crate::syn::opentype::OpenType;
use crate::syn::sequence::Sequence;
use bytes::Bytes;
use serde::ser::Error as _;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;

/// The payload of an [`AbstractType`], its variant always matches the tag of the [`Info`]
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Null,
    Integer(i64),
    Enumerated(u64),
    BitString(BitVec),
    OctetString(Bytes),
    PrintableString(String),
    OpenType(OpenType),
    Sequence(Sequence),
    SequenceOf(Vec<AbstractType>),
    Choice(Choice),
}

impl Value {
    pub const fn tag(&self) -> Tag {
        match self {
            Value::Boolean(_) => Tag::Boolean,
            Value::Null => Tag::Null,
            Value::Integer(_) => Tag::Integer,
            Value::Enumerated(_) => Tag::Enumerated,
            Value::BitString(_) => Tag::BitString,
            Value::OctetString(_) => Tag::OctetString,
            Value::PrintableString(_) => Tag::PrintableString,
            Value::OpenType(_) => Tag::OpenType,
            Value::Sequence(_) => Tag::Sequence,
            Value::SequenceOf(_) => Tag::SequenceOf,
            Value::Choice(_) => Tag::Choice,
        }
    }

    fn create(info: &'static Info) -> Self {
        match info {
            Info::Boolean => Value::Boolean(false),
            Info::Null => Value::Null,
            Info::Integer(constraint) => Value::Integer(constraint.lower().unwrap_or(0)),
            Info::Enumerated(_) => Value::Enumerated(0),
            Info::BitString(constraint) => {
                Value::BitString(BitVec::with_len(constraint.default_size()))
            }
            Info::OctetString(constraint) => Value::OctetString(Bytes::from(vec![
                0x00;
                constraint.default_size()
                    as usize
            ])),
            // spaces instead of zeros, which are not part of the alphabet
            Info::PrintableString(constraint) => {
                Value::PrintableString(" ".repeat(constraint.default_size() as usize))
            }
            Info::OpenType => Value::OpenType(OpenType::default()),
            Info::Sequence(info) => Value::Sequence(Sequence::create(info)),
            Info::SequenceOf(_) => Value::SequenceOf(Vec::new()),
            Info::Choice(_) => Value::Choice(Choice::default()),
        }
    }
}

/// A node of a value tree, described by a static [`Info`]
#[derive(Debug, Clone)]
pub struct AbstractType {
    info: &'static Info,
    value: Value,
}

impl AbstractType {
    /// A default value for the given schema: integers at their lower bound (or zero),
    /// fixed-size strings filled to their size, sequences with every component created but
    /// absent, empty lists, unselected choices and empty open types
    pub fn create(info: &'static Info) -> Self {
        Self {
            info,
            value: Value::create(info),
        }
    }

    pub(crate) fn from_parts(info: &'static Info, value: Value) -> Self {
        debug_assert_eq!(info.tag(), value.tag());
        Self { info, value }
    }

    #[inline]
    pub fn info(&self) -> &'static Info {
        self.info
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.info.tag()
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[inline]
    pub fn encode(&self, encoder: &mut PerEncoder) -> Result<(), Error> {
        encoder.encode(self)
    }

    /// The complete aligned encoding, padded to full octets
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        let mut encoder = PerEncoder::new(Alignment::Aligned);
        encoder.encode(self)?;
        Ok(encoder.into_bytes())
    }

    pub fn decode(info: &'static Info, data: impl Into<Bytes>) -> Result<Self, Error> {
        Self::decode_with_len(info, data).map(|(value, _)| value)
    }

    /// Also returns the amount of octets the value occupied in `data`
    pub fn decode_with_len(
        info: &'static Info,
        data: impl Into<Bytes>,
    ) -> Result<(Self, usize), Error> {
        let mut decoder = PerDecoder::new(data, Alignment::Aligned);
        let value = decoder.decode(info)?;
        Ok((value, decoder.consumed_bytes()))
    }

    pub fn compare(&self, other: &AbstractType) -> Result<Ordering, Error> {
        self.info.ensure_is(other.info)?;
        match (&self.value, &other.value) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Enumerated(a), Value::Enumerated(b)) => Ok(a.cmp(b)),
            (Value::BitString(a), Value::BitString(b)) => Ok(a.cmp(b)),
            (Value::OctetString(a), Value::OctetString(b)) => Ok(compare_octets(a, b)),
            (Value::PrintableString(a), Value::PrintableString(b)) => {
                Ok(compare_octets(a.as_bytes(), b.as_bytes()))
            }
            (Value::OpenType(a), Value::OpenType(b)) => Ok(compare_octets(a.as_bytes(), b.as_bytes())),
            (Value::Sequence(a), Value::Sequence(b)) => match self.info {
                Info::Sequence(info) => compare_sequences(info, a, b),
                _ => Err(Error::schema_mismatch(self.tag(), Tag::Sequence)),
            },
            (Value::SequenceOf(a), Value::SequenceOf(b)) => {
                let ordering = a.len().cmp(&b.len());
                if ordering != Ordering::Equal {
                    return Ok(ordering);
                }
                for (a, b) in a.iter().zip(b.iter()) {
                    let ordering = a.compare(b)?;
                    if ordering != Ordering::Equal {
                        return Ok(ordering);
                    }
                }
                Ok(Ordering::Equal)
            }
            (Value::Choice(a), Value::Choice(b)) => match (a.selected(), b.selected()) {
                (None, None) => Ok(Ordering::Equal),
                (None, Some(_)) => Ok(Ordering::Less),
                (Some(_), None) => Ok(Ordering::Greater),
                (Some((index_a, a)), Some((index_b, b))) if index_a == index_b => a.compare(b),
                (Some((index_a, _)), Some((index_b, _))) => Ok(index_a.cmp(&index_b)),
            },
            (a, b) => Err(Error::schema_mismatch(a.tag(), b.tag())),
        }
    }

    #[inline]
    fn mismatch(&self, expected: Tag) -> Error {
        Error::schema_mismatch(expected, self.tag())
    }

    pub fn boolean(&self) -> Result<bool, Error> {
        match &self.value {
            Value::Boolean(value) => Ok(*value),
            _ => Err(self.mismatch(Tag::Boolean)),
        }
    }

    pub fn set_boolean(&mut self, value: bool) -> Result<(), Error> {
        match &mut self.value {
            Value::Boolean(v) => {
                *v = value;
                Ok(())
            }
            _ => Err(self.mismatch(Tag::Boolean)),
        }
    }

    pub fn integer(&self) -> Result<i64, Error> {
        match &self.value {
            Value::Integer(value) => Ok(*value),
            _ => Err(self.mismatch(Tag::Integer)),
        }
    }

    /// The constraint is checked while encoding
    pub fn set_integer(&mut self, value: i64) -> Result<(), Error> {
        match &mut self.value {
            Value::Integer(v) => {
                *v = value;
                Ok(())
            }
            _ => Err(self.mismatch(Tag::Integer)),
        }
    }

    pub fn enumerated(&self) -> Result<u64, Error> {
        match &self.value {
            Value::Enumerated(value) => Ok(*value),
            _ => Err(self.mismatch(Tag::Enumerated)),
        }
    }

    pub fn set_enumerated(&mut self, value: u64) -> Result<(), Error> {
        match &mut self.value {
            Value::Enumerated(v) => {
                *v = value;
                Ok(())
            }
            _ => Err(self.mismatch(Tag::Enumerated)),
        }
    }

    pub fn bit_string(&self) -> Result<&BitVec, Error> {
        match &self.value {
            Value::BitString(value) => Ok(value),
            _ => Err(self.mismatch(Tag::BitString)),
        }
    }

    pub fn bit_string_mut(&mut self) -> Result<&mut BitVec, Error> {
        let tag = self.tag();
        match &mut self.value {
            Value::BitString(value) => Ok(value),
            _ => Err(Error::schema_mismatch(Tag::BitString, tag)),
        }
    }

    pub fn set_bit_string(&mut self, value: BitVec) -> Result<(), Error> {
        *self.bit_string_mut()? = value;
        Ok(())
    }

    pub fn octet_string(&self) -> Result<&Bytes, Error> {
        match &self.value {
            Value::OctetString(value) => Ok(value),
            _ => Err(self.mismatch(Tag::OctetString)),
        }
    }

    pub fn set_octet_string(&mut self, value: impl Into<Bytes>) -> Result<(), Error> {
        match &mut self.value {
            Value::OctetString(v) => {
                *v = value.into();
                Ok(())
            }
            _ => Err(self.mismatch(Tag::OctetString)),
        }
    }

    pub fn printable_string(&self) -> Result<&str, Error> {
        match &self.value {
            Value::PrintableString(value) => Ok(value.as_str()),
            _ => Err(self.mismatch(Tag::PrintableString)),
        }
    }

    /// The alphabet and the size are checked while encoding
    pub fn set_printable_string(&mut self, value: impl Into<String>) -> Result<(), Error> {
        match &mut self.value {
            Value::PrintableString(v) => {
                *v = value.into();
                Ok(())
            }
            _ => Err(self.mismatch(Tag::PrintableString)),
        }
    }

    pub fn open_type(&self) -> Result<&OpenType, Error> {
        match &self.value {
            Value::OpenType(value) => Ok(value),
            _ => Err(self.mismatch(Tag::OpenType)),
        }
    }

    pub fn set_open_type(&mut self, value: OpenType) -> Result<(), Error> {
        match &mut self.value {
            Value::OpenType(v) => {
                *v = value;
                Ok(())
            }
            _ => Err(self.mismatch(Tag::OpenType)),
        }
    }

    pub fn sequence(&self) -> Result<&Sequence, Error> {
        match &self.value {
            Value::Sequence(value) => Ok(value),
            _ => Err(self.mismatch(Tag::Sequence)),
        }
    }

    pub fn sequence_mut(&mut self) -> Result<&mut Sequence, Error> {
        let tag = self.tag();
        match &mut self.value {
            Value::Sequence(value) => Ok(value),
            _ => Err(Error::schema_mismatch(Tag::Sequence, tag)),
        }
    }

    fn sequence_parts_mut(&mut self) -> Result<(&'static SequenceInfo, &mut Sequence), Error> {
        let tag = self.tag();
        match (self.info, &mut self.value) {
            (Info::Sequence(info), Value::Sequence(sequence)) => Ok((info, sequence)),
            _ => Err(Error::schema_mismatch(Tag::Sequence, tag)),
        }
    }

    /// The index of a named sequence component or choice alternative
    pub fn index_of(&self, name: &str) -> Option<usize> {
        match self.info {
            Info::Sequence(info) => info.index_of(name),
            Info::Choice(info) => info.index_of(name).map(|index| index as usize),
            _ => None,
        }
    }

    /// The sequence component at `index`, regardless of its presence
    pub fn item(&self, index: usize) -> Option<&AbstractType> {
        match &self.value {
            Value::Sequence(sequence) => sequence.at(index),
            Value::SequenceOf(items) => items.get(index),
            _ => None,
        }
    }

    /// The named sequence component, if present
    pub fn field(&self, name: &str) -> Option<&AbstractType> {
        match (self.info, &self.value) {
            (Info::Sequence(info), Value::Sequence(sequence)) => info
                .index_of(name)
                .filter(|index| sequence.is_present(info, *index))
                .and_then(|index| sequence.at(index)),
            _ => None,
        }
    }

    pub fn is_present(&self, index: usize) -> bool {
        match (self.info, &self.value) {
            (Info::Sequence(info), Value::Sequence(sequence)) => {
                index < sequence.len() && sequence.is_present(info, index)
            }
            _ => false,
        }
    }

    /// Replaces the sequence component at `index` and marks it as present
    pub fn set_item(&mut self, index: usize, value: AbstractType) -> Result<(), Error> {
        let (info, sequence) = self.sequence_parts_mut()?;
        let component = info
            .components()
            .nth(index)
            .ok_or_else(|| Error::value_not_in_range(index as i64, 0, sequence.len() as i64 - 1))?;
        component.info.ensure_is(value.info)?;
        if index >= info.size_root() && !info.extensible {
            return Err(Error::extension_not_allowed(info.name));
        }
        if let Some(item) = sequence.at_mut(index) {
            *item = value;
        }
        sequence.set_present(info, index, true);
        Ok(())
    }

    /// Marks the optional or extension component at `index` as absent
    pub fn clear_item(&mut self, index: usize) -> Result<(), Error> {
        let (info, sequence) = self.sequence_parts_mut()?;
        sequence.set_present(info, index, false);
        Ok(())
    }

    pub fn items(&self) -> Result<&[AbstractType], Error> {
        match &self.value {
            Value::SequenceOf(items) => Ok(&items[..]),
            _ => Err(self.mismatch(Tag::SequenceOf)),
        }
    }

    pub fn items_mut(&mut self) -> Result<&mut [AbstractType], Error> {
        let tag = self.tag();
        match &mut self.value {
            Value::SequenceOf(items) => Ok(&mut items[..]),
            _ => Err(Error::schema_mismatch(Tag::SequenceOf, tag)),
        }
    }

    /// A fresh element for this SEQUENCE OF
    pub fn create_item(&self) -> Result<AbstractType, Error> {
        match self.info {
            Info::SequenceOf(info) => Ok(AbstractType::create(info.item)),
            _ => Err(self.mismatch(Tag::SequenceOf)),
        }
    }

    pub fn push_item(&mut self, item: AbstractType) -> Result<(), Error> {
        let tag = self.tag();
        match (self.info, &mut self.value) {
            (Info::SequenceOf(info), Value::SequenceOf(items)) => {
                info.item.ensure_is(item.info)?;
                items.push(item);
                Ok(())
            }
            _ => Err(Error::schema_mismatch(Tag::SequenceOf, tag)),
        }
    }

    pub fn choice(&self) -> Result<&Choice, Error> {
        match &self.value {
            Value::Choice(value) => Ok(value),
            _ => Err(self.mismatch(Tag::Choice)),
        }
    }

    pub fn choice_mut(&mut self) -> Result<&mut Choice, Error> {
        let tag = self.tag();
        match &mut self.value {
            Value::Choice(value) => Ok(value),
            _ => Err(Error::schema_mismatch(Tag::Choice, tag)),
        }
    }

    /// Selects the alternative at `index` with a freshly created value. An index beyond the
    /// known alternatives of an extensible choice selects an empty [`OpenType`] carrier.
    pub fn select(&mut self, index: u64) -> Result<&mut AbstractType, Error> {
        let tag = self.tag();
        match (self.info, &mut self.value) {
            (Info::Choice(info), Value::Choice(choice)) => {
                let branch = AbstractType::create(info.branch_info(index)?);
                Ok(choice.set(index, branch))
            }
            _ => Err(Error::schema_mismatch(Tag::Choice, tag)),
        }
    }

    pub fn set_choice(&mut self, index: u64, value: AbstractType) -> Result<(), Error> {
        let tag = self.tag();
        match (self.info, &mut self.value) {
            (Info::Choice(info), Value::Choice(choice)) => {
                info.branch_info(index)?.ensure_is(value.info)?;
                choice.set(index, value);
                Ok(())
            }
            _ => Err(Error::schema_mismatch(Tag::Choice, tag)),
        }
    }
}

impl PartialEq for AbstractType {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Ok(Ordering::Equal))
    }
}

/// Shorter content orders first
fn compare_octets(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Absent components order before present ones, present ones by their value
fn compare_sequences(info: &SequenceInfo, a: &Sequence, b: &Sequence) -> Result<Ordering, Error> {
    for index in 0..info.components().count() {
        let present = (a.is_present(info, index), b.is_present(info, index));
        let ordering = match (present, a.at(index), b.at(index)) {
            ((true, true), Some(a), Some(b)) => a.compare(b)?,
            ((a, b), ..) => a.cmp(&b),
        };
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(Ordering::Equal)
}

/// A readable rendition of the tree: octets as hex, bit strings as `0`/`1` digits, sequences
/// as map of their present components and choices as single entry map
impl Serialize for AbstractType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.info, &self.value) {
            (_, Value::Boolean(value)) => serializer.serialize_bool(*value),
            (_, Value::Null) => serializer.serialize_unit(),
            (_, Value::Integer(value)) => serializer.serialize_i64(*value),
            (_, Value::Enumerated(value)) => serializer.serialize_u64(*value),
            (_, Value::BitString(value)) => serializer.serialize_str(
                &value
                    .iter()
                    .map(|bit| if bit { '1' } else { '0' })
                    .collect::<String>(),
            ),
            (_, Value::OctetString(value)) => serializer.serialize_str(&hex::encode(value)),
            (_, Value::PrintableString(value)) => serializer.serialize_str(value),
            (_, Value::OpenType(value)) => value.serialize(serializer),
            (Info::Sequence(info), Value::Sequence(sequence)) => {
                let mut map = serializer.serialize_map(None)?;
                for (index, component) in info.components().enumerate() {
                    if let Some(item) = sequence.at(index) {
                        if sequence.is_present(info, index) {
                            map.serialize_entry(component.name, item)?;
                        }
                    }
                }
                map.end()
            }
            (_, Value::SequenceOf(items)) => serializer.collect_seq(items),
            (Info::Choice(info), Value::Choice(choice)) => match choice.selected() {
                Some((index, value)) => {
                    let mut map = serializer.serialize_map(Some(1))?;
                    match info.alternative(index) {
                        Some(alternative) => map.serialize_entry(alternative.name, value)?,
                        None => map.serialize_entry(&format!("extension-{index}"), value)?,
                    }
                    map.end()
                }
                None => serializer.serialize_none(),
            },
            (info, value) => Err(S::Error::custom(format!(
                "{:?} described as {:?}",
                value.tag(),
                info.tag()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syn::info::*;

    static SMALL: Info = Info::integer(Constraint::constrained(3, 7));
    static CODE: Info = Info::octet_string(Constraint::fixed(3));
    static NAME: Info = Info::printable_string(Constraint::fixed(2));
    static LIST: Info = Info::sequence_of(Constraint::constrained(0, 4), &SMALL);
    static RECORD: Info = Info::Sequence(SequenceInfo {
        name: "Record",
        extensible: true,
        root: &[
            Component::required("small", &SMALL),
            Component::optional("code", &CODE),
        ],
        extensions: &[Component::optional("flag", &BOOLEAN)],
    });
    static PICK: Info = Info::Choice(ChoiceInfo {
        name: "Pick",
        extensible: true,
        upper_bound: 0,
        choices: &[Alternative::new("small", &SMALL)],
    });

    #[test]
    fn test_create_defaults() {
        assert_eq!(3, AbstractType::create(&SMALL).integer().unwrap());
        assert_eq!(
            &[0, 0, 0],
            &AbstractType::create(&CODE).octet_string().unwrap()[..]
        );
        assert_eq!("  ", AbstractType::create(&NAME).printable_string().unwrap());
        assert!(AbstractType::create(&LIST).items().unwrap().is_empty());
        assert!(!AbstractType::create(&PICK).choice().unwrap().is_selected());

        let record = AbstractType::create(&RECORD);
        let sequence = record.sequence().unwrap();
        assert_eq!(3, sequence.len());
        assert_eq!(1, sequence.opt_flags().bit_len());
        assert_eq!(1, sequence.ext_flags().bit_len());
        assert!(!sequence.opt_flag(0));
        assert!(!sequence.has_extensions());
    }

    #[test]
    fn test_setter_schema_mismatch() {
        let mut value = AbstractType::create(&SMALL);
        let error = value.set_boolean(true).unwrap_err();
        assert_eq!(
            &crate::io::per::ErrorKind::SchemaMismatch {
                expected: Tag::Boolean,
                got: Tag::Integer
            },
            error.kind()
        );
    }

    #[test]
    fn test_set_item_marks_presence() {
        let mut record = AbstractType::create(&RECORD);
        let mut code = AbstractType::create(&CODE);
        code.set_octet_string(&b"abc"[..]).unwrap();
        record.set_item(1, code).unwrap();
        assert!(record.is_present(1));
        assert!(record.sequence().unwrap().opt_flag(0));
        assert_eq!(
            &b"abc"[..],
            &record.field("code").unwrap().octet_string().unwrap()[..]
        );

        record.clear_item(1).unwrap();
        assert!(!record.is_present(1));
        assert!(record.field("code").is_none());
    }

    #[test]
    fn test_set_item_rejects_other_schema() {
        let mut record = AbstractType::create(&RECORD);
        let error = record
            .set_item(0, AbstractType::create(&BOOLEAN))
            .unwrap_err();
        assert!(error.is_schema_mismatch());
        assert!(record.set_item(7, AbstractType::create(&SMALL)).is_err());
    }

    #[test]
    fn test_push_item_rejects_other_schema() {
        let mut list = AbstractType::create(&LIST);
        let item = list.create_item().unwrap();
        list.push_item(item).unwrap();
        assert!(list.push_item(AbstractType::create(&CODE)).is_err());
        assert_eq!(1, list.items().unwrap().len());
    }

    #[test]
    fn test_select_unknown_extension_creates_open_type() {
        let mut pick = AbstractType::create(&PICK);
        let carrier = pick.select(5).unwrap();
        assert_eq!(Tag::OpenType, carrier.tag());
        assert_eq!(Some(5), pick.choice().unwrap().index());
    }

    #[test]
    fn test_compare_different_schema() {
        let small = AbstractType::create(&SMALL);
        let code = AbstractType::create(&CODE);
        assert!(small.compare(&code).unwrap_err().is_schema_mismatch());
        assert_ne!(small, code);
    }

    #[test]
    fn test_compare_sequences_honours_presence() {
        let mut a = AbstractType::create(&RECORD);
        let b = AbstractType::create(&RECORD);
        assert_eq!(a, b);

        // an absent component does not take part in the comparison
        a.sequence_mut()
            .unwrap()
            .at_mut(1)
            .unwrap()
            .set_octet_string(&b"xyz"[..])
            .unwrap();
        assert_eq!(a, b);

        a.sequence_mut().unwrap().set_opt_flag(0, true);
        assert_eq!(Ordering::Greater, a.compare(&b).unwrap());
    }

    #[test]
    fn test_serialize_as_json() {
        let mut record = AbstractType::create(&RECORD);
        record.set_item(2, {
            let mut flag = AbstractType::create(&BOOLEAN);
            flag.set_boolean(true).unwrap();
            flag
        })
        .unwrap();
        assert_eq!(
            r#"{"small":3,"flag":true}"#,
            serde_json::to_string(&record).unwrap()
        );
    }
}
