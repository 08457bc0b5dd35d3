//! Static type descriptors. Every node of an [`crate::syn::AbstractType`] tree references the
//! [`Info`] it was created from, schemas are therefore declared as `static` items:
//!
//! ```rust
//! use s1ap_per::syn::info::*;
//!
//! static ID: Info = Info::integer(Constraint::constrained(0, 65535));
//! static LABEL: Info = Info::printable_string(Constraint::ext_constrained(1, 150));
//!
//! static ITEM: Info = Info::Sequence(SequenceInfo {
//!     name: "Item",
//!     extensible: true,
//!     root: &[
//!         Component::required("id", &ID),
//!         Component::optional("label", &LABEL),
//!     ],
//!     extensions: &[],
//! });
//!
//! assert_eq!(Tag::Sequence, ITEM.tag());
//! ```

use crate::io::per::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Boolean,
    Null,
    Integer,
    Enumerated,
    BitString,
    OctetString,
    PrintableString,
    OpenType,
    Sequence,
    SequenceOf,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Constrained,
    /// Values (or sizes) outside of the bounds are allowed and flagged by an extension bit
    ExtConstrained,
    Unconstrained,
    /// Only the lower bound applies
    SemiConstrained,
}

/// Value range of an integer or size range of a string or list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

impl Constraint {
    pub const UNCONSTRAINED: Constraint = Constraint::unconstrained();

    pub const fn constrained(lower_bound: i64, upper_bound: i64) -> Self {
        Self {
            kind: ConstraintKind::Constrained,
            lower_bound,
            upper_bound,
        }
    }

    pub const fn ext_constrained(lower_bound: i64, upper_bound: i64) -> Self {
        Self {
            kind: ConstraintKind::ExtConstrained,
            lower_bound,
            upper_bound,
        }
    }

    pub const fn semi_constrained(lower_bound: i64) -> Self {
        Self {
            kind: ConstraintKind::SemiConstrained,
            lower_bound,
            upper_bound: i64::MAX,
        }
    }

    pub const fn unconstrained() -> Self {
        Self {
            kind: ConstraintKind::Unconstrained,
            lower_bound: i64::MIN,
            upper_bound: i64::MAX,
        }
    }

    /// Fixed size, as in `SIZE (n)`
    pub const fn fixed(size: i64) -> Self {
        Self::constrained(size, size)
    }

    #[inline]
    pub const fn is_extensible(&self) -> bool {
        matches!(self.kind, ConstraintKind::ExtConstrained)
    }

    #[inline]
    pub const fn upper(&self) -> Option<i64> {
        match self.kind {
            ConstraintKind::Constrained | ConstraintKind::ExtConstrained => {
                Some(self.upper_bound)
            }
            ConstraintKind::Unconstrained | ConstraintKind::SemiConstrained => None,
        }
    }

    #[inline]
    pub const fn lower(&self) -> Option<i64> {
        match self.kind {
            ConstraintKind::Unconstrained => None,
            _ => Some(self.lower_bound),
        }
    }

    /// Whether the value lies within the extension root
    pub fn contains(&self, value: i64) -> bool {
        self.lower().map_or(true, |lower| value >= lower)
            && self.upper().map_or(true, |upper| value <= upper)
    }

    /// The bounds interpreted as size constraint, negative bounds are meaningless for sizes
    pub fn size_bounds(&self) -> (u64, Option<u64>) {
        let lower = self.lower().unwrap_or(0).max(0) as u64;
        let upper = self.upper().map(|upper| upper.max(0) as u64);
        (lower, upper)
    }

    pub fn contains_size(&self, size: u64) -> bool {
        let (lower, upper) = self.size_bounds();
        size >= lower && upper.map_or(true, |upper| size <= upper)
    }

    /// The initial size of a freshly created string or list: the lower bound if it is fixed,
    /// empty otherwise
    pub fn default_size(&self) -> u64 {
        match self.size_bounds() {
            (lower, Some(upper)) if lower == upper => lower,
            _ => 0,
        }
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::UNCONSTRAINED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumeratedInfo {
    pub extensible: bool,
    /// The index of the last root value
    pub upper_bound: u64,
}

#[derive(Debug, Clone, Copy, Eq)]
pub struct Component {
    pub name: &'static str,
    pub info: &'static Info,
    pub optional: bool,
}

/// Children are compared by identity, so that recursive schemas compare in finite time
impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.optional == other.optional
            && core::ptr::eq(self.info, other.info)
    }
}

impl Component {
    pub const fn required(name: &'static str, info: &'static Info) -> Self {
        Self {
            name,
            info,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, info: &'static Info) -> Self {
        Self {
            name,
            info,
            optional: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceInfo {
    pub name: &'static str,
    pub extensible: bool,
    pub root: &'static [Component],
    /// Extension additions, each one is always optional on the wire
    pub extensions: &'static [Component],
}

impl SequenceInfo {
    #[inline]
    pub fn size_root(&self) -> usize {
        self.root.len()
    }

    #[inline]
    pub fn size_opt(&self) -> usize {
        self.root.iter().filter(|c| c.optional).count()
    }

    #[inline]
    pub fn size_ext(&self) -> usize {
        self.extensions.len()
    }

    /// Root components first, then the extension additions
    pub fn components(&self) -> impl Iterator<Item = &'static Component> {
        self.root.iter().chain(self.extensions.iter())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components().position(|c| c.name == name)
    }

    /// The position of the root component at `index` within the optional-flags
    pub fn optional_index(&self, index: usize) -> Option<usize> {
        match self.root.get(index) {
            Some(component) if component.optional => {
                Some(self.root[..index].iter().filter(|c| c.optional).count())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq)]
pub struct SequenceOfInfo {
    pub constraint: Constraint,
    pub item: &'static Info,
}

impl PartialEq for SequenceOfInfo {
    fn eq(&self, other: &Self) -> bool {
        self.constraint == other.constraint && core::ptr::eq(self.item, other.item)
    }
}

#[derive(Debug, Clone, Copy, Eq)]
pub struct Alternative {
    pub name: &'static str,
    pub info: &'static Info,
}

impl PartialEq for Alternative {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && core::ptr::eq(self.info, other.info)
    }
}

impl Alternative {
    pub const fn new(name: &'static str, info: &'static Info) -> Self {
        Self { name, info }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceInfo {
    pub name: &'static str,
    pub extensible: bool,
    /// The index of the last root alternative, everything after it is a known extension
    pub upper_bound: u64,
    pub choices: &'static [Alternative],
}

impl ChoiceInfo {
    #[inline]
    pub fn is_extension(&self, index: u64) -> bool {
        index > self.upper_bound
    }

    pub fn alternative(&self, index: u64) -> Option<&'static Alternative> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.choices.get(index))
    }

    pub fn index_of(&self, name: &str) -> Option<u64> {
        self.choices
            .iter()
            .position(|a| a.name == name)
            .map(|index| index as u64)
    }

    /// The schema of the value at `index`, unknown extension alternatives are carried as
    /// [`OPEN_TYPE`]
    pub fn branch_info(&self, index: u64) -> Result<&'static Info, Error> {
        match self.alternative(index) {
            Some(alternative) if self.extensible || !self.is_extension(index) => {
                Ok(alternative.info)
            }
            None if self.extensible && self.is_extension(index) => Ok(&OPEN_TYPE),
            _ => Err(Error::unknown_choice_index(index, self.upper_bound + 1)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Info {
    Boolean,
    Null,
    Integer(Constraint),
    Enumerated(EnumeratedInfo),
    BitString(Constraint),
    OctetString(Constraint),
    PrintableString(Constraint),
    OpenType,
    Sequence(SequenceInfo),
    SequenceOf(SequenceOfInfo),
    Choice(ChoiceInfo),
}

pub static BOOLEAN: Info = Info::Boolean;
pub static NULL: Info = Info::Null;
pub static INTEGER: Info = Info::Integer(Constraint::UNCONSTRAINED);
pub static OCTET_STRING: Info = Info::OctetString(Constraint::UNCONSTRAINED);
pub static BIT_STRING: Info = Info::BitString(Constraint::UNCONSTRAINED);
pub static PRINTABLE_STRING: Info = Info::PrintableString(Constraint::UNCONSTRAINED);
/// Carrier for values of unknown extension alternatives
pub static OPEN_TYPE: Info = Info::OpenType;

impl Info {
    pub const fn integer(constraint: Constraint) -> Self {
        Info::Integer(constraint)
    }

    pub const fn enumerated(extensible: bool, upper_bound: u64) -> Self {
        Info::Enumerated(EnumeratedInfo {
            extensible,
            upper_bound,
        })
    }

    pub const fn bit_string(constraint: Constraint) -> Self {
        Info::BitString(constraint)
    }

    pub const fn octet_string(constraint: Constraint) -> Self {
        Info::OctetString(constraint)
    }

    pub const fn printable_string(constraint: Constraint) -> Self {
        Info::PrintableString(constraint)
    }

    pub const fn sequence_of(constraint: Constraint, item: &'static Info) -> Self {
        Info::SequenceOf(SequenceOfInfo { constraint, item })
    }

    pub const fn tag(&self) -> Tag {
        match self {
            Info::Boolean => Tag::Boolean,
            Info::Null => Tag::Null,
            Info::Integer(_) => Tag::Integer,
            Info::Enumerated(_) => Tag::Enumerated,
            Info::BitString(_) => Tag::BitString,
            Info::OctetString(_) => Tag::OctetString,
            Info::PrintableString(_) => Tag::PrintableString,
            Info::OpenType => Tag::OpenType,
            Info::Sequence(_) => Tag::Sequence,
            Info::SequenceOf(_) => Tag::SequenceOf,
            Info::Choice(_) => Tag::Choice,
        }
    }

    /// The name of named aggregates
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Info::Sequence(info) => Some(info.name),
            Info::Choice(info) => Some(info.name),
            _ => None,
        }
    }

    /// The least amount of bits any value of this type occupies on the wire
    pub fn min_bit_len(&self) -> u64 {
        match self {
            Info::Null => 0,
            Info::Boolean => 1,
            Info::Integer(constraint) => match constraint.kind {
                ConstraintKind::Constrained if constraint.lower_bound == constraint.upper_bound => 0,
                ConstraintKind::Constrained | ConstraintKind::ExtConstrained => 1,
                ConstraintKind::SemiConstrained | ConstraintKind::Unconstrained => 8,
            },
            Info::Enumerated(info) => u64::from(info.extensible || info.upper_bound > 0),
            Info::BitString(constraint) => size_min_bit_len(constraint, 1),
            Info::OctetString(constraint) | Info::PrintableString(constraint) => {
                size_min_bit_len(constraint, 8)
            }
            Info::OpenType => 8,
            Info::Sequence(info) => {
                if info.extensible || info.size_opt() > 0 {
                    1
                } else {
                    info.root
                        .iter()
                        .fold(0, |sum, c| sum.saturating_add(c.info.min_bit_len()))
                }
            }
            Info::SequenceOf(info) => match info.constraint.size_bounds() {
                _ if info.constraint.is_extensible() => 1,
                (lower, Some(upper)) if lower == upper => {
                    lower.saturating_mul(info.item.min_bit_len())
                }
                (_, Some(_)) => 1,
                (_, None) => 8,
            },
            Info::Choice(info) => match info.choices.first() {
                Some(alternative) if !info.extensible && info.upper_bound == 0 => {
                    alternative.info.min_bit_len()
                }
                _ => 1,
            },
        }
    }

    /// Identity first, schemas are usually `static` items and shared
    #[inline]
    pub fn is(&self, other: &Info) -> bool {
        core::ptr::eq(self, other) || self == other
    }

    pub(crate) fn ensure_is(&self, other: &Info) -> Result<(), Error> {
        if self.is(other) {
            Ok(())
        } else {
            Err(Error::schema_mismatch(self.tag(), other.tag()))
        }
    }
}

fn size_min_bit_len(constraint: &Constraint, unit_bits: u64) -> u64 {
    match constraint.size_bounds() {
        _ if constraint.is_extensible() => 1,
        (lower, Some(upper)) if lower == upper => lower.saturating_mul(unit_bits),
        (_, Some(_)) => 1,
        (_, None) => 8,
    }
}
