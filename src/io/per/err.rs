use crate::syn::info::Tag;
use backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone)]
pub struct Error(pub(crate) Box<Inner>);

impl Error {
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    #[cold]
    #[inline(never)]
    pub fn truncated_input(needed_bits: u64, remaining_bits: u64) -> Self {
        Self::from(ErrorKind::TruncatedInput {
            needed_bits,
            remaining_bits,
        })
    }

    #[cold]
    #[inline(never)]
    pub fn value_not_in_range(value: i64, lower: i64, upper: i64) -> Self {
        Self::from(ErrorKind::ConstraintViolation(Violation::ValueNotInRange {
            value,
            lower,
            upper,
        }))
    }

    #[cold]
    #[inline(never)]
    pub fn size_not_in_range(size: u64, lower: u64, upper: u64) -> Self {
        Self::from(ErrorKind::ConstraintViolation(Violation::SizeNotInRange {
            size,
            lower,
            upper,
        }))
    }

    #[cold]
    #[inline(never)]
    pub fn invalid_character(character: char, index: usize) -> Self {
        Self::from(ErrorKind::ConstraintViolation(
            Violation::InvalidCharacter { character, index },
        ))
    }

    #[cold]
    #[inline(never)]
    pub fn unsupported_length(octets: u64) -> Self {
        Self::from(ErrorKind::ConstraintViolation(
            Violation::UnsupportedLength(octets),
        ))
    }

    #[cold]
    #[inline(never)]
    pub fn invalid_fragment(multiple: u8) -> Self {
        Self::from(ErrorKind::ConstraintViolation(Violation::InvalidFragment(
            multiple,
        )))
    }

    #[cold]
    #[inline(never)]
    pub fn choice_not_selected(name: &'static str) -> Self {
        Self::from(ErrorKind::ConstraintViolation(
            Violation::ChoiceNotSelected(name),
        ))
    }

    #[cold]
    #[inline(never)]
    pub fn extension_not_allowed(name: &'static str) -> Self {
        Self::from(ErrorKind::ConstraintViolation(
            Violation::ExtensionNotAllowed(name),
        ))
    }

    #[cold]
    #[inline(never)]
    pub fn unknown_choice_index(index: u64, variants: u64) -> Self {
        Self::from(ErrorKind::UnknownChoiceIndex { index, variants })
    }

    #[cold]
    #[inline(never)]
    pub fn schema_mismatch(expected: Tag, got: Tag) -> Self {
        Self::from(ErrorKind::SchemaMismatch { expected, got })
    }

    pub fn is_truncated_input(&self) -> bool {
        matches!(self.kind(), ErrorKind::TruncatedInput { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::ConstraintViolation(_))
    }

    pub fn is_unknown_choice_index(&self) -> bool {
        matches!(self.kind(), ErrorKind::UnknownChoiceIndex { .. })
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::SchemaMismatch { .. })
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Error(Box::new(Inner::from(kind)))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Debug for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.0.kind)?;
        let mut backtrace = self.0.backtrace.clone();
        backtrace.resolve();
        writeln!(f, "{backtrace:?}")
    }
}

impl std::error::Error for Error {
    fn description(&self) -> &str {
        "encoding or decoding aligned PER failed"
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Inner {
    pub(crate) kind: ErrorKind,
    pub(crate) backtrace: Backtrace,
}

impl From<ErrorKind> for Inner {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::new_unresolved(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input ended before the field being read was complete
    TruncatedInput {
        needed_bits: u64,
        remaining_bits: u64,
    },
    ConstraintViolation(Violation),
    UnknownChoiceIndex {
        index: u64,
        variants: u64,
    },
    /// A value was combined with an [`crate::syn::Info`] describing another type
    SchemaMismatch {
        expected: Tag,
        got: Tag,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    ValueNotInRange { value: i64, lower: i64, upper: i64 },
    SizeNotInRange { size: u64, lower: u64, upper: u64 },
    InvalidCharacter { character: char, index: usize },
    ChoiceNotSelected(&'static str),
    /// Extension additions are present in a value of a non-extensible SEQUENCE
    ExtensionNotAllowed(&'static str),
    /// An integer or length needs more octets than a 64 bit value can hold
    UnsupportedLength(u64),
    /// ITU-T X.691 | ISO/IEC 8825-2:2015, chapter 11.9.3.8: only 1 to 4 blocks of 16K are allowed
    InvalidFragment(u8),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::TruncatedInput {
                needed_bits,
                remaining_bits,
            } => write!(
                f,
                "Input truncated, needed {needed_bits} bits but only {remaining_bits} remain"
            ),
            ErrorKind::ConstraintViolation(violation) => {
                write!(f, "Constraint violated: {violation}")
            }
            ErrorKind::UnknownChoiceIndex { index, variants } => write!(
                f,
                "Unexpected choice-index {index} with variant count {variants}"
            ),
            ErrorKind::SchemaMismatch { expected, got } => {
                write!(f, "Expected a value of type {expected:?} but got {got:?}")
            }
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::ValueNotInRange {
                value,
                lower,
                upper,
            } => write!(
                f,
                "The value {value} is not within the inclusive range of {lower} and {upper}"
            ),
            Violation::SizeNotInRange { size, lower, upper } => write!(
                f,
                "The size {size} is not within the inclusive range of {lower} and {upper}"
            ),
            Violation::InvalidCharacter { character, index } => write!(
                f,
                "Invalid character for a PrintableString at index {index}: {character:?}"
            ),
            Violation::ChoiceNotSelected(name) => {
                write!(f, "No alternative of the choice {name} is selected")
            }
            Violation::ExtensionNotAllowed(name) => {
                write!(f, "The sequence {name} is not extensible")
            }
            Violation::UnsupportedLength(octets) => write!(
                f,
                "A length of {octets} octets exceeds the maximum supported integer size"
            ),
            Violation::InvalidFragment(multiple) => write!(
                f,
                "Invalid fragment multiple {multiple}, expected a value between 1 and 4"
            ),
        }
    }
}
