use crate::io::per::Error;

/// ITU-T X.680 | ISO/IEC 8824-1, chapter 41.4, Table 10
#[inline]
pub const fn is_printable_char(c: char) -> bool {
    matches!(c, ' ' | '\''..=')' | '+'..=':' | '=' | '?' | 'A'..='Z' | 'a'..='z')
}

/// Each valid character is encoded as a single octet
pub fn check_printable(value: &str) -> Result<(), Error> {
    match value.chars().enumerate().find(|(_, c)| !is_printable_char(*c)) {
        Some((index, character)) => Err(Error::invalid_character(character, index)),
        None => Ok(()),
    }
}
