
use test_utils::*;

static NAME: Info = Info::printable_string(Constraint::ext_constrained(1, 150));
static CODE: Info = Info::printable_string(Constraint::fixed(3));

fn printable(info: &'static Info, value: &str) -> AbstractType {
    let mut printable = AbstractType::create(info);
    printable.set_printable_string(value).unwrap();
    printable
}

#[test]
fn test_extensible_size() {
    // extension bit, 8 bit length, padding, then one octet per character
    serialize_and_deserialize(40, &[0x01, 0x00, b'a', b'b', b'c'], &printable(&NAME, "abc"));
}

#[test]
fn test_fixed_size() {
    serialize_and_deserialize(24, b"S1A", &printable(&CODE, "S1A"));
}

#[test]
fn test_unconstrained() {
    serialize_and_deserialize(
        64,
        &[0x07, b'e', b'N', b'B', b' ', b'(', b'1', b')'],
        &printable(&PRINTABLE_STRING, "eNB (1)"),
    );
}

#[test]
fn test_default_is_filled_with_spaces() {
    assert_eq!("   ", AbstractType::create(&CODE).printable_string().unwrap());
    assert_eq!("", AbstractType::create(&NAME).printable_string().unwrap());
}

#[test]
fn test_invalid_character_on_encode() {
    let error = PerEncoder::default()
        .encode(&printable(&NAME, "a_b"))
        .unwrap_err();
    assert_eq!(
        &ErrorKind::ConstraintViolation(Violation::InvalidCharacter {
            character: '_',
            index: 1
        }),
        error.kind()
    );
}

#[test]
fn test_invalid_character_on_decode() {
    let error = AbstractType::decode(&PRINTABLE_STRING, &[0x02, b'a', b'!'][..]).unwrap_err();
    assert_eq!(
        &ErrorKind::ConstraintViolation(Violation::InvalidCharacter {
            character: '!',
            index: 1
        }),
        error.kind()
    );
}

#[test]
fn test_fragmented() {
    let text = "S1AP".repeat(4 * 1024) + "ok";
    let mut expected = vec![0xC1];
    expected.extend_from_slice(&text.as_bytes()[..16 * 1024]);
    expected.push(0x02);
    expected.extend_from_slice(b"ok");
    serialize_and_deserialize(
        expected.len() * 8,
        &expected,
        &printable(&PRINTABLE_STRING, &text),
    );
}
