
use test_utils::*;

static ID: Info = Info::integer(Constraint::constrained(0, 65535));

#[test]
fn test_pre_encoded_value() {
    let open = OpenType::from_value(&integer(&ID, 0x1234)).unwrap();
    assert_eq!(&[0x12, 0x34], &open.as_bytes()[..]);
    assert_eq!(integer(&ID, 0x1234), open.decode_as(&ID).unwrap());
}

#[test]
fn test_empty_encoding_is_a_zero_octet() {
    let open = OpenType::from_value(&AbstractType::create(&NULL)).unwrap();
    assert_eq!(&[0x00], &open.as_bytes()[..]);
}

#[test]
fn test_partial_octet_is_padded() {
    let open = OpenType::from_value(&boolean(true)).unwrap();
    assert_eq!(&[0x80], &open.as_bytes()[..]);
}

#[test]
fn test_field_has_length() {
    let mut value = AbstractType::create(&OPEN_TYPE);
    value
        .set_open_type(OpenType::new(vec![0xDE, 0xAD, 0xBE, 0xEF]))
        .unwrap();
    serialize_and_deserialize(40, &[0x04, 0xDE, 0xAD, 0xBE, 0xEF], &value);
}

#[test]
fn test_decode_as_other_schema_fails_on_short_content() {
    let open = OpenType::new(vec![0x12]);
    assert!(open.decode_as(&ID).unwrap_err().is_truncated_input());
}

#[test]
fn test_serialized_as_hex() {
    let open = OpenType::new(vec![0x00, 0x3B]);
    assert_eq!("\"003b\"", serde_json::to_string(&open).unwrap());
}

#[test]
fn test_fragmented_field() {
    let content = (0..16 * 1024 + 1).map(|i| (i % 251) as u8).collect::<Vec<u8>>();
    let mut value = AbstractType::create(&OPEN_TYPE);
    value.set_open_type(OpenType::new(content.clone())).unwrap();

    let mut expected = vec![0xC1];
    expected.extend_from_slice(&content[..16 * 1024]);
    expected.push(0x01);
    expected.push(content[16 * 1024]);
    serialize_and_deserialize(expected.len() * 8, &expected, &value);
}
