
use test_utils::*;

static FIXED_2: Info = Info::octet_string(Constraint::fixed(2));
static FIXED_3: Info = Info::octet_string(Constraint::fixed(3));
static UP_TO_255: Info = Info::octet_string(Constraint::constrained(0, 255));
static EXTENSIBLE_1_4: Info = Info::octet_string(Constraint::ext_constrained(1, 4));

static FLAGGED_2: Info = Info::Sequence(SequenceInfo {
    name: "Flagged2",
    extensible: false,
    root: &[
        Component::required("flag", &BOOLEAN),
        Component::required("code", &FIXED_2),
    ],
    extensions: &[],
});

static FLAGGED_3: Info = Info::Sequence(SequenceInfo {
    name: "Flagged3",
    extensible: false,
    root: &[
        Component::required("flag", &BOOLEAN),
        Component::required("code", &FIXED_3),
    ],
    extensions: &[],
});

fn flagged(info: &'static Info, code: &'static Info, value: &[u8]) -> AbstractType {
    let mut sequence = AbstractType::create(info);
    sequence.set_item(0, boolean(true)).unwrap();
    sequence.set_item(1, octets(code, value)).unwrap();
    sequence
}

#[test]
fn test_fixed_two_octets_are_not_aligned() {
    serialize_and_deserialize(
        17,
        &[0xD5, 0xE6, 0x80],
        &flagged(&FLAGGED_2, &FIXED_2, &[0xAB, 0xCD]),
    );
}

#[test]
fn test_fixed_three_octets_are_aligned() {
    serialize_and_deserialize(
        32,
        &[0x80, 0x01, 0x02, 0x03],
        &flagged(&FLAGGED_3, &FIXED_3, &[0x01, 0x02, 0x03]),
    );
}

#[test]
fn test_constrained_length() {
    serialize_and_deserialize(
        32,
        &[0x03, 0x0A, 0x0B, 0x0C],
        &octets(&UP_TO_255, &[0x0A, 0x0B, 0x0C]),
    );
}

#[test]
fn test_extensible() {
    // within the root: extension bit, 2 bit length and the aligned octets
    serialize_and_deserialize(16, &[0x00, 0xFF], &octets(&EXTENSIBLE_1_4, &[0xFF]));
    // outside of the root: extension bit and a semi-constrained length
    serialize_and_deserialize(
        56,
        &[0x80, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05],
        &octets(&EXTENSIBLE_1_4, &[0x01, 0x02, 0x03, 0x04, 0x05]),
    );
}

#[test]
fn test_unconstrained_two_octet_length() {
    let payload = vec![0x55_u8; 200];
    let mut expected = vec![0x80, 0xC8];
    expected.extend_from_slice(&payload);
    serialize_and_deserialize(
        expected.len() * 8,
        &expected,
        &octets(&OCTET_STRING, &payload),
    );
}

#[test]
fn test_fragmented() {
    let payload = (0..16 * 1024 + 5).map(|i| i as u8).collect::<Vec<u8>>();
    let mut expected = vec![0xC1];
    expected.extend_from_slice(&payload[..16 * 1024]);
    expected.push(0x05);
    expected.extend_from_slice(&payload[16 * 1024..]);
    serialize_and_deserialize(
        expected.len() * 8,
        &expected,
        &octets(&OCTET_STRING, &payload),
    );
}

#[test]
fn test_fragmented_exact_multiple_ends_with_empty_length() {
    let payload = vec![0xAA_u8; 32 * 1024];
    let mut expected = vec![0xC2];
    expected.extend_from_slice(&payload);
    expected.push(0x00);
    serialize_and_deserialize(
        expected.len() * 8,
        &expected,
        &octets(&OCTET_STRING, &payload),
    );
}

#[test]
fn test_size_not_in_range() {
    let error = PerEncoder::default()
        .encode(&octets(&FIXED_2, &[0x01, 0x02, 0x03]))
        .unwrap_err();
    assert_eq!(
        &ErrorKind::ConstraintViolation(Violation::SizeNotInRange {
            size: 3,
            lower: 2,
            upper: 2
        }),
        error.kind()
    );
}

#[test]
fn test_decoded_octets_share_the_input() {
    let input = bytes::Bytes::from(vec![0x03, 0x0A, 0x0B, 0x0C]);
    let value = AbstractType::decode(&UP_TO_255, input.clone()).unwrap();
    let decoded = value.octet_string().unwrap();
    assert_eq!(&[0x0A, 0x0B, 0x0C], &decoded[..]);
    assert_eq!(input[1..].as_ptr(), decoded.as_ptr());
}

#[test]
fn test_compare_shorter_first() {
    assert!(octets(&OCTET_STRING, &[0xFF])
        .compare(&octets(&OCTET_STRING, &[0x00, 0x00]))
        .unwrap()
        .is_lt());
}
