
use test_utils::*;

static ITEM: Info = Info::integer(Constraint::constrained(0, 255));
static ONE_TO_FIVE: Info = Info::sequence_of(Constraint::constrained(1, 5), &ITEM);
static PAIR: Info = Info::sequence_of(Constraint::fixed(2), &BOOLEAN);
static NULLS: Info = Info::sequence_of(Constraint::UNCONSTRAINED, &NULL);
static EXTENSIBLE: Info = Info::sequence_of(Constraint::ext_constrained(0, 1), &ITEM);
static FLAGS: Info = Info::sequence_of(Constraint::UNCONSTRAINED, &BOOLEAN);

fn list(info: &'static Info, items: impl IntoIterator<Item = AbstractType>) -> AbstractType {
    let mut list = AbstractType::create(info);
    for item in items {
        list.push_item(item).unwrap();
    }
    list
}

#[test]
fn test_three_of_one_to_five() {
    let value = list(&ONE_TO_FIVE, [1, 2, 3].map(|v| integer(&ITEM, v)));
    serialize_and_deserialize(32, &[0x40, 0x01, 0x02, 0x03], &value);
    assert_eq!(3, deserialize(&ONE_TO_FIVE, &[0x40, 0x01, 0x02, 0x03], 32).items().unwrap().len());
}

#[test]
fn test_fixed_size_has_no_length() {
    let value = list(&PAIR, [boolean(true), boolean(false)]);
    serialize_and_deserialize(2, &[0x80], &value);
}

#[test]
fn test_unconstrained() {
    let value = list(&NULLS, (0..3).map(|_| AbstractType::create(&NULL)));
    serialize_and_deserialize(8, &[0x03], &value);
}

#[test]
fn test_extensible_outside_root() {
    let value = list(&EXTENSIBLE, [4, 5].map(|v| integer(&ITEM, v)));
    serialize_and_deserialize(32, &[0x80, 0x02, 0x04, 0x05], &value);
}

#[test]
fn test_size_not_in_range() {
    let value = list(&ONE_TO_FIVE, (0..6).map(|v| integer(&ITEM, v)));
    assert!(PerEncoder::default()
        .encode(&value)
        .unwrap_err()
        .is_constraint_violation());

    let empty = AbstractType::create(&ONE_TO_FIVE);
    assert!(PerEncoder::default()
        .encode(&empty)
        .unwrap_err()
        .is_constraint_violation());
}

#[test]
fn test_failing_item_fails_the_list() {
    // length 2, but only a single item follows
    let error = AbstractType::decode(&ONE_TO_FIVE, &[0x20, 0x01][..]).unwrap_err();
    assert!(error.is_truncated_input());
}

#[test]
fn test_items_of_other_schema_are_rejected() {
    let mut value = AbstractType::create(&ONE_TO_FIVE);
    assert!(value.push_item(boolean(true)).unwrap_err().is_schema_mismatch());
    assert!(value.create_item().unwrap().info().is(&ITEM));
}

#[test]
fn test_fragmented_count() {
    let flags = (0..16 * 1024 + 1).map(|i| i % 2 == 0).collect::<Vec<_>>();
    let value = list(&FLAGS, flags.iter().map(|flag| boolean(*flag)));

    let mut expected = vec![0xC1];
    expected.extend(std::iter::repeat(0xAA).take(2 * 1024));
    expected.push(0x01);
    expected.push(0x80);
    serialize_and_deserialize(8 + 16 * 1024 + 8 + 1, &expected, &value);
}

#[test]
fn test_count_beyond_remaining_input() {
    // 512 booleans announced, 8 bits follow
    let error = AbstractType::decode(&FLAGS, &[0x82, 0x00, 0xFF][..]).unwrap_err();
    assert_eq!(
        &ErrorKind::TruncatedInput {
            needed_bits: 512,
            remaining_bits: 8
        },
        error.kind()
    );
}

#[test]
fn test_zero_sized_items_are_limited() {
    let nulls = AbstractType::decode(&NULLS, &[0xC4, 0x00][..]).unwrap();
    assert_eq!(ZERO_SIZED_ITEMS_LIMIT as usize, nulls.items().unwrap().len());

    let mut data = vec![0xC4; 16];
    data.push(0x00);
    let error = AbstractType::decode(&NULLS, data).unwrap_err();
    assert!(error.is_constraint_violation());
}
