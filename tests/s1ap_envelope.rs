
use s1ap_per::s1ap::*;
use test_utils::*;

/// `Global-ENB-ID` reduced to its PLMN identity
static PLMN_IDENTITY: Info = Info::octet_string(Constraint::fixed(3));
/// `ENBname ::= PrintableString (SIZE (1..150, ...))`
static ENB_NAME: Info = Info::printable_string(Constraint::ext_constrained(1, 150));

const ID_GLOBAL_ENB_ID: u16 = 59;
const ID_ENB_NAME: u16 = 60;
const S1_SETUP: u8 = 17;

const S1_SETUP_REQUEST: &[u8] = &[
    0x00, 0x11, 0x00, 0x0A, 0x00, 0x00, 0x01, 0x00, 0x3B, 0x00, 0x03, 0x02, 0xF8, 0x39,
];

fn s1_setup_request() -> Message {
    Message::new(MessageKind::InitiatingMessage, S1_SETUP, Criticality::Reject).with_ie(
        ProtocolIe::new(
            ID_GLOBAL_ENB_ID,
            Criticality::Reject,
            &octets(&PLMN_IDENTITY, &[0x02, 0xF8, 0x39]),
        )
        .unwrap(),
    )
}

#[test]
fn test_encode() {
    assert_eq!(S1_SETUP_REQUEST, &s1_setup_request().encode().unwrap()[..]);
}

#[test]
fn test_decode() {
    let message = Message::decode(S1_SETUP_REQUEST).unwrap();
    assert_eq!(s1_setup_request(), message);
    assert_eq!(MessageKind::InitiatingMessage, message.kind);
    assert_eq!(S1_SETUP, message.procedure_code);

    let ie = message.find(ID_GLOBAL_ENB_ID).unwrap();
    assert_eq!(
        &[0x02, 0xF8, 0x39],
        &ie.decode_value(&PLMN_IDENTITY)
            .unwrap()
            .octet_string()
            .unwrap()[..]
    );
}

#[test]
fn test_round_trip_with_several_ies() {
    let mut name = AbstractType::create(&ENB_NAME);
    name.set_printable_string("eNB Berlin-1").unwrap();

    let message = Message::new(
        MessageKind::UnsuccessfulOutcome,
        S1_SETUP,
        Criticality::Ignore,
    )
    .with_ie(ProtocolIe::new(ID_ENB_NAME, Criticality::Ignore, &name).unwrap())
    .with_ie(
        ProtocolIe::new(
            ID_GLOBAL_ENB_ID,
            Criticality::Notify,
            &octets(&PLMN_IDENTITY, &[0x12, 0x34, 0x56]),
        )
        .unwrap(),
    );

    let bytes = message.encode().unwrap();
    let decoded = Message::decode(bytes.clone()).unwrap();
    assert_eq!(message, decoded);
    assert_eq!(bytes, decoded.encode().unwrap());
    assert_eq!(
        "eNB Berlin-1",
        decoded
            .find(ID_ENB_NAME)
            .unwrap()
            .decode_value(&ENB_NAME)
            .unwrap()
            .printable_string()
            .unwrap()
    );
}

#[test]
fn test_pdu_tree() {
    let pdu = AbstractType::decode(&S1AP_PDU, S1_SETUP_REQUEST).unwrap();
    let (index, message) = pdu.choice().unwrap().selected().unwrap();
    assert_eq!(0, index);
    assert_eq!(17, message.field("procedureCode").unwrap().integer().unwrap());

    let body = message
        .field("value")
        .unwrap()
        .open_type()
        .unwrap()
        .decode_as(&PROCEDURE)
        .unwrap();
    let container = body.field("protocolIEs").unwrap();
    assert_eq!(
        &[0x02, 0xF8, 0x39],
        &find_value(container, ID_GLOBAL_ENB_ID).unwrap().as_bytes()[..]
    );
    assert!(find_value(container, ID_ENB_NAME).is_none());
}

#[test]
fn test_unknown_pdu_extension() {
    let data: &'static [u8] = &[0x80, 0x01, 0x00];
    let pdu = AbstractType::decode(&S1AP_PDU, data).unwrap();
    assert_eq!(Some(3), pdu.choice().unwrap().index());
    assert_eq!(data, &pdu.to_bytes().unwrap()[..]);

    let error = Message::from_pdu(&pdu).unwrap_err();
    assert_eq!(
        &ErrorKind::UnknownChoiceIndex {
            index: 3,
            variants: 3
        },
        error.kind()
    );
}

#[test]
fn test_truncated_message() {
    let error = Message::decode(&S1_SETUP_REQUEST[..10]).unwrap_err();
    assert!(error.is_truncated_input());
}

#[test]
fn test_json() {
    let json = serde_json::to_value(s1_setup_request()).unwrap();
    assert_eq!("initiatingMessage", json["kind"]);
    assert_eq!(17, json["procedure_code"]);
    assert_eq!("reject", json["criticality"]);
    assert_eq!(59, json["ies"][0]["id"]);
    assert_eq!("02f839", json["ies"][0]["value"]);

    let pdu = AbstractType::decode(&S1AP_PDU, S1_SETUP_REQUEST).unwrap();
    let tree = serde_json::to_value(&pdu).unwrap();
    assert_eq!(17, tree["initiatingMessage"]["procedureCode"]);
    assert_eq!(0, tree["initiatingMessage"]["criticality"]);
    assert_eq!(
        "000001003b000302f839",
        tree["initiatingMessage"]["value"]
    );
}
