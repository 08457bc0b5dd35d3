//! Schemas of the generic S1AP containers, 3GPP TS 36.413 chapter 9.3, and a typed view of
//! the envelope. The procedure specific IE values stay [`OpenType`]s, consumers decode them
//! with their own [`Info`] through [`ProtocolIe::decode_value`].

use crate::io::per::Error;
use crate::syn::info::*;
use crate::syn::AbstractType;
use crate::syn::OpenType;
use bytes::Bytes;

/// `Criticality ::= ENUMERATED { reject, ignore, notify }`
pub static CRITICALITY: Info = Info::enumerated(false, 2);
/// `ProcedureCode ::= INTEGER (0..255)`
pub static PROCEDURE_CODE: Info = Info::integer(Constraint::constrained(0, 255));
/// `ProtocolIE-ID ::= INTEGER (0..maxProtocolIEs)`
pub static PROTOCOL_IE_ID: Info = Info::integer(Constraint::constrained(0, 65535));

pub static PROTOCOL_IE_FIELD: Info = Info::Sequence(SequenceInfo {
    name: "ProtocolIE-Field",
    extensible: false,
    root: &[
        Component::required("id", &PROTOCOL_IE_ID),
        Component::required("criticality", &CRITICALITY),
        Component::required("value", &OPEN_TYPE),
    ],
    extensions: &[],
});

pub static PROTOCOL_IE_CONTAINER: Info =
    Info::sequence_of(Constraint::constrained(0, 65535), &PROTOCOL_IE_FIELD);

/// The body shared by the S1AP messages: `SEQUENCE { protocolIEs ProtocolIE-Container, ... }`
pub static PROCEDURE: Info = Info::Sequence(SequenceInfo {
    name: "Procedure",
    extensible: true,
    root: &[Component::required("protocolIEs", &PROTOCOL_IE_CONTAINER)],
    extensions: &[],
});

static MESSAGE_ROOT: [Component; 3] = [
    Component::required("procedureCode", &PROCEDURE_CODE),
    Component::required("criticality", &CRITICALITY),
    Component::required("value", &OPEN_TYPE),
];

pub static INITIATING_MESSAGE: Info = Info::Sequence(SequenceInfo {
    name: "InitiatingMessage",
    extensible: false,
    root: &MESSAGE_ROOT,
    extensions: &[],
});

pub static SUCCESSFUL_OUTCOME: Info = Info::Sequence(SequenceInfo {
    name: "SuccessfulOutcome",
    extensible: false,
    root: &MESSAGE_ROOT,
    extensions: &[],
});

pub static UNSUCCESSFUL_OUTCOME: Info = Info::Sequence(SequenceInfo {
    name: "UnsuccessfulOutcome",
    extensible: false,
    root: &MESSAGE_ROOT,
    extensions: &[],
});

pub static S1AP_PDU: Info = Info::Choice(ChoiceInfo {
    name: "S1AP-PDU",
    extensible: true,
    upper_bound: 2,
    choices: &[
        Alternative::new("initiatingMessage", &INITIATING_MESSAGE),
        Alternative::new("successfulOutcome", &SUCCESSFUL_OUTCOME),
        Alternative::new("unsuccessfulOutcome", &UNSUCCESSFUL_OUTCOME),
    ],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Reject,
    Ignore,
    Notify,
}

impl Criticality {
    pub const fn index(self) -> u64 {
        match self {
            Criticality::Reject => 0,
            Criticality::Ignore => 1,
            Criticality::Notify => 2,
        }
    }

    pub fn from_index(index: u64) -> Result<Self, Error> {
        match index {
            0 => Ok(Criticality::Reject),
            1 => Ok(Criticality::Ignore),
            2 => Ok(Criticality::Notify),
            _ => Err(Error::value_not_in_range(
                i64::try_from(index).unwrap_or(i64::MAX),
                0,
                2,
            )),
        }
    }

    fn to_value(self) -> Result<AbstractType, Error> {
        let mut value = AbstractType::create(&CRITICALITY);
        value.set_enumerated(self.index())?;
        Ok(value)
    }

    fn from_value(value: &AbstractType) -> Result<Self, Error> {
        CRITICALITY.ensure_is(value.info())?;
        Self::from_index(value.enumerated()?)
    }
}

/// The alternatives of the S1AP-PDU, in the order of their choice index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    InitiatingMessage,
    SuccessfulOutcome,
    UnsuccessfulOutcome,
}

impl MessageKind {
    pub const fn index(self) -> u64 {
        match self {
            MessageKind::InitiatingMessage => 0,
            MessageKind::SuccessfulOutcome => 1,
            MessageKind::UnsuccessfulOutcome => 2,
        }
    }

    pub fn from_index(index: u64) -> Result<Self, Error> {
        match index {
            0 => Ok(MessageKind::InitiatingMessage),
            1 => Ok(MessageKind::SuccessfulOutcome),
            2 => Ok(MessageKind::UnsuccessfulOutcome),
            _ => Err(Error::unknown_choice_index(index, 3)),
        }
    }

    pub fn info(self) -> &'static Info {
        match self {
            MessageKind::InitiatingMessage => &INITIATING_MESSAGE,
            MessageKind::SuccessfulOutcome => &SUCCESSFUL_OUTCOME,
            MessageKind::UnsuccessfulOutcome => &UNSUCCESSFUL_OUTCOME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolIe {
    pub id: u16,
    pub criticality: Criticality,
    pub value: OpenType,
}

impl ProtocolIe {
    /// Pre-encodes `value` as the content of the IE
    pub fn new(id: u16, criticality: Criticality, value: &AbstractType) -> Result<Self, Error> {
        Ok(Self {
            id,
            criticality,
            value: OpenType::from_value(value)?,
        })
    }

    #[inline]
    pub fn decode_value(&self, info: &'static Info) -> Result<AbstractType, Error> {
        self.value.decode_as(info)
    }

    pub fn to_field(&self) -> Result<AbstractType, Error> {
        let mut field = AbstractType::create(&PROTOCOL_IE_FIELD);
        field.set_item(0, integer(&PROTOCOL_IE_ID, i64::from(self.id))?)?;
        field.set_item(1, self.criticality.to_value()?)?;
        field.set_item(2, open_type(self.value.clone())?)?;
        Ok(field)
    }

    pub fn from_field(field: &AbstractType) -> Result<Self, Error> {
        PROTOCOL_IE_FIELD.ensure_is(field.info())?;
        let id = component(field, 0)?.integer()?;
        Ok(Self {
            id: u16::try_from(id).map_err(|_| Error::value_not_in_range(id, 0, 65535))?,
            criticality: Criticality::from_value(component(field, 1)?)?,
            value: component(field, 2)?.open_type()?.clone(),
        })
    }
}

/// A `ProtocolIE-Container` holding the given IEs in order
pub fn protocol_ie_container(ies: &[ProtocolIe]) -> Result<AbstractType, Error> {
    let mut container = AbstractType::create(&PROTOCOL_IE_CONTAINER);
    for ie in ies {
        container.push_item(ie.to_field()?)?;
    }
    Ok(container)
}

/// The value of the first IE in `container` with the given id
pub fn find_value(container: &AbstractType, id: u16) -> Option<&OpenType> {
    container.items().ok()?.iter().find_map(|field| {
        let matches = field.item(0)?.integer().ok()? == i64::from(id);
        if matches {
            field.item(2)?.open_type().ok()
        } else {
            None
        }
    })
}

/// Typed view of a S1AP-PDU
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub kind: MessageKind,
    pub procedure_code: u8,
    pub criticality: Criticality,
    pub ies: Vec<ProtocolIe>,
}

impl Message {
    pub fn new(kind: MessageKind, procedure_code: u8, criticality: Criticality) -> Self {
        Self {
            kind,
            procedure_code,
            criticality,
            ies: Vec::new(),
        }
    }

    pub fn with_ie(mut self, ie: ProtocolIe) -> Self {
        self.ies.push(ie);
        self
    }

    pub fn find(&self, id: u16) -> Option<&ProtocolIe> {
        self.ies.iter().find(|ie| ie.id == id)
    }

    pub fn to_pdu(&self) -> Result<AbstractType, Error> {
        let mut body = AbstractType::create(&PROCEDURE);
        body.set_item(0, protocol_ie_container(&self.ies)?)?;

        let mut message = AbstractType::create(self.kind.info());
        message.set_item(
            0,
            integer(&PROCEDURE_CODE, i64::from(self.procedure_code))?,
        )?;
        message.set_item(1, self.criticality.to_value()?)?;
        message.set_item(2, open_type(OpenType::from_value(&body)?)?)?;

        let mut pdu = AbstractType::create(&S1AP_PDU);
        pdu.set_choice(self.kind.index(), message)?;
        Ok(pdu)
    }

    pub fn from_pdu(pdu: &AbstractType) -> Result<Self, Error> {
        S1AP_PDU.ensure_is(pdu.info())?;
        let (index, message) = pdu
            .choice()?
            .selected()
            .ok_or_else(|| Error::choice_not_selected("S1AP-PDU"))?;
        let kind = MessageKind::from_index(index)?;

        let procedure_code = component(message, 0)?.integer()?;
        let body = component(message, 2)?.open_type()?.decode_as(&PROCEDURE)?;
        let ies = component(&body, 0)?
            .items()?
            .iter()
            .map(ProtocolIe::from_field)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            procedure_code: u8::try_from(procedure_code)
                .map_err(|_| Error::value_not_in_range(procedure_code, 0, 255))?,
            criticality: Criticality::from_value(component(message, 1)?)?,
            ies,
        })
    }

    pub fn encode(&self) -> Result<Bytes, Error> {
        self.to_pdu()?.to_bytes()
    }

    pub fn decode(data: impl Into<Bytes>) -> Result<Self, Error> {
        Self::from_pdu(&AbstractType::decode(&S1AP_PDU, data)?)
    }
}

fn integer(info: &'static Info, value: i64) -> Result<AbstractType, Error> {
    let mut integer = AbstractType::create(info);
    integer.set_integer(value)?;
    Ok(integer)
}

fn open_type(value: OpenType) -> Result<AbstractType, Error> {
    let mut open_type = AbstractType::create(&OPEN_TYPE);
    open_type.set_open_type(value)?;
    Ok(open_type)
}

fn component(sequence: &AbstractType, index: usize) -> Result<&AbstractType, Error> {
    sequence
        .item(index)
        .ok_or_else(|| Error::schema_mismatch(Tag::Sequence, sequence.tag()))
}

#[cfg(test)]
mod tests {
    use super::*;

    static GLOBAL_ENB_ID: Info = Info::octet_string(Constraint::fixed(3));

    fn plmn(octets: &'static [u8]) -> AbstractType {
        let mut value = AbstractType::create(&GLOBAL_ENB_ID);
        value.set_octet_string(octets).unwrap();
        value
    }

    #[test]
    fn test_criticality_index() {
        for criticality in [
            Criticality::Reject,
            Criticality::Ignore,
            Criticality::Notify,
        ] {
            assert_eq!(
                criticality,
                Criticality::from_index(criticality.index()).unwrap()
            );
        }
        assert!(Criticality::from_index(3).is_err());
    }

    #[test]
    fn test_find_value() {
        let container = protocol_ie_container(&[
            ProtocolIe::new(59, Criticality::Reject, &plmn(&[0x02, 0xF8, 0x39])).unwrap(),
            ProtocolIe::new(60, Criticality::Ignore, &plmn(&[0x01, 0x02, 0x03])).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            &[0x01, 0x02, 0x03],
            &find_value(&container, 60).unwrap().as_bytes()[..]
        );
        assert!(find_value(&container, 61).is_none());
    }

    #[test]
    fn test_message_to_bytes() {
        let message = Message::new(MessageKind::InitiatingMessage, 17, Criticality::Reject)
            .with_ie(
                ProtocolIe::new(59, Criticality::Reject, &plmn(&[0x02, 0xF8, 0x39])).unwrap(),
            );
        assert_eq!(
            &[
                0x00, 0x11, 0x00, 0x0A, 0x00, 0x00, 0x01, 0x00, 0x3B, 0x00, 0x03, 0x02, 0xF8,
                0x39
            ],
            &message.encode().unwrap()[..]
        );
    }

    #[test]
    fn test_pdu_of_other_schema() {
        let not_a_pdu = AbstractType::create(&PROCEDURE);
        assert!(Message::from_pdu(&not_a_pdu)
            .unwrap_err()
            .is_schema_mismatch());
    }
}
