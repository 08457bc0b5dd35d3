use crate::io::per::Alignment;
use crate::io::per::Error;
use crate::syn::info::Info;
use crate::syn::io::PerDecoder;
use crate::syn::io::PerEncoder;
use crate::syn::AbstractType;
use bytes::Bytes;
use serde::Serialize;
use serde::Serializer;

/// The complete aligned PER encoding of a value, carried as octets. The schema of the content
/// is only known to the consumer, see [`OpenType::decode_as`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpenType(Bytes);

impl OpenType {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self(content.into())
    }

    /// Encodes `value` with a separate aligned encoder. ITU-T X.691 | ISO/IEC 8825-2:2015,
    /// chapter 11.1: an empty encoding is replaced by a single zero octet.
    pub fn from_value(value: &AbstractType) -> Result<Self, Error> {
        let mut encoder = PerEncoder::new(Alignment::Aligned);
        encoder.encode(value)?;
        if encoder.bit_len() == 0 {
            Ok(Self(Bytes::from_static(&[0x00])))
        } else {
            Ok(Self(encoder.into_bytes()))
        }
    }

    pub fn decode_as(&self, info: &'static Info) -> Result<AbstractType, Error> {
        PerDecoder::new(self.0.clone(), Alignment::Aligned).decode(info)
    }

    #[inline]
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Bytes> for OpenType {
    fn from(content: Bytes) -> Self {
        Self(content)
    }
}

impl From<OpenType> for Bytes {
    fn from(open_type: OpenType) -> Self {
        open_type.0
    }
}

impl Serialize for OpenType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syn::info::NULL;

    #[test]
    fn test_empty_encoding_becomes_zero_octet() {
        let null = AbstractType::create(&NULL);
        let open = OpenType::from_value(&null).unwrap();
        assert_eq!(&[0x00], &open.as_bytes()[..]);
        assert_eq!(null, open.decode_as(&NULL).unwrap());
    }

    #[test]
    fn test_hex() {
        assert_eq!("00ff1a", OpenType::new(vec![0x00, 0xFF, 0x1A]).to_hex());
    }
}
