//! BSON Specification Version 1.1 type tags.
//! See <http://bsonspec.org/spec.html>.

use crate::error::{Error, ErrorKind};

/// A tagged BSON type, carrying its exact wire code.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BsonType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    BinaryData = 0x05,
    /// Deprecated by the BSON spec; decoded and re-encoded verbatim.
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    Datetime = 0x09,
    Null = 0x0A,
    RegExp = 0x0B,
    /// Deprecated by the BSON spec; decoded and re-encoded verbatim.
    DBPointer = 0x0C,
    JavaScript = 0x0D,
    /// Deprecated by the BSON spec; decoded and re-encoded verbatim.
    Symbol = 0x0E,
    /// Deprecated by the BSON spec; decoded and re-encoded verbatim.
    JavaScriptWithScope = 0x0F,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MinKey = 0xFF,
    MaxKey = 0x7F,
}

impl BsonType {
    /// Recovers a `BsonType` from its wire code, failing with
    /// [`ErrorKind::UnknownType`] for any code outside the enumeration.
    pub fn from_tag(tag: u8) -> Result<Self, Error> {
        use BsonType::*;
        Ok(match tag {
            0x01 => Double,
            0x02 => String,
            0x03 => Document,
            0x04 => Array,
            0x05 => BinaryData,
            0x06 => Undefined,
            0x07 => ObjectId,
            0x08 => Boolean,
            0x09 => Datetime,
            0x0A => Null,
            0x0B => RegExp,
            0x0C => DBPointer,
            0x0D => JavaScript,
            0x0E => Symbol,
            0x0F => JavaScriptWithScope,
            0x10 => Int32,
            0x11 => Timestamp,
            0x12 => Int64,
            0x13 => Decimal128,
            0xFF => MinKey,
            0x7F => MaxKey,
            other => return Err(Error::from(ErrorKind::UnknownType(other))),
        })
    }

    /// The wire code for this type.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_every_tag() {
        let tags: &[u8] = &[
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
            0x0F, 0x10, 0x11, 0x12, 0x13, 0xFF, 0x7F,
        ];
        for &tag in tags {
            let ty = BsonType::from_tag(tag).unwrap();
            assert_eq!(ty.tag(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(BsonType::from_tag(0x99).is_err());
    }
}
