//! A typed, lazily-decoded accessor for a single field's bytes.

use crate::binary::{Binary, BinarySubtype};
use crate::bytes::Bytes;
use crate::document::array::ArrayReader;
use crate::document::reader::DocumentReader;
use crate::error::{Error, ErrorKind};
use crate::regex::Regex;
use crate::types::{BsonType, Decimal128, ObjectId, Timestamp};

/// A decoder bound to exactly the bytes of one field's payload (never
/// including its type byte or name). Every `read_*` method first checks
/// `self.ty` against the type it expects and fails with
/// [`ErrorKind::WrongType`] on a mismatch.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueReader {
    ty: BsonType,
    bytes: Bytes,
}

impl ValueReader {
    pub(crate) fn new(ty: BsonType, bytes: Bytes) -> Self {
        ValueReader { ty, bytes }
    }

    /// The BSON type tag of this value.
    pub fn bson_type(&self) -> BsonType {
        self.ty
    }

    /// The raw payload bytes backing this value.
    pub fn raw_bytes(&self) -> &Bytes {
        &self.bytes
    }

    fn expect(&self, expected: BsonType) -> Result<(), Error> {
        if self.ty == expected {
            Ok(())
        } else {
            Err(Error::from(ErrorKind::WrongType {
                expected,
                actual: self.ty,
            }))
        }
    }

    pub fn read_double(&self) -> Result<f64, Error> {
        self.expect(BsonType::Double)?;
        self.bytes.reader().read_f64_le()
    }

    pub fn read_string(&self) -> Result<String, Error> {
        self.expect(BsonType::String)?;
        decode_lenencoded_str(&self.bytes)
    }

    pub fn read_document(&self) -> Result<DocumentReader, Error> {
        self.expect(BsonType::Document)?;
        Ok(DocumentReader::from_full_bytes(self.bytes.clone()))
    }

    pub fn read_array(&self) -> Result<ArrayReader, Error> {
        self.expect(BsonType::Array)?;
        Ok(ArrayReader::from_full_bytes(self.bytes.clone()))
    }

    pub fn read_binary_data(&self) -> Result<Binary, Error> {
        self.expect(BsonType::BinaryData)?;
        let mut reader = self.bytes.reader();
        let declared_len = reader.read_i32_le()? as usize;
        let subtype = BinarySubtype::from(reader.read_u8()?);
        let bytes = if matches!(subtype, BinarySubtype::BinaryOld) {
            let inner_len = reader.read_i32_le()? as usize;
            if inner_len + 4 != declared_len {
                return Err(Error::from(ErrorKind::LengthMismatch)
                    .with_message("old binary subtype inner length mismatch"));
            }
            reader.read_bytes(inner_len)?
        } else {
            reader.read_bytes(declared_len)?
        };
        Ok(Binary { subtype, bytes })
    }

    pub fn read_object_id(&self) -> Result<ObjectId, Error> {
        self.expect(BsonType::ObjectId)?;
        let bytes = self.bytes.reader().read_bytes(12)?;
        let mut array = [0u8; 12];
        array.copy_from_slice(&bytes);
        Ok(ObjectId::from_bytes(array))
    }

    pub fn read_boolean(&self) -> Result<bool, Error> {
        self.expect(BsonType::Boolean)?;
        Ok(self.bytes.reader().read_u8()? != 0)
    }

    /// Returns milliseconds since the Unix epoch.
    pub fn read_datetime(&self) -> Result<i64, Error> {
        self.expect(BsonType::Datetime)?;
        self.bytes.reader().read_i64_le()
    }

    pub fn read_null(&self) -> Result<(), Error> {
        self.expect(BsonType::Null)
    }

    pub fn read_undefined(&self) -> Result<(), Error> {
        self.expect(BsonType::Undefined)
    }

    pub fn read_min_key(&self) -> Result<(), Error> {
        self.expect(BsonType::MinKey)
    }

    pub fn read_max_key(&self) -> Result<(), Error> {
        self.expect(BsonType::MaxKey)
    }

    pub fn read_regexp(&self) -> Result<Regex, Error> {
        self.expect(BsonType::RegExp)?;
        let mut reader = self.bytes.reader();
        let pattern = reader.read_cstring()?;
        let options = reader.read_cstring()?;
        Ok(Regex { pattern, options })
    }

    pub fn read_javascript(&self) -> Result<String, Error> {
        self.expect(BsonType::JavaScript)?;
        decode_lenencoded_str(&self.bytes)
    }

    /// Decodes the wire bytes of the deprecated `Symbol` type verbatim, with
    /// no further interpretation beyond the underlying UTF-8 string.
    pub fn read_symbol(&self) -> Result<String, Error> {
        self.expect(BsonType::Symbol)?;
        decode_lenencoded_str(&self.bytes)
    }

    pub fn read_int32(&self) -> Result<i32, Error> {
        self.expect(BsonType::Int32)?;
        self.bytes.reader().read_i32_le()
    }

    pub fn read_timestamp(&self) -> Result<Timestamp, Error> {
        self.expect(BsonType::Timestamp)?;
        let bits = self.bytes.reader().read_u64_le()?;
        Ok(Timestamp::from_bits(bits))
    }

    pub fn read_int64(&self) -> Result<i64, Error> {
        self.expect(BsonType::Int64)?;
        self.bytes.reader().read_i64_le()
    }

    pub fn read_decimal128(&self) -> Result<Decimal128, Error> {
        self.expect(BsonType::Decimal128)?;
        let mut reader = self.bytes.reader();
        let low = reader.read_i64_le()? as u64;
        let high = reader.read_i64_le()? as u64;
        Ok(Decimal128::from_parts(low, high))
    }

    /// Decodes the deprecated `DBPointer` type verbatim: a namespace string
    /// plus a trailing ObjectId, with no higher-level semantics attached.
    pub fn read_db_pointer(&self) -> Result<(String, ObjectId), Error> {
        self.expect(BsonType::DBPointer)?;
        let slice = self.bytes.as_slice();
        let namespace_len = slice.len() - 12;
        let namespace_bytes = Bytes::copy_from_slice(&slice[..namespace_len]);
        let namespace = decode_lenencoded_str(&namespace_bytes)?;
        let mut oid = [0u8; 12];
        oid.copy_from_slice(&slice[namespace_len..]);
        Ok((namespace, ObjectId::from_bytes(oid)))
    }

    /// Decodes the deprecated `JavaScriptWithScope` type verbatim: the code
    /// string plus the scope sub-document, sharing the same byte view.
    pub fn read_javascript_with_scope(&self) -> Result<(String, DocumentReader), Error> {
        self.expect(BsonType::JavaScriptWithScope)?;
        let mut reader = self.bytes.reader();
        let _total_len = reader.read_i32_le()?;
        let code = reader.read_string()?;
        let scope_start = reader.position();
        let scope_bytes = self.bytes.sub_range(scope_start..self.bytes.len());
        Ok((code, DocumentReader::from_full_bytes(scope_bytes)))
    }
}

/// Decodes `i32 len | bytes (len-1) | 0x00` from a standalone `Bytes` view
/// (used for String/JavaScript/Symbol and the DBPointer namespace).
fn decode_lenencoded_str(bytes: &Bytes) -> Result<String, Error> {
    let mut reader = bytes.reader();
    reader.read_string()
}
