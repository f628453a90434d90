//! A small BSON value enum used as the payload type throughout the filter
//! and update DSLs -- the moral equivalent of the historical `Bson` value
//! type, scoped down to what a query/update document actually carries.

use crate::binary::Binary;
use crate::builder::{ArrayFieldWriter, FieldWriter};
use crate::error::Error;
use crate::types::{Decimal128, ObjectId, Timestamp};

/// One BSON value, as embedded in a filter or update payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Double(f64),
    String(String),
    Boolean(bool),
    Null,
    Int32(i32),
    Int64(i64),
    Array(Vec<Value>),
    Document(Vec<(String, Value)>),
    ObjectId(ObjectId),
    Binary(Binary),
    /// Milliseconds since the Unix epoch.
    Datetime(i64),
    Regex { pattern: String, options: String },
    Timestamp(Timestamp),
    Decimal128(Decimal128),
    MinKey,
    MaxKey,
}

impl Value {
    /// Writes this value as a named field of the enclosing document.
    pub fn write_field(&self, name: &str, writer: &mut FieldWriter) -> Result<(), Error> {
        match self {
            Value::Double(v) => writer.write_double(name, *v),
            Value::String(v) => writer.write_string(name, v),
            Value::Boolean(v) => writer.write_boolean(name, *v),
            Value::Null => writer.write_null(name),
            Value::Int32(v) => writer.write_int32(name, *v),
            Value::Int64(v) => writer.write_int64(name, *v),
            Value::Array(items) => {
                let items = items.clone();
                writer.write_array(name, |a| {
                    for item in &items {
                        item.write_element(a)?;
                    }
                    Ok(())
                })?;
            }
            Value::Document(fields) => {
                let fields = fields.clone();
                writer.write_document(name, |d| {
                    for (k, v) in &fields {
                        v.write_field(k, d)?;
                    }
                    Ok(())
                })?;
            }
            Value::ObjectId(id) => writer.write_object_id(name, *id),
            Value::Binary(b) => writer.write_binary_data(name, b),
            Value::Datetime(millis) => writer.write_datetime(name, *millis),
            Value::Regex { pattern, options } => writer.write_regexp(name, pattern, options),
            Value::Timestamp(ts) => writer.write_timestamp(name, *ts),
            Value::Decimal128(d) => writer.write_decimal128(name, *d),
            Value::MinKey => writer.write_min_key(name),
            Value::MaxKey => writer.write_max_key(name),
        }
        Ok(())
    }

    /// Writes this value as the next auto-indexed element of an array.
    pub fn write_element(&self, writer: &mut ArrayFieldWriter) -> Result<(), Error> {
        match self {
            Value::Double(v) => writer.write_double(*v),
            Value::String(v) => writer.write_string(v),
            Value::Boolean(v) => writer.write_boolean(*v),
            Value::Null => writer.write_null(),
            Value::Int32(v) => writer.write_int32(*v),
            Value::Int64(v) => writer.write_int64(*v),
            Value::Array(items) => {
                let items = items.clone();
                writer.open_array(|a| {
                    for item in &items {
                        item.write_element(a)?;
                    }
                    Ok(())
                })?;
            }
            Value::Document(fields) => {
                let fields = fields.clone();
                writer.open_document(|d| {
                    for (k, v) in &fields {
                        v.write_field(k, d)?;
                    }
                    Ok(())
                })?;
            }
            Value::ObjectId(id) => writer.write_object_id(*id),
            Value::Binary(b) => writer.write_binary_data(b),
            Value::Datetime(millis) => writer.write_datetime(*millis),
            Value::Regex { pattern, options } => writer.write_regexp(pattern, options),
            Value::Timestamp(ts) => writer.write_timestamp(*ts),
            Value::Decimal128(d) => writer.write_decimal128(*d),
            Value::MinKey => writer.write_min_key(),
            Value::MaxKey => writer.write_max_key(),
        }
        Ok(())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::ObjectId(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::build_document;
    use crate::document::reader::DocumentReader;

    #[test]
    fn writes_nested_array_of_documents() {
        let value = Value::Array(vec![
            Value::Document(vec![("a".to_string(), Value::Int32(1))]),
            Value::Int32(2),
        ]);
        let bytes = build_document(|w| value.write_field("v", w)).unwrap();
        let doc = DocumentReader::from_full_bytes(bytes);
        let array = doc.read("v").unwrap().unwrap().read_array().unwrap();
        let first = array.read(0).unwrap().unwrap().read_document().unwrap();
        assert_eq!(first.read("a").unwrap().unwrap().read_int32().unwrap(), 1);
        assert_eq!(array.read(1).unwrap().unwrap().read_int32().unwrap(), 2);
    }
}
