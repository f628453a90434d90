//! Owning document/array wrappers and their lazy readers.

pub mod array;
pub mod reader;
pub mod value;

pub use array::ArrayReader;
pub use reader::DocumentReader;
pub use value::ValueReader;

use crate::bytes::Bytes;
use crate::extjson;

/// An immutable owner of a complete BSON document byte slice (leading
/// `i32` length and trailing `0x00` included).
#[derive(Clone, Debug, PartialEq)]
pub struct BsonDocument {
    bytes: Bytes,
}

impl BsonDocument {
    /// Wraps a complete, already-encoded document.
    pub fn from_bytes(bytes: Bytes) -> Self {
        BsonDocument { bytes }
    }

    /// The complete wire bytes, including length header and terminator.
    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Builds a lazy reader over this document's fields.
    pub fn reader(&self) -> DocumentReader {
        DocumentReader::from_full_bytes(self.bytes.clone())
    }

    /// Renders this document in the canonical Extended-JSON-like textual
    /// form described in the design notes.
    pub fn to_extjson(&self) -> Result<String, crate::error::Error> {
        extjson::render_document(&self.reader())
    }
}

/// An immutable owner of a complete BSON array byte slice.
#[derive(Clone, Debug, PartialEq)]
pub struct BsonArray {
    bytes: Bytes,
}

impl BsonArray {
    pub fn from_bytes(bytes: Bytes) -> Self {
        BsonArray { bytes }
    }

    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn reader(&self) -> ArrayReader {
        ArrayReader::from_full_bytes(self.bytes.clone())
    }

    pub fn to_extjson(&self) -> Result<String, crate::error::Error> {
        extjson::render_array(&self.reader())
    }
}
