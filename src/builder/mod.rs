//! Document/array construction: the write-side counterpart of
//! [`crate::document`].

pub mod context;
pub mod field_writer;

pub use context::BsonContext;
pub use field_writer::{ArrayFieldWriter, FieldWriter, ObjectSafeWrite, ValueWriter};

use crate::bytes::Bytes;
use crate::error::Error;
use field_writer::{assemble_array, assemble_document};

/// The largest document this crate will build or accept, mirroring the
/// 16 MiB limit enforced by a MongoDB server. Encoding a document whose
/// final size exceeds this fails with [`crate::error::ErrorKind::DocumentTooLarge`].
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Builds a complete, self-contained BSON document from a `FieldWriter`
/// callback, returning its full wire bytes (length header and terminator
/// included).
pub fn build_document(
    block: impl FnOnce(&mut FieldWriter) -> Result<(), Error>,
) -> Result<Bytes, Error> {
    Ok(Bytes::new(assemble_document(block)?))
}

/// Builds a complete, self-contained BSON array from an `ArrayFieldWriter`
/// callback, returning its full wire bytes.
pub fn build_array(
    block: impl FnOnce(&mut ArrayFieldWriter) -> Result<(), Error>,
) -> Result<Bytes, Error> {
    Ok(Bytes::new(assemble_array(block)?))
}

/// A streaming variant of [`build_document`] for callers who want to
/// interleave field writes with other logic instead of supplying a single
/// closure. Must be finished with [`OpenDocument::finish`].
pub struct OpenDocument {
    buf: Vec<u8>,
}

impl OpenDocument {
    pub fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0i32.to_le_bytes());
        OpenDocument { buf }
    }

    /// Exposes the in-progress document to a callback as a `FieldWriter`.
    pub fn write(
        &mut self,
        block: impl FnOnce(&mut FieldWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        block(&mut FieldWriter::new(&mut self.buf))
    }

    /// Terminates and length-patches the document, returning its wire
    /// bytes. Fails if the result exceeds [`MAX_DOCUMENT_SIZE`].
    pub fn finish(mut self) -> Result<Bytes, Error> {
        self.buf.push(0);
        field_writer::patch_length(&mut self.buf)?;
        Ok(Bytes::new(self.buf))
    }
}

impl Default for OpenDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::reader::DocumentReader;

    #[test]
    fn build_document_round_trips_through_reader() {
        let bytes = build_document(|w| {
            w.write_string("name", "ferris");
            w.write_int32("age", 3);
            Ok(())
        })
        .unwrap();
        let doc = DocumentReader::from_full_bytes(bytes);
        assert_eq!(doc.read("name").unwrap().unwrap().read_string().unwrap(), "ferris");
        assert_eq!(doc.read("age").unwrap().unwrap().read_int32().unwrap(), 3);
    }

    #[test]
    fn nested_document_round_trips() {
        let bytes = build_document(|w| {
            w.write_document("inner", |w| {
                w.write_boolean("flag", true);
                Ok(())
            })
        })
        .unwrap();
        let doc = DocumentReader::from_full_bytes(bytes);
        let inner = doc.read("inner").unwrap().unwrap().read_document().unwrap();
        assert!(inner.read("flag").unwrap().unwrap().read_boolean().unwrap());
    }

    #[test]
    fn open_document_streaming_matches_closure_form() {
        let mut open = OpenDocument::new();
        open.write(|w| {
            w.write_int32("a", 1);
            Ok(())
        })
        .unwrap();
        open.write(|w| {
            w.write_int32("b", 2);
            Ok(())
        })
        .unwrap();
        let bytes = open.finish().unwrap();

        let closure_bytes = build_document(|w| {
            w.write_int32("a", 1);
            w.write_int32("b", 2);
            Ok(())
        })
        .unwrap();
        assert_eq!(bytes, closure_bytes);
    }

    #[test]
    fn oversized_document_is_rejected() {
        let result = build_document(|w| {
            w.write_binary_data(
                "blob",
                &crate::binary::Binary {
                    subtype: crate::binary::BinarySubtype::Generic,
                    bytes: vec![0u8; MAX_DOCUMENT_SIZE + 1],
                },
            );
            Ok(())
        });
        assert!(result.is_err());
    }
}
