//! The DSL surface that drives a [`RawBsonWriter`] while building one
//! document, plus the `write_object_safe` reflection hook.

use crate::binary::{Binary, BinarySubtype};
use crate::builder::MAX_DOCUMENT_SIZE;
use crate::error::{Error, ErrorKind};
use crate::raw::writer::RawBsonWriter;
use crate::regex::sort_options;
use crate::types::{Decimal128, ObjectId, Timestamp};

/// Writes named fields into an enclosing BSON document.
///
/// Each `write_<type>` method emits `[type-byte][cstring name][payload]`.
/// Nested documents/arrays are assembled in a private child buffer first,
/// since their length prefix precedes their content; the child is merged
/// in once it is known to fit.
pub struct FieldWriter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
        FieldWriter { buf }
    }

    fn key(&mut self, tag: u8, name: &str) {
        self.buf.push(tag);
        RawBsonWriter::new(self.buf).write_cstring(name);
    }

    pub fn write_double(&mut self, name: &str, value: f64) {
        self.key(0x01, name);
        RawBsonWriter::new(self.buf).write_f64_le(value);
    }

    pub fn write_string(&mut self, name: &str, value: &str) {
        self.key(0x02, name);
        RawBsonWriter::new(self.buf).write_string(value);
    }

    /// Builds a nested document via `block`, then appends it under `name`.
    /// `block` itself fails if one of its own nested writes does.
    pub fn write_document(
        &mut self,
        name: &str,
        block: impl FnOnce(&mut FieldWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let child = assemble_document(block)?;
        self.key(0x03, name);
        self.buf.extend_from_slice(&child);
        Ok(())
    }

    /// Builds a nested array via `block`, then appends it under `name`.
    pub fn write_array(
        &mut self,
        name: &str,
        block: impl FnOnce(&mut ArrayFieldWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let child = assemble_array(block)?;
        self.key(0x04, name);
        self.buf.extend_from_slice(&child);
        Ok(())
    }

    pub fn write_binary_data(&mut self, name: &str, binary: &Binary) {
        self.key(0x05, name);
        let mut w = RawBsonWriter::new(self.buf);
        let subtype: u8 = binary.subtype.into();
        if matches!(binary.subtype, BinarySubtype::BinaryOld) {
            w.write_i32_le(binary.bytes.len() as i32 + 4);
            w.write_u8(subtype);
            w.write_i32_le(binary.bytes.len() as i32);
        } else {
            w.write_i32_le(binary.bytes.len() as i32);
            w.write_u8(subtype);
        }
        w.write_bytes(&binary.bytes);
    }

    pub fn write_undefined(&mut self, name: &str) {
        self.key(0x06, name);
    }

    pub fn write_object_id(&mut self, name: &str, id: ObjectId) {
        self.key(0x07, name);
        RawBsonWriter::new(self.buf).write_bytes(&id.bytes());
    }

    pub fn write_boolean(&mut self, name: &str, value: bool) {
        self.key(0x08, name);
        RawBsonWriter::new(self.buf).write_u8(value as u8);
    }

    /// `value` is milliseconds since the Unix epoch.
    pub fn write_datetime(&mut self, name: &str, millis_since_epoch: i64) {
        self.key(0x09, name);
        RawBsonWriter::new(self.buf).write_i64_le(millis_since_epoch);
    }

    pub fn write_null(&mut self, name: &str) {
        self.key(0x0A, name);
    }

    /// Writes a regular expression with its options sorted into the
    /// canonical alphabetical order (`i`, `m`, `s`, `x`).
    pub fn write_regexp(&mut self, name: &str, pattern: &str, options: &str) {
        self.key(0x0B, name);
        let mut w = RawBsonWriter::new(self.buf);
        w.write_cstring(pattern);
        w.write_cstring(&sort_options(options));
    }

    /// Writes the deprecated `DBPointer` type verbatim.
    pub fn write_db_pointer(&mut self, name: &str, namespace: &str, id: ObjectId) {
        self.key(0x0C, name);
        let mut w = RawBsonWriter::new(self.buf);
        w.write_string(namespace);
        w.write_bytes(&id.bytes());
    }

    pub fn write_javascript(&mut self, name: &str, code: &str) {
        self.key(0x0D, name);
        RawBsonWriter::new(self.buf).write_string(code);
    }

    /// Writes the deprecated `Symbol` type verbatim.
    pub fn write_symbol(&mut self, name: &str, value: &str) {
        self.key(0x0E, name);
        RawBsonWriter::new(self.buf).write_string(value);
    }

    /// Writes the deprecated `JavaScriptWithScope` type: code plus a scope
    /// sub-document, self-describing its own total length.
    pub fn write_javascript_with_scope(
        &mut self,
        name: &str,
        code: &str,
        scope: impl FnOnce(&mut FieldWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        self.key(0x0F, name);
        let mut body = Vec::new();
        RawBsonWriter::new(&mut body).write_string(code);
        let scope_doc = assemble_document(scope)?;
        body.extend_from_slice(&scope_doc);
        let total = body.len() as i32 + 4;
        let mut w = RawBsonWriter::new(self.buf);
        w.write_i32_le(total);
        w.write_bytes(&body);
        Ok(())
    }

    pub fn write_int32(&mut self, name: &str, value: i32) {
        self.key(0x10, name);
        RawBsonWriter::new(self.buf).write_i32_le(value);
    }

    pub fn write_timestamp(&mut self, name: &str, timestamp: Timestamp) {
        self.key(0x11, name);
        RawBsonWriter::new(self.buf).write_u64_le(timestamp.to_bits());
    }

    pub fn write_int64(&mut self, name: &str, value: i64) {
        self.key(0x12, name);
        RawBsonWriter::new(self.buf).write_i64_le(value);
    }

    pub fn write_decimal128(&mut self, name: &str, value: Decimal128) {
        self.key(0x13, name);
        let mut w = RawBsonWriter::new(self.buf);
        w.write_i64_le(value.low() as i64);
        w.write_i64_le(value.high() as i64);
    }

    pub fn write_min_key(&mut self, name: &str) {
        self.key(0xFF, name);
    }

    pub fn write_max_key(&mut self, name: &str) {
        self.key(0x7F, name);
    }

    /// Routes a single value write through a [`ValueWriter`] callback.
    pub fn write(&mut self, name: &str, block: impl FnOnce(ValueWriter)) -> Result<(), Error> {
        let mut result = Ok(());
        block(ValueWriter {
            field_writer: self,
            name,
            result: &mut result,
        });
        result
    }

    /// The reflection hook: an implementer-defined dispatcher from an
    /// arbitrary application value to the matching `write_<type>` call.
    /// Unknown types fail with [`ErrorKind::UnsupportedType`].
    pub fn write_object_safe(
        &mut self,
        name: &str,
        value: &dyn ObjectSafeWrite,
    ) -> Result<(), Error> {
        value.write_bson(name, self)
    }
}

/// A single-value write callback surface, bound to one field name. Exists
/// so `FieldWriter::write` can hand a caller exactly one write slot without
/// letting them pick a different name than the one they asked to write.
pub struct ValueWriter<'w, 'a> {
    field_writer: &'w mut FieldWriter<'a>,
    name: &'w str,
    result: &'w mut Result<(), Error>,
}

impl<'w, 'a> ValueWriter<'w, 'a> {
    pub fn double(self, value: f64) {
        self.field_writer.write_double(self.name, value);
    }

    pub fn string(self, value: &str) {
        self.field_writer.write_string(self.name, value);
    }

    pub fn document(self, block: impl FnOnce(&mut FieldWriter) -> Result<(), Error>) {
        *self.result = self.field_writer.write_document(self.name, block);
    }

    pub fn array(self, block: impl FnOnce(&mut ArrayFieldWriter) -> Result<(), Error>) {
        *self.result = self.field_writer.write_array(self.name, block);
    }

    pub fn boolean(self, value: bool) {
        self.field_writer.write_boolean(self.name, value);
    }

    pub fn int32(self, value: i32) {
        self.field_writer.write_int32(self.name, value);
    }

    pub fn int64(self, value: i64) {
        self.field_writer.write_int64(self.name, value);
    }

    pub fn null(self) {
        self.field_writer.write_null(self.name);
    }

    pub fn object_id(self, id: ObjectId) {
        self.field_writer.write_object_id(self.name, id);
    }

    /// `value` is milliseconds since the Unix epoch.
    pub fn datetime(self, millis_since_epoch: i64) {
        self.field_writer.write_datetime(self.name, millis_since_epoch);
    }

    pub fn binary_data(self, binary: &Binary) {
        self.field_writer.write_binary_data(self.name, binary);
    }

    pub fn timestamp(self, value: Timestamp) {
        self.field_writer.write_timestamp(self.name, value);
    }

    pub fn decimal128(self, value: Decimal128) {
        self.field_writer.write_decimal128(self.name, value);
    }

    pub fn regexp(self, pattern: &str, options: &str) {
        self.field_writer.write_regexp(self.name, pattern, options);
    }

    pub fn min_key(self) {
        self.field_writer.write_min_key(self.name);
    }

    pub fn max_key(self) {
        self.field_writer.write_max_key(self.name);
    }

    pub fn undefined(self) {
        self.field_writer.write_undefined(self.name);
    }

    pub fn javascript(self, code: &str) {
        self.field_writer.write_javascript(self.name, code);
    }
}

/// The reflection hook consumed by [`FieldWriter::write_object_safe`].
/// Implementers bind an external object-to-BSON mapping facility behind
/// this trait; this crate ships no implementation beyond what the typed
/// `write_<type>` calls already provide.
pub trait ObjectSafeWrite {
    fn write_bson(&self, name: &str, writer: &mut FieldWriter) -> Result<(), Error>;
}

/// A `FieldWriter` view that auto-indexes keys `0`, `1`, `2`, … as values
/// are appended, matching how a BSON array is just a document whose keys
/// happen to be decimal indices.
pub struct ArrayFieldWriter<'a> {
    inner: FieldWriter<'a>,
    size: u32,
}

impl<'a> ArrayFieldWriter<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
        ArrayFieldWriter {
            inner: FieldWriter::new(buf),
            size: 0,
        }
    }

    fn next_key(&mut self) -> String {
        let key = self.size.to_string();
        self.size += 1;
        key
    }

    pub fn write_double(&mut self, value: f64) {
        let key = self.next_key();
        self.inner.write_double(&key, value);
    }

    pub fn write_string(&mut self, value: &str) {
        let key = self.next_key();
        self.inner.write_string(&key, value);
    }

    pub fn open_document(
        &mut self,
        block: impl FnOnce(&mut FieldWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let key = self.next_key();
        self.inner.write_document(&key, block)
    }

    pub fn open_array(
        &mut self,
        block: impl FnOnce(&mut ArrayFieldWriter) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let key = self.next_key();
        self.inner.write_array(&key, block)
    }

    pub fn write_binary_data(&mut self, binary: &Binary) {
        let key = self.next_key();
        self.inner.write_binary_data(&key, binary);
    }

    pub fn write_object_id(&mut self, id: ObjectId) {
        let key = self.next_key();
        self.inner.write_object_id(&key, id);
    }

    pub fn write_boolean(&mut self, value: bool) {
        let key = self.next_key();
        self.inner.write_boolean(&key, value);
    }

    pub fn write_datetime(&mut self, millis_since_epoch: i64) {
        let key = self.next_key();
        self.inner.write_datetime(&key, millis_since_epoch);
    }

    pub fn write_null(&mut self) {
        let key = self.next_key();
        self.inner.write_null(&key);
    }

    pub fn write_regexp(&mut self, pattern: &str, options: &str) {
        let key = self.next_key();
        self.inner.write_regexp(&key, pattern, options);
    }

    pub fn write_int32(&mut self, value: i32) {
        let key = self.next_key();
        self.inner.write_int32(&key, value);
    }

    pub fn write_timestamp(&mut self, value: Timestamp) {
        let key = self.next_key();
        self.inner.write_timestamp(&key, value);
    }

    pub fn write_int64(&mut self, value: i64) {
        let key = self.next_key();
        self.inner.write_int64(&key, value);
    }

    pub fn write_decimal128(&mut self, value: Decimal128) {
        let key = self.next_key();
        self.inner.write_decimal128(&key, value);
    }

    pub fn write_min_key(&mut self) {
        let key = self.next_key();
        self.inner.write_min_key(&key);
    }

    pub fn write_max_key(&mut self) {
        let key = self.next_key();
        self.inner.write_max_key(&key);
    }

    /// The number of elements written so far.
    pub fn len(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Assembles a child document buffer (placeholder length + block + 0x00 +
/// patched length), checking the size limit before returning.
pub(crate) fn assemble_document(
    block: impl FnOnce(&mut FieldWriter) -> Result<(), Error>,
) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0i32.to_le_bytes());
    block(&mut FieldWriter::new(&mut buf))?;
    buf.push(0);
    patch_length(&mut buf)?;
    Ok(buf)
}

/// Same as [`assemble_document`], but the block writes through an
/// [`ArrayFieldWriter`] that auto-indexes its keys.
pub(crate) fn assemble_array(
    block: impl FnOnce(&mut ArrayFieldWriter) -> Result<(), Error>,
) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0i32.to_le_bytes());
    block(&mut ArrayFieldWriter::new(&mut buf))?;
    buf.push(0);
    patch_length(&mut buf)?;
    Ok(buf)
}

/// Overwrites the placeholder length at the front of `buf` with its actual
/// size, failing with [`ErrorKind::DocumentTooLarge`] if it exceeds the
/// 16 MiB / `i32::MAX` ceiling.
pub(crate) fn patch_length(buf: &mut [u8]) -> Result<(), Error> {
    let size = buf.len();
    if size > MAX_DOCUMENT_SIZE || size > i32::MAX as usize {
        return Err(Error::from(ErrorKind::DocumentTooLarge(size)));
    }
    let size_bytes = (size as i32).to_le_bytes();
    buf[0..4].copy_from_slice(&size_bytes);
    Ok(())
}
