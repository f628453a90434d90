//! A lazily-scanned, order-preserving document reader.

use std::cell::RefCell;

use indexmap::IndexMap;

use crate::bytes::Bytes;
use crate::document::value::ValueReader;
use crate::error::Error;
use crate::raw::size::payload_len;
use crate::types::BsonType;

struct ScanState {
    /// Bytes remaining to scan, stripped of everything already consumed.
    offset: usize,
    /// Order-preserving cache of name -> last-seen value; a later binding
    /// of the same name overwrites an earlier one as the scan progresses.
    cache: IndexMap<String, ValueReader>,
    /// Every binding seen so far, including duplicates, in wire order.
    all: Vec<(String, ValueReader)>,
    exhausted: bool,
}

/// Holds the payload of a BSON document (length header and trailing null
/// stripped) and scans it on demand, caching each field the first time it
/// is requested.
///
/// Scanning stops as soon as the sought field is found and resumes from
/// there on the next lookup, so looking up every field of an N-field
/// document costs O(N) total regardless of lookup order, as long as fields
/// are requested roughly in wire order. Looking up a field that does not
/// exist always forces a full scan.
pub struct DocumentReader {
    payload: Bytes,
    state: RefCell<ScanState>,
}

impl DocumentReader {
    /// Builds a reader over a document's full bytes, including the leading
    /// `i32` length and the trailing `0x00` terminator.
    pub fn from_full_bytes(full: Bytes) -> Self {
        let len = full.len();
        assert!(len >= 5, "a BSON document is at least 5 bytes");
        let payload = full.sub_range(4..len - 1);
        DocumentReader {
            payload,
            state: RefCell::new(ScanState {
                offset: 0,
                cache: IndexMap::new(),
                all: Vec::new(),
                exhausted: false,
            }),
        }
    }

    /// Looks up a field by name, scanning further into the document if it
    /// has not yet been reached. Returns `None` (not an error) if no field
    /// with that name exists.
    pub fn read(&self, name: &str) -> Result<Option<ValueReader>, Error> {
        {
            let state = self.state.borrow();
            if let Some(value) = state.cache.get(name) {
                return Ok(Some(value.clone()));
            }
            if state.exhausted {
                return Ok(None);
            }
        }

        loop {
            let found = self.scan_one()?;
            match found {
                None => return Ok(None),
                Some((scanned_name, value)) => {
                    if scanned_name == name {
                        return Ok(Some(value));
                    }
                }
            }
        }
    }

    /// Forces a full scan and returns every (name, value) pair in wire
    /// order, including duplicate names.
    pub fn entries(&self) -> Result<Vec<(String, ValueReader)>, Error> {
        while !self.state.borrow().exhausted {
            self.scan_one()?;
        }
        Ok(self.state.borrow().all.clone())
    }

    /// Alias for [`entries`](Self::entries), matching the vocabulary used
    /// by array readers.
    pub fn elements(&self) -> Result<Vec<(String, ValueReader)>, Error> {
        self.entries()
    }

    /// Advances the scan by exactly one field, returning its (name, value)
    /// pair, or `None` once the document is exhausted.
    fn scan_one(&self) -> Result<Option<(String, ValueReader)>, Error> {
        let mut state = self.state.borrow_mut();
        if state.exhausted {
            return Ok(None);
        }

        let bytes = self.payload.as_slice();
        if state.offset >= bytes.len() {
            state.exhausted = true;
            return Ok(None);
        }

        let mut reader = self.payload.sub_range(state.offset..bytes.len()).reader();
        let tag = reader.read_u8()?;
        let ty = BsonType::from_tag(tag)?;
        let name = reader.read_cstring()?;
        let value_start = state.offset + reader.position();
        let peek = &bytes[value_start..];
        let len = payload_len(ty, peek)?;
        let value_bytes = self.payload.sub_range(value_start..value_start + len);
        let value = ValueReader::new(ty, value_bytes);

        state.offset = value_start + len;
        if state.offset >= bytes.len() {
            state.exhausted = true;
        }

        state.all.push((name.clone(), value.clone()));
        // Last binding wins: a later occurrence of the same name overwrites
        // whatever an earlier scan step cached for it.
        state.cache.insert(name.clone(), value.clone());

        Ok(Some((name, value)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::build_document;

    #[test]
    fn reads_fields_lazily() {
        let bytes = build_document(|w| {
            w.write_int32("a", 1);
            w.write_int32("b", 2);
            Ok(())
        })
        .unwrap();
        let doc = DocumentReader::from_full_bytes(bytes);
        assert_eq!(doc.read("b").unwrap().unwrap().read_int32().unwrap(), 2);
        assert_eq!(doc.read("a").unwrap().unwrap().read_int32().unwrap(), 1);
        assert!(doc.read("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_names_keep_last_in_cache_but_all_in_entries() {
        let bytes = build_document(|w| {
            w.write_int32("a", 1);
            w.write_int32("a", 2);
            Ok(())
        })
        .unwrap();
        let doc = DocumentReader::from_full_bytes(bytes);

        // Force the scan past both occurrences of "a" before consulting the
        // cache, so this actually distinguishes first-wins from last-wins.
        let all = doc.entries().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].1.read_int32().unwrap(), 1);
        assert_eq!(all[1].1.read_int32().unwrap(), 2);

        assert_eq!(doc.read("a").unwrap().unwrap().read_int32().unwrap(), 2);
    }
}
