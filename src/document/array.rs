//! A lazily-scanned array reader: a document reader that discards keys.

use std::cell::RefCell;

use crate::bytes::Bytes;
use crate::document::value::ValueReader;
use crate::error::Error;
use crate::raw::size::payload_len;
use crate::types::BsonType;

struct ScanState {
    offset: usize,
    elements: Vec<ValueReader>,
    exhausted: bool,
}

/// Same wire shape as [`DocumentReader`](super::reader::DocumentReader), but
/// the encoded keys ("0", "1", …) are ignored entirely: elements are kept
/// in insertion (wire) order and addressed by integer position, regardless
/// of what string key each was actually written under (see the design
/// notes on arrays with missing or unusual keys).
pub struct ArrayReader {
    payload: Bytes,
    state: RefCell<ScanState>,
}

impl ArrayReader {
    /// Builds a reader over an array's full bytes, including the leading
    /// `i32` length and the trailing `0x00` terminator.
    pub fn from_full_bytes(full: Bytes) -> Self {
        let len = full.len();
        assert!(len >= 5, "a BSON array is at least 5 bytes");
        let payload = full.sub_range(4..len - 1);
        ArrayReader {
            payload,
            state: RefCell::new(ScanState {
                offset: 0,
                elements: Vec::new(),
                exhausted: false,
            }),
        }
    }

    /// Returns the element at `index`, scanning further if needed.
    pub fn read(&self, index: usize) -> Result<Option<ValueReader>, Error> {
        loop {
            {
                let state = self.state.borrow();
                if index < state.elements.len() {
                    return Ok(Some(state.elements[index].clone()));
                }
                if state.exhausted {
                    return Ok(None);
                }
            }
            if self.scan_one()?.is_none() {
                return Ok(None);
            }
        }
    }

    /// Forces a full scan and returns every element in wire order.
    pub fn elements(&self) -> Result<Vec<ValueReader>, Error> {
        while !self.state.borrow().exhausted {
            self.scan_one()?;
        }
        Ok(self.state.borrow().elements.clone())
    }

    /// The number of elements scanned so far; forces a full scan.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.elements()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    fn scan_one(&self) -> Result<Option<()>, Error> {
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
        // the key itself is discarded -- arrays may encode anything here
        reader.skip_cstring()?;
        let value_start = state.offset + reader.position();
        let peek = &bytes[value_start..];
        let len = payload_len(ty, peek)?;
        let value_bytes = self.payload.sub_range(value_start..value_start + len);

        state.offset = value_start + len;
        if state.offset >= bytes.len() {
            state.exhausted = true;
        }
        state.elements.push(ValueReader::new(ty, value_bytes));

        Ok(Some(()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::build_array;

    #[test]
    fn reads_elements_by_index_regardless_of_encoded_keys() {
        let bytes = build_array(|w| {
            w.write_int32(10);
            w.write_int32(20);
            Ok(())
        })
        .unwrap();
        let array = ArrayReader::from_full_bytes(bytes);
        assert_eq!(array.read(1).unwrap().unwrap().read_int32().unwrap(), 20);
        assert_eq!(array.len().unwrap(), 2);
    }

    #[test]
    fn tolerates_empty_or_arbitrary_keys() {
        // hex from the project's S5 scenario: array whose single key is "".
        let hex = "130000000461000B00000010000A0000000000";
        let bytes = Bytes::new(hex::decode(hex).unwrap());
        let doc = crate::document::reader::DocumentReader::from_full_bytes(bytes);
        let array = doc.read("a").unwrap().unwrap().read_array().unwrap();
        assert_eq!(array.read(0).unwrap().unwrap().read_int32().unwrap(), 10);
    }
}
