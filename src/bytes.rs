//! An owned byte buffer with cheap, sharing sub-range views.

use std::ops::Range;
use std::sync::Arc;

use crate::raw::reader::RawBsonReader;

/// A contiguous immutable range over a shared byte buffer.
///
/// Cloning a `Bytes` or taking a [`sub_range`](Bytes::sub_range) never
/// copies the underlying storage; both operations only clone the `Arc` and
/// adjust the `begin..end` window.
#[derive(Clone, Debug)]
pub struct Bytes {
    data: Arc<[u8]>,
    begin: usize,
    end: usize,
}

impl Bytes {
    /// Wraps an owned buffer as a full-range `Bytes`.
    pub fn new(data: Vec<u8>) -> Self {
        let end = data.len();
        Bytes {
            data: Arc::from(data),
            begin: 0,
            end,
        }
    }

    /// Wraps a byte slice, copying it into a fresh owned buffer.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }

    /// The number of bytes in this range.
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// `true` iff this range is empty.
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Borrows this range as a plain byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.begin..self.end]
    }

    /// Creates a new `Bytes` sharing the same storage, restricted to
    /// `range` relative to this view's own bounds.
    ///
    /// Panics if `range` is not within `0..self.len()`.
    pub fn sub_range(&self, range: Range<usize>) -> Bytes {
        assert!(range.end <= self.len(), "sub_range out of bounds");
        Bytes {
            data: Arc::clone(&self.data),
            begin: self.begin + range.start,
            end: self.begin + range.end,
        }
    }

    /// Copies this range out into a freshly allocated `Vec<u8>`.
    pub fn to_owned(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Creates a cursor positioned at the start of this range.
    pub fn reader(&self) -> RawBsonReader<'_> {
        RawBsonReader::new(self.as_slice())
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Bytes {}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Bytes::new(data)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sub_range_shares_storage() {
        let bytes = Bytes::new(vec![1, 2, 3, 4, 5]);
        let sub = bytes.sub_range(1..3);
        assert_eq!(sub.as_slice(), &[2, 3]);
        assert_eq!(bytes.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn nested_sub_range() {
        let bytes = Bytes::new(vec![1, 2, 3, 4, 5]);
        let sub = bytes.sub_range(1..4);
        let subsub = sub.sub_range(1..2);
        assert_eq!(subsub.as_slice(), &[3]);
    }
}
