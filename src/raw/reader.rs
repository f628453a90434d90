//! A cursor over a byte slice, with little-endian primitive reads.

use crate::error::{Error, ErrorKind};

/// A forward-only cursor over a borrowed byte slice.
///
/// Every primitive read advances `read_count`; running out of bytes fails
/// with [`ErrorKind::UnexpectedEof`] rather than panicking.
pub struct RawBsonReader<'a> {
    source: &'a [u8],
    read_count: usize,
}

impl<'a> RawBsonReader<'a> {
    /// Wraps a byte slice for reading from its start.
    pub fn new(source: &'a [u8]) -> Self {
        RawBsonReader {
            source,
            read_count: 0,
        }
    }

    /// How many bytes have been consumed so far.
    pub fn position(&self) -> usize {
        self.read_count
    }

    /// A non-consuming view of the remaining bytes.
    pub fn peek(&self) -> &'a [u8] {
        &self.source[self.read_count..]
    }

    /// `true` iff at least `n` bytes remain unread.
    pub fn request(&self, n: usize) -> bool {
        self.source.len() - self.read_count >= n
    }

    fn require(&self, n: usize) -> Result<(), Error> {
        if self.request(n) {
            Ok(())
        } else {
            Err(Error::from(ErrorKind::UnexpectedEof))
        }
    }

    /// Advances the cursor past `n` bytes without returning them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.require(n)?;
        self.read_count += n;
        Ok(())
    }

    /// Reads `n` raw bytes, copying them into a new `Vec<u8>`.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        self.require(n)?;
        let bytes = self.source[self.read_count..self.read_count + n].to_vec();
        self.read_count += n;
        Ok(bytes)
    }

    /// Reads `n` raw bytes as a borrowed slice.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], Error> {
        self.require(n)?;
        let slice = &self.source[self.read_count..self.read_count + n];
        self.read_count += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let slice = self.read_slice(1)?;
        Ok(slice[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, Error> {
        let slice = self.read_slice(4)?;
        Ok(i32::from_le_bytes(slice.try_into().unwrap()))
    }

    pub fn read_i64_le(&mut self) -> Result<i64, Error> {
        let slice = self.read_slice(8)?;
        Ok(i64::from_le_bytes(slice.try_into().unwrap()))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, Error> {
        let slice = self.read_slice(8)?;
        Ok(u64::from_le_bytes(slice.try_into().unwrap()))
    }

    pub fn read_f64_le(&mut self) -> Result<f64, Error> {
        let slice = self.read_slice(8)?;
        Ok(f64::from_le_bytes(slice.try_into().unwrap()))
    }

    /// Reads bytes up to (not including) the first `0x00`, UTF-8 decodes
    /// them, and consumes the terminator. Fails with
    /// [`ErrorKind::UnterminatedCString`] if no `0x00` is found before EOF.
    pub fn read_cstring(&mut self) -> Result<String, Error> {
        let bytes = self.cstring_bytes()?;
        simdutf8::basic::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| Error::from(ErrorKind::InvalidUtf8))
    }

    /// Same scan as [`read_cstring`](Self::read_cstring), but discards the
    /// bytes instead of allocating a `String`.
    pub fn skip_cstring(&mut self) -> Result<(), Error> {
        self.cstring_bytes()?;
        Ok(())
    }

    fn cstring_bytes(&mut self) -> Result<&'a [u8], Error> {
        let remaining = &self.source[self.read_count..];
        let nul = remaining
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::from(ErrorKind::UnterminatedCString))?;
        let bytes = &remaining[..nul];
        self.read_count += nul + 1;
        Ok(bytes)
    }

    /// Reads an `i32` length (including the terminator), then that many
    /// bytes minus one as UTF-8, then consumes the terminator. Fails with
    /// [`ErrorKind::LengthMismatch`] if the terminator is not `0x00`.
    pub fn read_string(&mut self) -> Result<String, Error> {
        let len = self.read_i32_le()?;
        if len < 1 {
            return Err(Error::from(ErrorKind::LengthMismatch)
                .with_message(format!("string length {len} is not positive")));
        }
        let len = len as usize;
        let slice = self.read_slice(len)?;
        let (body, terminator) = slice.split_at(len - 1);
        if terminator != [0] {
            return Err(Error::from(ErrorKind::LengthMismatch)
                .with_message("string was not terminated by a null byte"));
        }
        simdutf8::basic::from_utf8(body)
            .map(str::to_owned)
            .map_err(|_| Error::from(ErrorKind::InvalidUtf8))
    }
}
